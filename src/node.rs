//! A ready-made composition wrapper for types that do not want to embed a
//! [`ListEntry`] themselves.
//!
//! A [`Node`] pairs a payload with a `ListEntry` and implements [`ListNode`] for
//! it, so any `T` can be put into a `List<Node<T>>` without writing the projection
//! by hand. While a node is linked, its payload is logically borrow-owned by the
//! list; the safe accessors therefore refuse access until it is unlinked again.

use core::pin::Pin;

use pin_project::pin_project;

use crate::entry::{DefaultTag, ListEntry};
use crate::list::{List, ListNode};

/// A node that can be inserted into a `List`.
/// * If the `Node` is not inside a `List`, you only need to borrow the `Node` while accessing its data.
/// * If the `Node` is inside a `List`, you need to borrow both the `Node` **and the `List`** while accessing its data.
/// * If a `Node` drops while it is still inside a `List`, it unlinks itself first.
#[pin_project]
pub struct Node<T, Tag = DefaultTag> {
    #[pin]
    list_entry: ListEntry<Tag>,
    data: T,
}

impl<T, Tag> Node<T, Tag> {
    /// Returns a new `Node` wrapping `data`.
    ///
    /// # Safety
    ///
    /// Use after initialization with `Node::init`.
    pub const unsafe fn new(data: T) -> Self {
        Self {
            list_entry: unsafe { ListEntry::new() },
            data,
        }
    }

    /// Initializes the `Node` if it was not initialized.
    /// Otherwise, does nothing.
    pub fn init(self: Pin<&mut Self>) {
        self.project().list_entry.init();
    }

    /// Removes the `Node` from whatever list it is in, in O(1) and without
    /// involving the list itself. Does nothing if the node is detached.
    pub fn unlink(self: Pin<&mut Self>) {
        self.project().list_entry.remove();
    }

    /// Returns an immutable reference to the inner data if the `Node` is not
    /// inside a `List`. Otherwise, returns `None`.
    pub fn try_get(&self) -> Option<&T> {
        if self.list_entry.is_unlinked() {
            Some(&self.data)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the inner data if the `Node` is not
    /// inside a `List`. Otherwise, returns `None`.
    pub fn try_get_mut(self: Pin<&mut Self>) -> Option<&mut T> {
        if self.list_entry.is_unlinked() {
            Some(self.project().data)
        } else {
            None
        }
    }

    /// Returns an immutable reference to the inner data.
    /// The reference borrows the `Node` **and the `List`** for its lifetime.
    ///
    /// # Safety
    ///
    /// The `Node` must already be inserted inside the given list.
    pub unsafe fn get_unchecked<'s>(&'s self, _list_ref: &'s List<Self, Tag>) -> &'s T {
        &self.data
    }

    /// Returns a mutable reference to the inner data of a linked `Node`, without
    /// a list borrow to prove exclusivity.
    ///
    /// # Safety
    ///
    /// The caller has exclusive access to the list containing this `Node` (for
    /// example through [`List::iter_pin_mut_unchecked`]), so no other reference
    /// to the data exists.
    pub unsafe fn get_mut_unchecked(self: Pin<&mut Self>) -> &mut T {
        self.project().data
    }
}

unsafe impl<T, Tag> ListNode<Tag> for Node<T, Tag> {
    fn get_list_entry(self: Pin<&mut Self>) -> Pin<&mut ListEntry<Tag>> {
        self.project().list_entry
    }

    fn from_list_entry(list_entry: *mut ListEntry<Tag>) -> *mut Self {
        (list_entry as usize - core::mem::offset_of!(Self, list_entry)) as *mut Self
    }
}
