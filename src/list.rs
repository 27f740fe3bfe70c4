//! The list container and its iterators.
//!
//! A [`List`] owns a single sentinel [`ListEntry`] and nothing else. The sentinel is
//! the universal past-the-end position: the first element is `head.next`, the last is
//! `head.prev`, and the list is empty exactly when the sentinel is self-linked. This
//! keeps insertion, removal and splicing free of special cases for the front, the
//! back and the empty list.

use core::marker::PhantomData;
use core::pin::Pin;
use core::ptr;

use pin_project::{pin_project, pinned_drop};

use crate::entry::{DefaultTag, ListEntry};

/// Intrusive linked list nodes that can be inserted into a `List`.
///
/// Implementing this trait for several tags lets the same element sit in several
/// independent lists at once, one membership per tag.
///
/// # Safety
///
/// Only implement this for structs that own a `ListEntry<Tag>`.
/// The required functions must convert between the struct and that same `ListEntry`
/// in constant time, without virtual dispatch, and must be inverses of each other.
pub unsafe trait ListNode<Tag = DefaultTag>: Sized {
    /// Returns a reference of this struct's `ListEntry`.
    fn get_list_entry(self: Pin<&mut Self>) -> Pin<&mut ListEntry<Tag>>;

    /// Returns a raw pointer which points to the struct that owns the given `list_entry`.
    /// You may want to use `offset_of!` to implement this.
    fn from_list_entry(list_entry: *mut ListEntry<Tag>) -> *mut Self;
}

/// A doubly linked list that does not own its nodes.
/// Can only contain types that implement the [`ListNode`] trait.
/// Use only after initialization.
///
/// The list never allocates and never drops its elements; it only rewires the
/// `ListEntry`s embedded in them. Since a node unlinks itself when dropped, the
/// list and its nodes need no statically ordered lifetimes; the methods return raw
/// pointers instead of references, and the caller must make sure a node is not
/// under mutation or already dropped when dereferencing one.
///
/// # Safety
///
/// A `List` contains one or more `ListEntry`s.
/// * Exactly one of them is the sentinel `head`.
/// * All other of them are a `ListEntry` owned by a `T: ListNode<Tag>`.
#[pin_project(PinnedDrop)]
pub struct List<T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    #[pin]
    head: ListEntry<Tag>,
    _marker: PhantomData<T>,
}

/// An iterator over the elements of `List`.
///
/// # Safety
///
/// * No element of the `List` is mutated or dropped while the `Iter` exists.
/// * `last` and `curr` always point to a valid `ListEntry`.
pub struct Iter<'s, T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    last: *mut ListEntry<Tag>,
    curr: *mut ListEntry<Tag>,
    _marker: PhantomData<&'s T>,
}

/// A pinned mutable iterator over the elements of `List`.
///
/// # Safety
///
/// * There are no `&T` or `Pin<&mut T>` for any element inside the `List`,
/// while the `IterPinMut` exists.
/// * `last` and `curr` always point to a valid `ListEntry`.
pub struct IterPinMut<'s, T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    last: *mut ListEntry<Tag>,
    curr: *mut ListEntry<Tag>,
    _marker: PhantomData<&'s mut T>,
}

impl<T, Tag> List<T, Tag>
where
    T: ListNode<Tag>,
{
    /// Returns an uninitialized `List`,
    ///
    /// # Safety
    ///
    /// All `List` types must be used only after initializing it with `List::init`.
    pub const unsafe fn new() -> Self {
        Self {
            head: unsafe { ListEntry::new() },
            _marker: PhantomData,
        }
    }

    /// Initializes this `List` if it was not initialized.
    /// Otherwise, does nothing.
    pub fn init(self: Pin<&mut Self>) {
        self.project().head.init();
    }

    pub(crate) fn head(&self) -> &ListEntry<Tag> {
        &self.head
    }

    pub(crate) fn head_mut(self: Pin<&mut Self>) -> Pin<&mut ListEntry<Tag>> {
        self.project().head
    }

    /// Returns true if this `List` is empty.
    /// Otherwise, returns false. O(1): the sentinel is self-linked iff empty.
    pub fn is_empty(&self) -> bool {
        self.head.is_unlinked()
    }

    /// Provides a raw pointer to the front node, or `None` if the list is empty.
    pub fn front(&self) -> Option<*mut T> {
        if self.is_empty() {
            None
        } else {
            Some(T::from_list_entry(self.head.next()))
        }
    }

    /// Provides a raw pointer to the back node, or `None` if the list is empty.
    pub fn back(&self) -> Option<*mut T> {
        if self.is_empty() {
            None
        } else {
            Some(T::from_list_entry(self.head.prev()))
        }
    }

    /// Push `elt` at the front of the list after unlinking it.
    pub fn push_front(self: Pin<&mut Self>, elt: Pin<&mut T>) {
        self.head_mut().push_front(elt.get_list_entry());
    }

    /// Push `elt` at the back of the list after unlinking it.
    pub fn push_back(self: Pin<&mut Self>, elt: Pin<&mut T>) {
        self.head_mut().push_back(elt.get_list_entry());
    }

    /// Removes the first node from the list and returns a raw pointer to it,
    /// or `None` if the list is empty.
    pub fn pop_front(self: Pin<&mut Self>) -> Option<*mut T> {
        let ptr = self.head.next();
        if ptr::eq(ptr, &self.head) {
            None
        } else {
            unsafe { Pin::new_unchecked(&mut *ptr) }.remove();
            Some(T::from_list_entry(ptr))
        }
    }

    /// Removes the last node from the list and returns a raw pointer to it,
    /// or `None` if the list is empty.
    pub fn pop_back(self: Pin<&mut Self>) -> Option<*mut T> {
        let ptr = self.head.prev();
        if ptr::eq(ptr, &self.head) {
            None
        } else {
            unsafe { Pin::new_unchecked(&mut *ptr) }.remove();
            Some(T::from_list_entry(ptr))
        }
    }

    /// Removes all nodes from the list without dropping them.
    /// Every removed node is left detached.
    pub fn clear(mut self: Pin<&mut Self>) {
        while self.as_mut().pop_front().is_some() {}
    }

    /// Moves every element of `donor` to the back of this list in O(1),
    /// preserving their order. `donor` is left empty.
    pub fn append_from(mut self: Pin<&mut Self>, mut donor: Pin<&mut Self>) {
        if donor.is_empty() {
            return;
        }
        let at = self.as_mut().head_mut().as_ptr();
        let from = donor.head.next();
        let to = donor.as_mut().head_mut().as_ptr();
        unsafe { ListEntry::splice_before(at, from, to) };
    }

    /// Replaces the contents of this list with those of `donor`, leaving `donor`
    /// empty. The pinned equivalent of move assignment: every node of `donor`
    /// becomes a member of this list, and this list's previous nodes are detached.
    pub fn take_from(mut self: Pin<&mut Self>, donor: Pin<&mut Self>) {
        self.as_mut().clear();
        self.append_from(donor);
    }

    /// Provides an unsafe forward iterator.
    ///
    /// # Note
    ///
    /// The caller should be careful when removing nodes currently accessed by iterators.
    /// If an iterator's current node gets removed, the iterator will get stuck at the
    /// current node and never advance.
    ///
    /// # Safety
    ///
    /// No element of the list is mutated or dropped while the returned
    /// iterator or any item borrowed from it is alive.
    pub unsafe fn iter_unchecked(&self) -> Iter<'_, T, Tag> {
        Iter {
            last: &self.head as *const _ as *mut _,
            curr: self.head.next(),
            _marker: PhantomData,
        }
    }

    /// Provides an unsafe, mutable forward iterator.
    /// See [`List::iter_unchecked`] for details.
    ///
    /// # Safety
    ///
    /// No element of the list is accessed or dropped by anyone else while the
    /// returned iterator or any item borrowed from it is alive.
    pub unsafe fn iter_pin_mut_unchecked(mut self: Pin<&mut Self>) -> IterPinMut<'_, T, Tag> {
        IterPinMut {
            last: self.as_mut().head_mut().as_ptr(),
            curr: self.head.next(),
            _marker: PhantomData,
        }
    }
}

#[pinned_drop]
impl<T, Tag> PinnedDrop for List<T, Tag>
where
    T: ListNode<Tag>,
{
    fn drop(self: Pin<&mut Self>) {
        // Detach every remaining node so that none of them is left pointing at the
        // sentinel once it is gone.
        self.clear();
    }
}

impl<'s, T: 's, Tag> Iterator for Iter<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        if ptr::eq(self.last, self.curr) {
            None
        } else {
            // Safe since `self.curr` is a `ListEntry` contained inside a `T`.
            let ptr = T::from_list_entry(self.curr) as *const T;
            let res = Some(unsafe { &*ptr });
            let curr = unsafe { &*self.curr };
            debug_assert_ne!(self.curr, curr.next(), "loops forever");
            self.curr = curr.next();
            res
        }
    }
}

impl<'s, T: 's, Tag> DoubleEndedIterator for Iter<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if ptr::eq(self.last, self.curr) {
            None
        } else {
            let last = unsafe { &*self.last };
            debug_assert_ne!(self.last, last.prev(), "loops forever");
            self.last = last.prev();
            // Safe since `self.last` is a `ListEntry` contained inside a `T`.
            let ptr = T::from_list_entry(self.last) as *const T;
            Some(unsafe { &*ptr })
        }
    }
}

impl<'s, T: 's, Tag> Iterator for IterPinMut<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    type Item = Pin<&'s mut T>;

    fn next(&mut self) -> Option<Self::Item> {
        if ptr::eq(self.last, self.curr) {
            None
        } else {
            // Safe since `self.curr` is a `ListEntry` contained inside a `T`.
            let ptr = T::from_list_entry(self.curr);
            let curr = unsafe { &*self.curr };
            debug_assert_ne!(self.curr, curr.next(), "loops forever");
            self.curr = curr.next();
            Some(unsafe { Pin::new_unchecked(&mut *ptr) })
        }
    }
}

impl<'s, T: 's, Tag> DoubleEndedIterator for IterPinMut<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if ptr::eq(self.last, self.curr) {
            None
        } else {
            let last = unsafe { &*self.last };
            debug_assert_ne!(self.last, last.prev(), "loops forever");
            self.last = last.prev();
            // Safe since `self.last` is a `ListEntry` contained inside a `T`.
            let ptr = T::from_list_entry(self.last);
            Some(unsafe { Pin::new_unchecked(&mut *ptr) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn values(list: &List<Node<i32>>) -> Vec<i32> {
        unsafe { list.iter_unchecked() }
            .map(|n| *unsafe { n.get_unchecked(list) })
            .collect()
    }

    fn values_rev(list: &List<Node<i32>>) -> Vec<i32> {
        unsafe { list.iter_unchecked() }
            .rev()
            .map(|n| *unsafe { n.get_unchecked(list) })
            .collect()
    }

    #[test]
    fn empty_list() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        assert!(list.is_empty());
        assert!(list.front().is_none());
        assert!(list.back().is_none());
        assert!(list.as_mut().pop_front().is_none());
        assert!(list.as_mut().pop_back().is_none());
        assert_eq!(unsafe { list.iter_unchecked() }.count(), 0);

        // `clear` of an empty list is a no-op.
        list.as_mut().clear();
        assert!(list.is_empty());
    }

    #[test]
    fn push_and_traverse() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        let mut a = unsafe { Node::new(1) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { Node::new(2) };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        let mut c = unsafe { Node::new(3) };
        let mut c = unsafe { Pin::new_unchecked(&mut c) };
        a.as_mut().init();
        b.as_mut().init();
        c.as_mut().init();

        list.as_mut().push_back(a.as_mut());
        list.as_mut().push_back(b.as_mut());
        list.as_mut().push_back(c.as_mut());

        assert_eq!(values(&list), [1, 2, 3]);
        // Reverse traversal visits the same nodes in opposite order.
        assert_eq!(values_rev(&list), [3, 2, 1]);

        let front = list.front().unwrap();
        let back = list.back().unwrap();
        assert_eq!(*unsafe { (*front).get_unchecked(&list) }, 1);
        assert_eq!(*unsafe { (*back).get_unchecked(&list) }, 3);

        list.as_mut().clear();
        assert!(list.is_empty());
        assert!(a.try_get().is_some());
        assert!(b.try_get().is_some());
        assert!(c.try_get().is_some());

        // A cleared list is immediately reusable.
        list.as_mut().push_back(b.as_mut());
        let front = list.front().unwrap();
        assert_eq!(*unsafe { (*front).get_unchecked(&list) }, 2);
    }

    #[test]
    fn push_front_pop_order() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        let mut a = unsafe { Node::new(1) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { Node::new(2) };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        a.as_mut().init();
        b.as_mut().init();

        list.as_mut().push_front(a.as_mut());
        list.as_mut().push_front(b.as_mut());
        assert_eq!(values(&list), [2, 1]);

        let popped = list.as_mut().pop_back().unwrap();
        assert!(core::ptr::eq(popped, &*a));
        assert_eq!(*a.try_get().unwrap(), 1);
        assert_eq!(values(&list), [2]);

        let popped = list.as_mut().pop_front().unwrap();
        assert!(core::ptr::eq(popped, &*b));
        assert!(list.is_empty());
    }

    #[test]
    fn iter_pin_mut_mutates() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        let mut a = unsafe { Node::new(10) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { Node::new(20) };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        a.as_mut().init();
        b.as_mut().init();
        list.as_mut().push_back(a.as_mut());
        list.as_mut().push_back(b.as_mut());

        let mut sum = 0;
        for node in unsafe { list.as_mut().iter_pin_mut_unchecked() } {
            let data = unsafe { node.get_mut_unchecked() };
            *data += 1;
            sum += *data;
        }
        assert_eq!(sum, 11 + 21);
        assert_eq!(values(&list), [11, 21]);
    }

    #[test]
    fn dropping_linked_node_unlinks() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        let mut a = unsafe { Node::new(1) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        a.as_mut().init();
        list.as_mut().push_back(a.as_mut());
        {
            let mut b = unsafe { Node::new(2) };
            let mut b = unsafe { Pin::new_unchecked(&mut b) };
            b.as_mut().init();
            list.as_mut().push_back(b.as_mut());
            assert_eq!(values(&list), [1, 2]);
        }
        // `b` went out of scope while linked; the list must have healed around it.
        assert_eq!(values(&list), [1]);
    }

    #[test]
    fn take_from_moves_membership() {
        let mut src = unsafe { List::<Node<i32>>::new() };
        let mut src = unsafe { Pin::new_unchecked(&mut src) };
        src.as_mut().init();
        let mut dst = unsafe { List::<Node<i32>>::new() };
        let mut dst = unsafe { Pin::new_unchecked(&mut dst) };
        dst.as_mut().init();

        let mut a = unsafe { Node::new(1) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { Node::new(2) };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        let mut c = unsafe { Node::new(3) };
        let mut c = unsafe { Pin::new_unchecked(&mut c) };
        let mut d = unsafe { Node::new(9) };
        let mut d = unsafe { Pin::new_unchecked(&mut d) };
        a.as_mut().init();
        b.as_mut().init();
        c.as_mut().init();
        d.as_mut().init();

        src.as_mut().push_back(a.as_mut());
        src.as_mut().push_back(b.as_mut());
        src.as_mut().push_back(c.as_mut());
        dst.as_mut().push_back(d.as_mut());

        dst.as_mut().take_from(src.as_mut());
        assert!(src.is_empty());
        assert_eq!(values(&dst), [1, 2, 3]);
        // The old member of `dst` was detached, not dropped.
        assert_eq!(*d.try_get().unwrap(), 9);

        // The transferred nodes now unlink from `dst` on removal.
        b.as_mut().unlink();
        assert_eq!(values(&dst), [1, 3]);
    }

    #[test]
    fn append_from_preserves_both_orders() {
        let mut src = unsafe { List::<Node<i32>>::new() };
        let mut src = unsafe { Pin::new_unchecked(&mut src) };
        src.as_mut().init();
        let mut dst = unsafe { List::<Node<i32>>::new() };
        let mut dst = unsafe { Pin::new_unchecked(&mut dst) };
        dst.as_mut().init();

        let mut a = unsafe { Node::new(1) };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { Node::new(2) };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        let mut c = unsafe { Node::new(3) };
        let mut c = unsafe { Pin::new_unchecked(&mut c) };
        a.as_mut().init();
        b.as_mut().init();
        c.as_mut().init();

        dst.as_mut().push_back(a.as_mut());
        src.as_mut().push_back(b.as_mut());
        src.as_mut().push_back(c.as_mut());

        dst.as_mut().append_from(src.as_mut());
        assert!(src.is_empty());
        assert_eq!(values(&dst), [1, 2, 3]);

        // Appending an empty donor is a no-op.
        dst.as_mut().append_from(src.as_mut());
        assert_eq!(values(&dst), [1, 2, 3]);
    }

    #[test]
    fn randomized_against_model() {
        let mut list = unsafe { List::<Node<i32>>::new() };
        let mut list = unsafe { Pin::new_unchecked(&mut list) };
        list.as_mut().init();

        let mut nodes: Vec<Pin<Box<Node<i32>>>> =
            (0..64).map(|i| Box::pin(unsafe { Node::new(i) })).collect();
        for node in &mut nodes {
            node.as_mut().init();
        }

        let rng = fastrand::Rng::with_seed(0x1157);
        let mut model: Vec<i32> = Vec::new();
        for _ in 0..1000 {
            match rng.u32(0..5) {
                0 => {
                    // Push the lowest detached value at the back.
                    if let Some(i) = (0..64).find(|i| nodes[*i as usize].try_get().is_some()) {
                        list.as_mut().push_back(nodes[i as usize].as_mut());
                        model.push(i);
                    }
                }
                1 => {
                    // Push the highest detached value at the front.
                    if let Some(i) = (0..64).rev().find(|i| nodes[*i as usize].try_get().is_some())
                    {
                        list.as_mut().push_front(nodes[i as usize].as_mut());
                        model.insert(0, i);
                    }
                }
                2 => {
                    let popped = list.as_mut().pop_front();
                    if model.is_empty() {
                        assert!(popped.is_none());
                    } else {
                        model.remove(0);
                        assert!(popped.is_some());
                    }
                }
                3 => {
                    let popped = list.as_mut().pop_back();
                    if model.pop().is_some() {
                        assert!(popped.is_some());
                    } else {
                        assert!(popped.is_none());
                    }
                }
                _ => {
                    // Unlink a random linked node directly, without going through
                    // the list.
                    if !model.is_empty() {
                        let k = rng.usize(0..model.len());
                        let i = model.remove(k);
                        nodes[i as usize].as_mut().unlink();
                    }
                }
            }
            assert_eq!(values(&list), model);
            assert_eq!(
                values_rev(&list),
                model.iter().rev().copied().collect::<Vec<_>>()
            );
        }
    }
}
