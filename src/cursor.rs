//! Cursors: bidirectional positions over a [`List`].
//!
//! A cursor is like an iterator, except that it can freely seek back-and-forth and,
//! for [`CursorMut`], edit the list at its position. Both kinds also point at one
//! extra "ghost" position, the list's sentinel, which closes the ring: moving past
//! the back lands on the ghost, and moving past the ghost lands on the front.
//! `current` returns `None` at the ghost, so the ghost can never be mistaken for an
//! element.
//!
//! At most one `CursorMut` per list exists at a time (it mutably borrows the list),
//! while any number of `Cursor`s may observe it. A `CursorMut` converts to a
//! `Cursor` via [`CursorMut::as_cursor`]; there is no conversion back.

use core::marker::PhantomData;
use core::pin::Pin;
use core::ptr;

use crate::entry::{DefaultTag, ListEntry};
use crate::list::{List, ListNode};

/// A cursor over a `List`.
pub struct Cursor<'s, T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    head: *mut ListEntry<Tag>,
    current: *mut ListEntry<Tag>,
    _marker: PhantomData<&'s List<T, Tag>>,
}

/// A raw snapshot of a cursor position, not tied to the list's borrow.
///
/// A `Position` is the argument form for [`CursorMut::splice_before`]: it lets a
/// range of one list be named while a `CursorMut` of the same (or another) list is
/// alive. It grants no access to the element; like the raw pointers handed out by
/// [`List`], it is only meaningful while the entry it names stays linked and alive,
/// and every use that feeds it back into the list is `unsafe`.
pub struct Position<T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    entry: *mut ListEntry<Tag>,
    _marker: PhantomData<*mut T>,
}

/// A cursor over a `List` with editing operations.
///
/// Note that the references handed out by a `CursorMut` borrow the `CursorMut`
/// itself, so only one mutable access path into the list exists at a time.
pub struct CursorMut<'s, T, Tag = DefaultTag>
where
    T: ListNode<Tag>,
{
    head: *mut ListEntry<Tag>,
    current: *mut ListEntry<Tag>,
    _marker: PhantomData<&'s mut List<T, Tag>>,
}

impl<T, Tag> List<T, Tag>
where
    T: ListNode<Tag>,
{
    /// Provides a cursor at the front element.
    /// The cursor is pointing to the ghost position if the list is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, Tag> {
        Cursor {
            head: self.head() as *const _ as *mut _,
            current: self.head().next(),
            _marker: PhantomData,
        }
    }

    /// Provides a cursor at the back element.
    /// The cursor is pointing to the ghost position if the list is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, Tag> {
        Cursor {
            head: self.head() as *const _ as *mut _,
            current: self.head().prev(),
            _marker: PhantomData,
        }
    }

    /// Provides a cursor with editing operations at the front element.
    /// The cursor is pointing to the ghost position if the list is empty.
    pub fn cursor_front_mut(mut self: Pin<&mut Self>) -> CursorMut<'_, T, Tag> {
        let head = self.as_mut().head_mut().as_ptr();
        CursorMut {
            head,
            current: self.head().next(),
            _marker: PhantomData,
        }
    }

    /// Provides a cursor with editing operations at the back element.
    /// The cursor is pointing to the ghost position if the list is empty.
    pub fn cursor_back_mut(mut self: Pin<&mut Self>) -> CursorMut<'_, T, Tag> {
        let head = self.as_mut().head_mut().as_ptr();
        CursorMut {
            head,
            current: self.head().prev(),
            _marker: PhantomData,
        }
    }
}

impl<'s, T, Tag> Cursor<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    /// Provides a raw pointer to the element the cursor points at, or `None` at
    /// the ghost position.
    pub fn current(&self) -> Option<*mut T> {
        if ptr::eq(self.head, self.current) {
            None
        } else {
            Some(T::from_list_entry(self.current))
        }
    }

    /// Moves the cursor to the previous position of the `List`.
    pub fn move_prev(&mut self) {
        self.current = unsafe { &*self.current }.prev();
    }

    /// Moves the cursor to the next position of the `List`.
    pub fn move_next(&mut self) {
        self.current = unsafe { &*self.current }.next();
    }

    /// Provides a raw pointer to the previous element, or `None` if it is the
    /// ghost position.
    pub fn peek_prev(&self) -> Option<*mut T> {
        let ptr = unsafe { &*self.current }.prev();
        if ptr::eq(self.head, ptr) {
            None
        } else {
            Some(T::from_list_entry(ptr))
        }
    }

    /// Provides a raw pointer to the next element, or `None` if it is the
    /// ghost position.
    pub fn peek_next(&self) -> Option<*mut T> {
        let ptr = unsafe { &*self.current }.next();
        if ptr::eq(self.head, ptr) {
            None
        } else {
            Some(T::from_list_entry(ptr))
        }
    }

    /// Takes a raw snapshot of the current position, releasing the list's borrow.
    pub fn position(&self) -> Position<T, Tag> {
        Position {
            entry: self.current,
            _marker: PhantomData,
        }
    }
}

impl<T, Tag> Clone for Position<T, Tag>
where
    T: ListNode<Tag>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Tag> Copy for Position<T, Tag> where T: ListNode<Tag> {}

/// Two positions are equal when they name the same entry, regardless of the
/// element's value.
impl<T, Tag> PartialEq for Position<T, Tag>
where
    T: ListNode<Tag>,
{
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.entry, other.entry)
    }
}

impl<T, Tag> Eq for Position<T, Tag> where T: ListNode<Tag> {}

impl<T, Tag> Clone for Cursor<'_, T, Tag>
where
    T: ListNode<Tag>,
{
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            current: self.current,
            _marker: PhantomData,
        }
    }
}

/// Two cursors are equal when they point at the same entry of the same list,
/// regardless of the element's value.
impl<T, Tag> PartialEq for Cursor<'_, T, Tag>
where
    T: ListNode<Tag>,
{
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.current, other.current)
    }
}

impl<T, Tag> Eq for Cursor<'_, T, Tag> where T: ListNode<Tag> {}

impl<'s, T, Tag> CursorMut<'s, T, Tag>
where
    T: ListNode<Tag>,
{
    fn current_entry(&mut self) -> Pin<&mut ListEntry<Tag>> {
        unsafe { Pin::new_unchecked(&mut *self.current) }
    }

    /// Returns a read-only cursor pointing to the current position.
    /// This is the only direction the conversion goes; a `Cursor` never becomes
    /// a `CursorMut`.
    pub fn as_cursor(&self) -> Cursor<'_, T, Tag> {
        Cursor {
            head: self.head,
            current: self.current,
            _marker: PhantomData,
        }
    }

    /// Provides a raw pointer to the element the cursor points at, or `None` at
    /// the ghost position.
    pub fn current(&self) -> Option<*mut T> {
        if ptr::eq(self.head, self.current) {
            None
        } else {
            Some(T::from_list_entry(self.current))
        }
    }

    /// Moves the cursor to the previous position of the `List`.
    pub fn move_prev(&mut self) {
        self.current = unsafe { &*self.current }.prev();
    }

    /// Moves the cursor to the next position of the `List`.
    pub fn move_next(&mut self) {
        self.current = unsafe { &*self.current }.next();
    }

    /// Provides a raw pointer to the previous element, or `None` if it is the
    /// ghost position.
    pub fn peek_prev(&self) -> Option<*mut T> {
        let ptr = unsafe { &*self.current }.prev();
        if ptr::eq(self.head, ptr) {
            None
        } else {
            Some(T::from_list_entry(ptr))
        }
    }

    /// Provides a raw pointer to the next element, or `None` if it is the
    /// ghost position.
    pub fn peek_next(&self) -> Option<*mut T> {
        let ptr = unsafe { &*self.current }.next();
        if ptr::eq(self.head, ptr) {
            None
        } else {
            Some(T::from_list_entry(ptr))
        }
    }

    /// Inserts `elt` immediately before the current position after unlinking it.
    /// The cursor's position is unchanged; the new element becomes its `peek_prev`.
    /// At the ghost position this inserts at the back of the list.
    pub fn insert_before(&mut self, elt: Pin<&mut T>) {
        self.current_entry().push_back(elt.get_list_entry());
    }

    /// Inserts `elt` immediately after the current position after unlinking it.
    /// The cursor's position is unchanged; the new element becomes its `peek_next`.
    /// At the ghost position this inserts at the front of the list.
    pub fn insert_after(&mut self, elt: Pin<&mut T>) {
        self.current_entry().push_front(elt.get_list_entry());
    }

    /// Removes the current element from the `List` and returns a raw pointer to
    /// it, moving the cursor to the following position. Returns `None` at the
    /// ghost position, leaving the cursor where it is.
    pub fn remove_current(&mut self) -> Option<*mut T> {
        if ptr::eq(self.head, self.current) {
            None
        } else {
            let removed = self.current;
            let entry = self.current_entry();
            let next = entry.next();
            entry.remove();
            self.current = next;
            Some(T::from_list_entry(removed))
        }
    }

    /// Takes a raw snapshot of the current position, usable while this cursor
    /// keeps borrowing the list.
    pub fn position(&self) -> Position<T, Tag> {
        Position {
            entry: self.current,
            _marker: PhantomData,
        }
    }

    /// Transfers the half-open range `[from, to)` out of its list and links it
    /// immediately before the current position, in order. Only four boundary
    /// links change, so the cost is O(1) regardless of the range's length.
    /// An empty range (`from == to`) is a no-op.
    ///
    /// # Safety
    ///
    /// * `from` and `to` are live positions of one list (the donor), with `to`
    ///   reachable from `from` by repeated `move_next` without wrapping past the
    ///   ghost position in between; a reversed range is undefined behavior.
    /// * The donor may be this cursor's own list, but then the current position
    ///   must not lie inside `[from, to)`.
    /// * No one else accesses the donor during the call.
    pub unsafe fn splice_before(&mut self, from: Position<T, Tag>, to: Position<T, Tag>) {
        if ptr::eq(from.entry, to.entry) {
            return;
        }
        unsafe { ListEntry::splice_before(self.current, from.entry, to.entry) };
    }
}
