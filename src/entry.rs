//! The link primitive embedded inside every list member.
//!
//! A [`ListEntry`] is a pair of raw `prev`/`next` pointers forming one slot of a
//! circular ring. A detached entry is self-linked, so traversal and splicing never
//! need null checks. Entries are `!Unpin`: once linked, an entry's neighbors hold
//! its address, and moving it would leave them dangling.

use core::marker::{PhantomData, PhantomPinned};
use core::pin::Pin;
use core::ptr;

use pin_project::{pin_project, pinned_drop};
use static_assertions::assert_not_impl_any;

/// Tag used when an element participates in only one list, so that users with a
/// single membership axis need not invent their own.
pub struct DefaultTag;

/// A low level primitive for doubly, intrusive linked lists and nodes.
///
/// The `Tag` parameter is a zero-sized marker distinguishing independent
/// memberships of the same element at the type level. Entries with different tags
/// are distinct types and cannot be linked together.
///
/// # Safety
///
/// * All `ListEntry` types must be used only after initializing it with `ListEntry::init`.
/// After this, `ListEntry::{prev, next}` always refer to a valid, initialized `ListEntry`
/// of the same tag.
#[pin_project(PinnedDrop)]
pub struct ListEntry<Tag = DefaultTag> {
    prev: *mut Self,
    next: *mut Self,
    #[pin]
    _pin: PhantomPinned, //`ListEntry` is `!Unpin`.
    _tag: PhantomData<Tag>,
}

assert_not_impl_any!(ListEntry: Unpin);

impl<Tag> ListEntry<Tag> {
    /// Returns an uninitialized `ListEntry`,
    ///
    /// # Safety
    ///
    /// All `ListEntry` types must be used only after initializing it with `ListEntry::init`.
    pub const unsafe fn new() -> Self {
        Self {
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
            _pin: PhantomPinned,
            _tag: PhantomData,
        }
    }

    /// Gets a raw pointer from this `Pin` that points to the same referent.
    pub(crate) fn as_ptr(self: &mut Pin<&mut Self>) -> *mut Self {
        unsafe { self.as_mut().get_unchecked_mut() }
    }

    /// Initializes this `ListEntry` by self-linking it, if it was not initialized.
    /// Otherwise, does nothing.
    pub fn init(mut self: Pin<&mut Self>) {
        if self.next.is_null() {
            let ptr = self.as_ptr();
            *self.as_mut().project().prev = ptr;
            *self.as_mut().project().next = ptr;
        }
    }

    /// Returns a raw pointer pointing to the previous `ListEntry`.
    ///
    /// # Note
    ///
    /// Do not use `ListNode::from_list_entry` on the returned pointer if `self` is
    /// the front node of a list: the result would be the list's sentinel.
    pub fn prev(&self) -> *mut Self {
        self.prev
    }

    /// Returns a raw pointer pointing to the next `ListEntry`.
    ///
    /// # Note
    ///
    /// Do not use `ListNode::from_list_entry` on the returned pointer if `self` is
    /// the back node of a list: the result would be the list's sentinel.
    pub fn next(&self) -> *mut Self {
        self.next
    }

    /// Returns `true` if this `ListEntry` is not linked to any other `ListEntry`.
    /// Otherwise, returns `false`.
    pub fn is_unlinked(&self) -> bool {
        ptr::eq(self.next, self)
    }

    /// Inserts `elt` at the back of this `ListEntry` after unlinking `elt`.
    pub(crate) fn push_back(mut self: Pin<&mut Self>, mut elt: Pin<&mut Self>) {
        if !elt.is_unlinked() {
            elt.as_mut().remove();
        }

        *elt.as_mut().project().next = self.as_ptr();
        *elt.as_mut().project().prev = self.prev;
        unsafe {
            (*self.prev).next = elt.as_ptr();
        }
        *self.as_mut().project().prev = elt.as_ptr();
    }

    /// Inserts `elt` in front of this `ListEntry` after unlinking `elt`.
    pub(crate) fn push_front(mut self: Pin<&mut Self>, mut elt: Pin<&mut Self>) {
        if !elt.is_unlinked() {
            elt.as_mut().remove();
        }

        *elt.as_mut().project().next = self.next;
        *elt.as_mut().project().prev = self.as_ptr();
        unsafe {
            (*self.next).prev = elt.as_ptr();
        }
        *self.as_mut().project().next = elt.as_ptr();
    }

    /// Unlinks this `ListEntry` from other `ListEntry`s, leaving it self-linked.
    /// Calling this on an already detached entry is a no-op, so an entry can be
    /// removed without knowing which list holds it.
    pub fn remove(mut self: Pin<&mut Self>) {
        unsafe {
            (*self.prev).next = self.next;
            (*self.next).prev = self.prev;
        }
        let ptr = self.as_ptr();
        *self.as_mut().project().prev = ptr;
        *self.as_mut().project().next = ptr;
    }

    /// Moves the non-empty run `[from, to)` of a ring in front of `at`.
    /// Only the four boundary links change, so the cost is O(1) regardless of the
    /// run's length.
    ///
    /// # Safety
    ///
    /// * `at`, `from` and `to` point to valid, initialized, linked entries.
    /// * `to` is reachable from `from` by following `next` without passing `from`
    ///   again, and `from != to`.
    /// * `at` is not inside `[from, to)`.
    pub(crate) unsafe fn splice_before(at: *mut Self, from: *mut Self, to: *mut Self) {
        unsafe {
            let last = (*to).prev;

            // Cut the run out of the donor ring.
            (*(*from).prev).next = to;
            (*to).prev = (*from).prev;

            // Stitch it in between `(*at).prev` and `at`.
            let before = (*at).prev;
            (*before).next = from;
            (*from).prev = before;
            (*last).next = at;
            (*at).prev = last;
        }
    }
}

#[pinned_drop]
impl<Tag> PinnedDrop for ListEntry<Tag> {
    fn drop(self: Pin<&mut Self>) {
        // A linked entry that goes out of scope must not leave its neighbors
        // pointing at freed memory. An entry that was never initialized has no
        // neighbors to fix up.
        if !self.next.is_null() {
            self.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_self_links() {
        let mut e = unsafe { ListEntry::<DefaultTag>::new() };
        let mut e = unsafe { Pin::new_unchecked(&mut e) };
        e.as_mut().init();
        assert!(e.is_unlinked());

        // Idempotent.
        e.as_mut().init();
        assert!(e.is_unlinked());
    }

    #[test]
    fn remove_detached_is_noop() {
        let mut e = unsafe { ListEntry::<DefaultTag>::new() };
        let mut e = unsafe { Pin::new_unchecked(&mut e) };
        e.as_mut().init();
        e.as_mut().remove();
        assert!(e.is_unlinked());
        e.as_mut().remove();
        assert!(e.is_unlinked());
    }

    #[test]
    fn remove_relinks_neighbors() {
        let mut a = unsafe { ListEntry::<DefaultTag>::new() };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        let mut b = unsafe { ListEntry::<DefaultTag>::new() };
        let mut b = unsafe { Pin::new_unchecked(&mut b) };
        let mut c = unsafe { ListEntry::<DefaultTag>::new() };
        let mut c = unsafe { Pin::new_unchecked(&mut c) };
        a.as_mut().init();
        b.as_mut().init();
        c.as_mut().init();

        // Treat `a` as the ring's anchor: a <-> b <-> c.
        a.as_mut().push_back(b.as_mut());
        a.as_mut().push_back(c.as_mut());
        assert!(ptr::eq(a.next(), &*b));
        assert!(ptr::eq(b.next(), &*c));
        assert!(ptr::eq(c.next(), &*a));
        assert!(ptr::eq(a.prev(), &*c));

        b.as_mut().remove();
        assert!(b.is_unlinked());
        assert!(ptr::eq(a.next(), &*c));
        assert!(ptr::eq(c.prev(), &*a));
    }

    #[test]
    fn drop_unlinks() {
        let mut a = unsafe { ListEntry::<DefaultTag>::new() };
        let mut a = unsafe { Pin::new_unchecked(&mut a) };
        a.as_mut().init();
        {
            let mut b = unsafe { ListEntry::<DefaultTag>::new() };
            let mut b = unsafe { Pin::new_unchecked(&mut b) };
            b.as_mut().init();
            a.as_mut().push_back(b.as_mut());
            assert!(!a.is_unlinked());
        }
        // `b` dropped while linked; it must have removed itself.
        assert!(a.is_unlinked());
    }
}
