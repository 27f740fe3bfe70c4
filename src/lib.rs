//! Pinned intrusive doubly-linked lists that do not own their nodes.
//!
//! An intrusive list keeps its `prev`/`next` links *inside* the element, as an
//! embedded [`ListEntry`], instead of allocating separate node cells. The list
//! never owns, allocates or frees element storage; membership is a property of the
//! element. That makes three things cheap that ordinary lists cannot do at all:
//! an element can unlink itself in O(1) without knowing which list holds it, a
//! contiguous run of elements can be spliced from one list into another in O(1),
//! and one element can sit in several independent lists at once, one membership
//! per type-level tag.
//!
//! # Lifetime-less intrusive linked lists
//!
//! Intrusive linked lists are interesting and useful because the list does not own
//! the nodes. However, they can also be unsafe if the nodes could move or drop
//! while inserted in a list. Hence, many intrusive linked lists written in Rust
//! use lifetimes and prohibit nodes from being moved or dropped during the list's
//! whole lifetime, which also means nodes cannot be mutated, moved or dropped even
//! after they were removed from the list.
//!
//! In contrast, [`List`] does not tie node lifetimes to the list. Nodes are pinned
//! (`ListEntry` is `!Unpin`) so their addresses stay stable, and a node that drops
//! while it is still linked simply removes itself from the list first. In exchange,
//! the methods of [`List`] never return a reference to an element and always return
//! a raw pointer instead: an element could be mutated or dropped at any time, and
//! the caller must make sure it is neither when dereferencing.
//!
//! Everything here is allocation-free and `no_std`; there is no locking, no size
//! counter and no sorting. Misuse that the type system cannot rule out
//! (dereferencing a stale raw pointer, splicing a reversed range) is declared
//! undefined behavior on the respective `unsafe fn` rather than checked at
//! runtime.
//!
//! # Example
//!
//! ```
//! use core::pin::Pin;
//! use pinlist::{List, Node};
//!
//! let mut list = unsafe { List::<Node<i32>>::new() };
//! let mut list = unsafe { Pin::new_unchecked(&mut list) };
//! list.as_mut().init();
//!
//! let mut node = unsafe { Node::new(10) };
//! let mut node = unsafe { Pin::new_unchecked(&mut node) };
//! node.as_mut().init();
//!
//! list.as_mut().push_back(node.as_mut());
//! assert!(!list.is_empty());
//!
//! // The node unlinks itself, with no list involvement.
//! node.as_mut().unlink();
//! assert!(list.is_empty());
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs, rust_2018_idioms, unsafe_op_in_unsafe_fn)]

mod cursor;
mod entry;
mod list;
mod node;

pub use cursor::{Cursor, CursorMut, Position};
pub use entry::{DefaultTag, ListEntry};
pub use list::{Iter, IterPinMut, List, ListNode};
pub use node::Node;
