#![deny(missing_docs)]

//! Ordered sets of unique, caller-comparable elements, with two
//! interchangeable engines: a multi-way balanced search tree ([`BTree`]) and
//! a binary red-black tree ([`RbTree`]).
//!
//! Both engines guarantee logarithmic insert, search, remove, minimum and
//! maximum for arbitrary operation sequences, and expose one contract
//! ([`OrderedSet`]): ordering comes from a [`Compare`] strategy fixed at
//! construction time, failures are explained through a side-channel [`Flag`]
//! on the handle, and an optional [`Destroyer`] finalizes elements as they
//! leave the set.
//!
//! # Example
//!
//! ```
//!     use ordset::{BTree, Natural, RbTree};
//!     let mut cities = BTree::new(8, Natural).unwrap();
//!     cities.insert("London");
//!     cities.insert("Paris");
//!     assert!(cities.contains(&"Paris"));
//!
//!     let mut numbers = RbTree::new(Natural);
//!     numbers.extend([3, 1, 2]);
//!     assert_eq!(numbers.iter().copied().collect::<Vec<i32>>(), vec![1, 2, 3]);
//! ```
//!
//! # Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of both tree types via serde crate.

pub mod btree;
pub mod contract;
pub mod rbtree;

mod arena;

pub use btree::BTree;
pub use contract::{Compare, Destroyer, Flag, Natural, OrderedSet};
pub use rbtree::RbTree;

/// Branching factor used by [`BTree`] handles constructed via `Default`,
/// `FromIterator` or deserialisation.
pub const DEFAULT_ORDER: usize = 32;

// Tests.

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri)))]
use mimalloc::MiMalloc;

#[cfg(all(test, not(miri)))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(test)]
mod mytests;
