// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_option_tree --heading-base-level=0

//! Understory Option Tree: nested option catalogs for select widgets.
//!
//! This crate is the data and navigation layer underneath a dropdown or combobox.
//! It knows nothing about rendering, focus, or timers; it answers two questions
//! deterministically for any option tree:
//!
//! - What is the flat sequence of navigable rows? See [`flatten`].
//! - Where does the highlight land after moving by `n` rows? See [`move_by`].
//!
//! ## Model
//!
//! - [`OptionNode`]: a leaf ([`OptionLeaf`]), a group ([`OptionGroup`]) of further
//!   nodes, or the [`OptionNode::Creatable`] sentinel offered when new values can be
//!   created from typed text.
//! - [`OptionValue`]: the opaque, equality-comparable identifier of a leaf.
//! - [`Address`]: a path of child indices from the root to a node. The empty address
//!   means "nothing highlighted". Addresses are plain values: compare them with `==`,
//!   store them, send them across threads.
//!
//! ## Navigation
//!
//! Rows are the nodes of the tree in pre-order: a group's header comes first,
//! followed by its children. [`move_by`] walks that order one step at a time,
//! recursing into groups and backing out of them, and saturates at the first and
//! last rows instead of wrapping. Addresses that no longer resolve (for example
//! because the tree was replaced mid-navigation) are returned unchanged.
//!
//! ```rust
//! use understory_option_tree::{Address, OptionNode, flatten_all, move_by};
//!
//! let tree = vec![
//!     OptionNode::leaf("A", 1),
//!     OptionNode::group("Group", vec![OptionNode::leaf("B", 2)]),
//! ];
//!
//! let first = move_by(&tree, &Address::new(), 1);
//! assert_eq!(first, Address::from([0]));
//! let header = move_by(&tree, &first, 1);
//! assert_eq!(header, Address::from([1]));
//! assert_eq!(move_by(&tree, &header, 1), Address::from([1, 0]));
//!
//! // Moving backward from nothing lands on the deepest last row.
//! assert_eq!(move_by(&tree, &Address::new(), -1), Address::from([1, 0]));
//!
//! assert_eq!(flatten_all(&tree).len(), 3);
//! ```
//!
//! ## Local search
//!
//! [`filter_tree`] performs the case-insensitive substring filtering used when the
//! options are a static tree: leaves whose text label contains the query survive,
//! and groups survive only with their matching descendants.
//!
//! ## Features
//!
//! - `std` (default): implements `std::error::Error` through `thiserror`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod address;
mod nav;
mod node;
mod search;
mod value;

pub use address::{Address, InvalidAddress};
pub use nav::{
    Flatten, count_nodes, first, flatten, flatten_all, is_valid, last, locate_value, move_by,
    relocate, resolve, try_resolve,
};
pub use node::{OptionGroup, OptionLeaf, OptionNode, OptionTree};
pub use search::{filter_tree, normalize_query, remove_values};
pub use value::{Additional, Label, OptionValue};
