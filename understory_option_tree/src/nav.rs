// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-order flattening and highlight movement over option trees.
//!
//! ## Row order
//!
//! Every node is a row: group headers, leaves, and the creatable sentinel alike.
//! Rows are visited in pre-order, so a group's header is immediately followed by
//! its children. [`flatten`] enumerates that order and [`move_by`] walks it.
//!
//! ## Movement
//!
//! [`move_by`] repeats a single recursive step `|delta|` times:
//!
//! - Forward from the empty address lands on the first row. From a group header
//!   with children it descends to the first child. From inside a group it first
//!   tries to advance within the group; once the group is exhausted the rest of the
//!   address is abandoned and the walk continues with the group's next sibling.
//! - Backward from the empty address lands on the deepest last descendant. From
//!   inside a group it first tries to retreat within the group; once the group is
//!   exhausted it lands on the group's header. From a top-of-group position it
//!   enters the previous sibling at its deepest last descendant.
//!
//! When a step finds no room the walk stops where it is, so repeated page moves
//! saturate at the first and last rows instead of wrapping.

use alloc::vec::Vec;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::{Address, InvalidAddress, OptionNode, OptionValue};

/// Lazy pre-order iterator over the addresses of an option tree.
///
/// Cloning the iterator restarts nothing; it forks the traversal at its current
/// position. Call [`flatten`] again to restart from the first row.
#[derive(Clone, Debug)]
pub struct Flatten<'a> {
    stack: SmallVec<[(&'a [OptionNode], usize); 4]>,
    prefix: SmallVec<[usize; 4]>,
}

/// Enumerate every node address in pre-order.
///
/// The sequence is deterministic: the same tree always yields the same addresses.
pub fn flatten(tree: &[OptionNode]) -> Flatten<'_> {
    let mut stack = SmallVec::new();
    stack.push((tree, 0));
    Flatten {
        stack,
        prefix: SmallVec::new(),
    }
}

/// Collect [`flatten`] into a vector.
#[must_use]
pub fn flatten_all(tree: &[OptionNode]) -> Vec<Address> {
    flatten(tree).collect()
}

impl Iterator for Flatten<'_> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        loop {
            let top = self.stack.last_mut()?;
            let layer = top.0;
            let index = top.1;
            let Some(node) = layer.get(index) else {
                self.stack.pop();
                self.prefix.pop();
                continue;
            };
            top.1 += 1;

            let mut address = Address::from(&self.prefix[..]);
            address.push(index);
            if let OptionNode::Group(group) = node {
                self.stack.push((&group.options, 0));
                self.prefix.push(index);
            }
            return Some(address);
        }
    }
}

impl FusedIterator for Flatten<'_> {}

/// Total number of nodes (rows) in the tree.
#[must_use]
pub fn count_nodes(tree: &[OptionNode]) -> usize {
    tree.iter()
        .map(|node| 1 + count_nodes(node.children()))
        .sum()
}

/// Resolve an address to the node it names.
///
/// Returns `None` for the empty address and for addresses that pass through a
/// non-group or run past the end of a layer.
#[must_use]
pub fn resolve<'a>(tree: &'a [OptionNode], address: &[usize]) -> Option<&'a OptionNode> {
    let (&last, path) = address.split_last()?;
    let mut layer = tree;
    for &index in path {
        match layer.get(index)? {
            OptionNode::Group(group) => layer = &group.options,
            _ => return None,
        }
    }
    layer.get(last)
}

/// Like [`resolve`], reporting failure as [`InvalidAddress`].
pub fn try_resolve<'a>(
    tree: &'a [OptionNode],
    address: &Address,
) -> Result<&'a OptionNode, InvalidAddress> {
    resolve(tree, address).ok_or_else(|| InvalidAddress {
        address: address.clone(),
    })
}

/// Returns `true` if `address` is empty or resolves against `tree`.
#[must_use]
pub fn is_valid(tree: &[OptionNode], address: &[usize]) -> bool {
    address.is_empty() || resolve(tree, address).is_some()
}

/// Move `current` by `delta` rows; negative values move backward.
///
/// Returns `current` unchanged when `delta` is zero, the tree is empty, or
/// `current` does not resolve against `tree`. Otherwise steps one row at a time
/// and stops early at the first or last row.
#[must_use]
pub fn move_by(tree: &[OptionNode], current: &Address, delta: isize) -> Address {
    if delta == 0 || tree.is_empty() || !is_valid(tree, current) {
        return current.clone();
    }

    let forward = delta > 0;
    let mut at = current.clone();
    for _ in 0..delta.unsigned_abs() {
        let next = if forward {
            step_forward(tree, &at)
        } else {
            step_backward(tree, &at)
        };
        match next {
            Some(next) => at = next,
            None => break,
        }
    }
    at
}

/// Address of the first row, or the empty address for an empty tree.
#[must_use]
pub fn first(tree: &[OptionNode]) -> Address {
    move_by(tree, &Address::new(), 1)
}

/// Address of the last row in pre-order (the deepest last descendant).
#[must_use]
pub fn last(tree: &[OptionNode]) -> Address {
    move_by(tree, &Address::new(), -1)
}

fn step_forward(layer: &[OptionNode], current: &[usize]) -> Option<Address> {
    let Some((&index, rest)) = current.split_first() else {
        return (!layer.is_empty()).then(|| Address::from([0]));
    };

    if let Some(OptionNode::Group(group)) = layer.get(index) {
        if rest.is_empty() {
            if !group.options.is_empty() {
                return Some(Address::from([index, 0]));
            }
        } else if let Some(inner) = step_forward(&group.options, rest) {
            return Some(Address::prefixed(index, &inner));
        }
        // No room left inside the group: drop the remainder and try the next sibling.
    }

    let next = index + 1;
    (next < layer.len()).then(|| Address::from([next]))
}

fn step_backward(layer: &[OptionNode], current: &[usize]) -> Option<Address> {
    let Some((&index, rest)) = current.split_first() else {
        let index = layer.len().checked_sub(1)?;
        return Some(Address::prefixed(index, &deepest_last(&layer[index])));
    };

    if !rest.is_empty()
        && let Some(OptionNode::Group(group)) = layer.get(index)
    {
        return Some(match step_backward(&group.options, rest) {
            Some(inner) => Address::prefixed(index, &inner),
            None => Address::from([index]),
        });
    }

    let prev = index.checked_sub(1)?;
    Some(Address::prefixed(prev, &deepest_last(&layer[prev])))
}

/// Relative address of the last pre-order descendant of `node` (empty for non-groups).
fn deepest_last(mut node: &OptionNode) -> Address {
    let mut out = Address::new();
    while let OptionNode::Group(group) = node {
        let Some(index) = group.options.len().checked_sub(1) else {
            break;
        };
        out.push(index);
        node = &group.options[index];
    }
    out
}

/// Find the first leaf (in pre-order) whose value equals `value`.
///
/// Only meaningful for single selection; a multi selection has no single address.
#[must_use]
pub fn locate_value(tree: &[OptionNode], value: &OptionValue) -> Option<Address> {
    find(tree, &|node| {
        node.as_leaf().is_some_and(|leaf| leaf.value == *value)
    })
}

/// Find `node` again in a rebuilt tree.
///
/// Leaves are matched by value, other nodes by structural equality.
#[must_use]
pub fn relocate(tree: &[OptionNode], node: &OptionNode) -> Option<Address> {
    match node {
        OptionNode::Leaf(leaf) => locate_value(tree, &leaf.value),
        _ => find(tree, &|candidate| candidate == node),
    }
}

fn find(tree: &[OptionNode], pred: &dyn Fn(&OptionNode) -> bool) -> Option<Address> {
    for (index, node) in tree.iter().enumerate() {
        if pred(node) {
            return Some(Address::from([index]));
        }
        if let Some(inner) = find(node.children(), pred) {
            return Some(Address::prefixed(index, &inner));
        }
    }
    None
}
