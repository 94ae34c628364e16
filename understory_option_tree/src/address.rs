// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer-path addresses into an option tree.

use core::ops::Deref;

use smallvec::SmallVec;

/// Path of child indices from the tree root to a node.
///
/// `address[i]` is the child index at depth `i`. The empty address denotes
/// "nothing highlighted". Two addresses are equal when their indices are equal
/// element-wise; an address carries no reference to the tree it was computed from.
///
/// Up to four levels are stored inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(SmallVec<[usize; 4]>);

impl Address {
    /// The empty address.
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Number of levels in this address.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The address with `index` appended as a further level.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut out = self.clone();
        out.0.push(index);
        out
    }

    /// The address of the containing group, or `None` for top-level and empty addresses.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(SmallVec::from_slice(&self.0[..self.0.len() - 1])))
    }

    /// Append a level in place.
    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Remove all levels.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Prepend `head` to `rest`.
    pub(crate) fn prefixed(head: usize, rest: &[usize]) -> Self {
        let mut out = SmallVec::with_capacity(rest.len() + 1);
        out.push(head);
        out.extend_from_slice(rest);
        Self(out)
    }
}

impl Deref for Address {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<&[usize]> for Address {
    fn from(value: &[usize]) -> Self {
        Self(SmallVec::from_slice(value))
    }
}

impl<const N: usize> From<[usize; N]> for Address {
    fn from(value: [usize; N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl FromIterator<usize> for Address {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An address that does not resolve against the current tree.
///
/// Raised when navigation or a commit meets an address computed against an
/// earlier version of the tree. Callers typically ignore the operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("address {address:?} does not resolve against the current option tree")]
pub struct InvalidAddress {
    /// The offending address.
    pub address: Address,
}
