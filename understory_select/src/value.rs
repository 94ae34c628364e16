// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The externally owned selection.

use understory_option_tree::{OptionLeaf, OptionValue};

/// Current selection of a session.
///
/// The host owns the value: the session reports proposed values through
/// [`SelectEvent::Change`](crate::SelectEvent::Change) and receives the
/// authoritative one back through [`Select::set_value`](crate::Select::set_value).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SelectValue {
    /// Nothing selected.
    #[default]
    None,
    /// Single-select value.
    Single(OptionLeaf),
    /// Multi-select entries, in selection order, with distinct values.
    Multi(Vec<OptionLeaf>),
}

impl SelectValue {
    /// The empty value for the given mode.
    #[must_use]
    pub fn empty(multi: bool) -> Self {
        if multi { Self::Multi(Vec::new()) } else { Self::None }
    }

    /// All selected leaves.
    #[must_use]
    pub fn leaves(&self) -> &[OptionLeaf] {
        match self {
            Self::None => &[],
            Self::Single(leaf) => core::slice::from_ref(leaf),
            Self::Multi(entries) => entries,
        }
    }

    /// Multi-select entries; empty for the other variants.
    #[must_use]
    pub fn entries(&self) -> &[OptionLeaf] {
        match self {
            Self::Multi(entries) => entries,
            _ => &[],
        }
    }

    /// The single-select leaf, if any.
    #[must_use]
    pub fn single(&self) -> Option<&OptionLeaf> {
        match self {
            Self::Single(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Returns `true` when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves().is_empty()
    }

    /// Returns `true` if a selected leaf carries `value`.
    #[must_use]
    pub fn contains(&self, value: &OptionValue) -> bool {
        self.leaves().iter().any(|leaf| &leaf.value == value)
    }

    /// The multi-select value with `leaf` toggled.
    ///
    /// Entries equal in value to `leaf` are removed; if there were none, `leaf` is
    /// appended. A non-list value toggles against an empty list.
    #[must_use]
    pub fn toggled(&self, leaf: &OptionLeaf) -> Self {
        let mut found = false;
        let mut entries: Vec<OptionLeaf> = self
            .entries()
            .iter()
            .filter(|entry| {
                let same = entry.value == leaf.value;
                found |= same;
                !same
            })
            .cloned()
            .collect();
        if !found {
            entries.push(leaf.clone());
        }
        Self::Multi(entries)
    }

    /// The multi-select value without the entry at `index`, or `None` if out of range.
    #[must_use]
    pub fn without(&self, index: usize) -> Option<Self> {
        let entries = self.entries();
        (index < entries.len()).then(|| {
            let mut entries = entries.to_vec();
            entries.remove(index);
            Self::Multi(entries)
        })
    }
}

impl From<OptionLeaf> for SelectValue {
    fn from(leaf: OptionLeaf) -> Self {
        Self::Single(leaf)
    }
}

impl From<Vec<OptionLeaf>> for SelectValue {
    fn from(entries: Vec<OptionLeaf>) -> Self {
        Self::Multi(entries)
    }
}
