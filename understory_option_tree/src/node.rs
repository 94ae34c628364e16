// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Option nodes: leaves, groups, and the creatable sentinel.

use alloc::vec::Vec;

use crate::{Additional, Label, OptionValue};

/// An ordered sequence of top-level option nodes.
pub type OptionTree = Vec<OptionNode>;

/// A selectable option.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionLeaf {
    /// Display label.
    pub label: Label,
    /// Identifier used for equality, deduplication, and toggling.
    pub value: OptionValue,
    /// Host metadata carried through selection unchanged.
    pub additional: Additional,
}

impl OptionLeaf {
    /// Create a leaf without metadata.
    pub fn new(label: impl Into<Label>, value: impl Into<OptionValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            additional: Additional::new(),
        }
    }

    /// Attach one metadata entry.
    #[must_use]
    pub fn with_additional(
        mut self,
        key: impl Into<alloc::string::String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

/// A labelled, non-selectable container of further nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionGroup {
    /// Header label.
    pub label: Label,
    /// Children in display order. May be empty.
    pub options: Vec<OptionNode>,
}

/// A node in an option tree.
///
/// The three kinds are mutually exclusive: exactly one of [`is_leaf`](Self::is_leaf),
/// [`is_group`](Self::is_group), and [`is_creatable`](Self::is_creatable) holds.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionNode {
    /// A selectable option.
    Leaf(OptionLeaf),
    /// A group of nested nodes.
    Group(OptionGroup),
    /// Placeholder row offering to create a new value from the typed text.
    ///
    /// It carries no value and is never part of a selection.
    Creatable,
}

impl OptionNode {
    /// Shorthand for a [`OptionNode::Leaf`] without metadata.
    pub fn leaf(label: impl Into<Label>, value: impl Into<OptionValue>) -> Self {
        Self::Leaf(OptionLeaf::new(label, value))
    }

    /// Shorthand for a [`OptionNode::Group`].
    pub fn group(label: impl Into<Label>, options: Vec<Self>) -> Self {
        Self::Group(OptionGroup {
            label: label.into(),
            options,
        })
    }

    /// Returns `true` for [`OptionNode::Leaf`].
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns `true` for [`OptionNode::Group`].
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Returns `true` for [`OptionNode::Creatable`].
    #[must_use]
    pub const fn is_creatable(&self) -> bool {
        matches!(self, Self::Creatable)
    }

    /// The leaf payload, if this is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&OptionLeaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// The group payload, if this is a group.
    #[must_use]
    pub const fn as_group(&self) -> Option<&OptionGroup> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Children of a group; empty for other kinds.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Group(group) => &group.options,
            _ => &[],
        }
    }

    /// Label of a leaf or group. The sentinel has none.
    #[must_use]
    pub const fn label(&self) -> Option<&Label> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.label),
            Self::Group(group) => Some(&group.label),
            Self::Creatable => None,
        }
    }
}

impl From<OptionLeaf> for OptionNode {
    fn from(leaf: OptionLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<OptionGroup> for OptionNode {
    fn from(group: OptionGroup) -> Self {
        Self::Group(group)
    }
}
