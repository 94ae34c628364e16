// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only row views for presentation.

use understory_option_tree::{Address, OptionNode};

/// One displayed row of the option list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowView<'a> {
    /// Address of the row in [`Select::tree`](crate::Select::tree).
    pub address: &'a Address,
    /// The node at `address`.
    pub node: &'a OptionNode,
    /// Nesting depth, `0` for top-level rows.
    pub depth: usize,
    /// The row is highlighted.
    pub highlighted: bool,
    /// The row is a leaf whose value is selected.
    pub selected: bool,
    /// The row is one of the selected entries pinned to the top in multi mode.
    pub pinned: bool,
}
