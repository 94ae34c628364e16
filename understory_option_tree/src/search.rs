// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local filtering and value-based pruning of option trees.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::{OptionGroup, OptionNode, OptionTree, OptionValue};

/// Trim and lower-case a query the way [`filter_tree`] compares labels.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Filter a static tree by a typed query.
///
/// An empty (or all-whitespace) query returns the whole tree. Otherwise:
///
/// - a leaf is kept iff its [`Label::Text`](crate::Label::Text) contains the
///   query, compared case-insensitively; leaves with opaque labels never match;
/// - a group is kept, holding only its matching descendants, iff at least one
///   descendant matches;
/// - the creatable sentinel is never kept.
#[must_use]
pub fn filter_tree(tree: &[OptionNode], query: &str) -> OptionTree {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return tree.to_vec();
    }
    filter_layer(tree, &needle)
}

fn filter_layer(layer: &[OptionNode], needle: &str) -> OptionTree {
    let mut out = Vec::new();
    for node in layer {
        match node {
            OptionNode::Group(group) => {
                let options = filter_layer(&group.options, needle);
                if !options.is_empty() {
                    out.push(OptionNode::Group(OptionGroup {
                        label: group.label.clone(),
                        options,
                    }));
                }
            }
            OptionNode::Leaf(leaf) => {
                let matches = leaf
                    .label
                    .as_text()
                    .is_some_and(|text| text.to_lowercase().contains(needle));
                if matches {
                    out.push(node.clone());
                }
            }
            OptionNode::Creatable => {}
        }
    }
    out
}

/// Remove every leaf whose value is in `values`.
///
/// Groups that lose all of their children to the removal are dropped; groups that
/// were already empty are kept. Sentinels are kept.
#[must_use]
pub fn remove_values<'a>(
    tree: &[OptionNode],
    values: impl IntoIterator<Item = &'a OptionValue>,
) -> OptionTree {
    let values: HashSet<&OptionValue> = values.into_iter().collect();
    if values.is_empty() {
        return tree.to_vec();
    }
    prune_layer(tree, &values)
}

fn prune_layer(layer: &[OptionNode], values: &HashSet<&OptionValue>) -> OptionTree {
    let mut out = Vec::with_capacity(layer.len());
    for node in layer {
        match node {
            OptionNode::Leaf(leaf) if values.contains(&leaf.value) => {}
            OptionNode::Group(group) if !group.options.is_empty() => {
                let options = prune_layer(&group.options, values);
                if !options.is_empty() {
                    out.push(OptionNode::Group(OptionGroup {
                        label: group.label.clone(),
                        options,
                    }));
                }
            }
            _ => out.push(node.clone()),
        }
    }
    out
}
