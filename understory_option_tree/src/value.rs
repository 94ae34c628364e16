// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf identifiers, labels, and the metadata bag carried by leaves.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::hash::{Hash, Hasher};

/// Opaque identifier of a selectable leaf.
///
/// Values are compared by variant and content. Two floats that are both NaN are
/// considered equal, and `-0.0 == 0.0`, so that values can be used as set keys.
/// An integer and a float never compare equal, even when numerically identical.
#[derive(Clone, Debug, Default)]
pub enum OptionValue {
    /// No value.
    #[default]
    None,
    /// Boolean identifier.
    Bool(bool),
    /// Integer identifier.
    Int(i64),
    /// Floating-point identifier.
    Float(f64),
    /// String identifier.
    Text(String),
}

impl OptionValue {
    /// Returns `true` for [`OptionValue::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the string identifier, if this is [`OptionValue::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OptionValue {}

impl Hash for OptionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::None => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => {
                // Must agree with `eq`: one bit pattern for all NaNs and for both zeros.
                let bits = if f.is_nan() {
                    f64::NAN.to_bits()
                } else if *f == 0.0 {
                    0
                } else {
                    f.to_bits()
                };
                bits.hash(state);
            }
            Self::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Display label of a leaf or group.
///
/// Only [`Label::Text`] takes part in local filtering. Rich content that the host
/// renders itself (icons, markup, widgets) is referred to through an opaque handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// Plain text.
    Text(String),
    /// Host-defined handle for content this crate cannot inspect.
    Opaque(u64),
}

impl Label {
    /// Returns the text of a [`Label::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Opaque(_) => None,
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Open key/value bag carried through selection unchanged.
pub type Additional = BTreeMap<String, OptionValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn nan_and_signed_zero_are_set_keys() {
        let mut set = HashSet::new();
        set.insert(OptionValue::Float(f64::NAN));
        set.insert(OptionValue::Float(0.0));
        assert!(set.contains(&OptionValue::Float(f64::NAN)));
        assert!(set.contains(&OptionValue::Float(-0.0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn variants_never_cross_compare() {
        assert_ne!(OptionValue::Int(1), OptionValue::Float(1.0));
        assert_ne!(OptionValue::from("1"), OptionValue::Int(1));
        assert_eq!(OptionValue::from(None::<i64>), OptionValue::None);
        assert_eq!(OptionValue::from(Some(3)), OptionValue::Int(3));
    }
}
