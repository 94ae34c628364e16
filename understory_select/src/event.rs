// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inputs the host feeds into a session and events it drains back out.

use crate::SelectValue;

/// Navigation and commit keys understood by [`Select::on_key`](crate::Select::on_key).
///
/// Printable input is not a key: the host edits its text field and reports the
/// result through [`Select::on_input`](crate::Select::on_input).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Five rows back.
    PageUp,
    /// Five rows forward.
    PageDown,
    /// First row.
    Home,
    /// Last row.
    End,
    /// Commit the highlighted row, or open.
    Enter,
    /// Remove the last value when the input is empty.
    Backspace,
}

impl Key {
    /// Row delta for the relative movement keys.
    #[must_use]
    pub const fn delta(self) -> Option<isize> {
        match self {
            Self::Up => Some(-1),
            Self::Down => Some(1),
            Self::PageUp => Some(-PAGE_STEP),
            Self::PageDown => Some(PAGE_STEP),
            _ => None,
        }
    }
}

/// Rows moved by [`Key::PageUp`] and [`Key::PageDown`].
pub const PAGE_STEP: isize = 5;

/// Whether the host should suppress its default handling of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The session consumed the key.
    Handled,
    /// The key is the host's to handle.
    Ignored,
}

impl KeyOutcome {
    /// Returns `true` for [`KeyOutcome::Handled`].
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Where a pointer event landed, relative to the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    /// Outside the widget.
    Outside,
    /// On the control: input, value chips, indicators.
    Control,
    /// On a row of the option list.
    Option,
}

impl PointerTarget {
    /// Returns `true` for targets inside the widget.
    #[must_use]
    pub const fn is_inside(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Notifications and requests emitted by a session.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectEvent {
    /// A new value was proposed.
    Change(SelectValue),
    /// Enter was pressed without committing a row.
    Enter,
    /// The widget gained focus.
    Focus,
    /// The widget lost focus.
    Blur,
    /// The session opened.
    Opened,
    /// The session closed.
    Closed,
    /// The host should focus its text input on the next frame.
    FocusInput,
    /// The host should blur its text input.
    BlurInput,
}
