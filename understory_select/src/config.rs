// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

bitflags::bitflags! {
    /// Behavior switches for a [`Select`](crate::Select) session.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SelectFlags: u16 {
        /// The value is a list; selecting toggles membership.
        const MULTI = 1 << 0;
        /// Backspace on empty input and the clear control remove values.
        const CLEARABLE = 1 << 1;
        /// Non-empty queries offer a "create" row.
        const CREATABLE = 1 << 2;
        /// Typed input drives searches.
        const SEARCHABLE = 1 << 3;
        /// Clear the input after a selection that keeps the session open.
        const CLEAR_SEARCH_ON_SELECT = 1 << 4;
        /// Clear the input when the session closes.
        const CLEAR_SEARCH_ON_CLOSE = 1 << 5;
        /// Run an empty search when the session is built.
        const DEFAULT_OPTIONS = 1 << 6;
        /// Ignore commits, removals, clears, Enter and input.
        const DISABLED = 1 << 7;
        /// The first focus is automatic and does not open the session.
        const AUTO_FOCUS = 1 << 8;
        /// Start open.
        const OPEN = 1 << 9;
        /// The host is loading on the session's behalf.
        const LOADING = 1 << 10;
    }
}

impl Default for SelectFlags {
    fn default() -> Self {
        Self::SEARCHABLE | Self::CLEAR_SEARCH_ON_SELECT | Self::CLEAR_SEARCH_ON_CLOSE
    }
}

/// Default trailing delay for keystroke-driven searches, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default delay between blur and close, in milliseconds.
pub const DEFAULT_BLUR_GRACE_MS: u64 = 250;

/// Configuration of a [`Select`](crate::Select) session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectConfig {
    /// Behavior switches.
    pub flags: SelectFlags,
    /// Close after a selection. `None` closes in single mode only.
    pub close_on_select: Option<bool>,
    /// Trailing delay applied to typed searches.
    pub debounce_ms: u64,
    /// Delay before a blur closes the session; a pointer-down inside cancels it.
    pub blur_grace_ms: u64,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            flags: SelectFlags::default(),
            close_on_select: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            blur_grace_ms: DEFAULT_BLUR_GRACE_MS,
        }
    }
}

impl SelectConfig {
    /// Default configuration with [`SelectFlags::MULTI`] set.
    #[must_use]
    pub fn multi() -> Self {
        Self::default().with(SelectFlags::MULTI)
    }

    /// Set `flags` in addition to the current ones.
    #[must_use]
    pub fn with(mut self, flags: SelectFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Clear `flags`.
    #[must_use]
    pub fn without(mut self, flags: SelectFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    /// Returns `true` if every flag in `flags` is set.
    #[must_use]
    pub fn has(&self, flags: SelectFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Returns `true` in multi-select mode.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.has(SelectFlags::MULTI)
    }

    /// Whether a selection closes the session.
    #[must_use]
    pub fn close_on_select(&self) -> bool {
        self.close_on_select.unwrap_or(!self.is_multi())
    }
}
