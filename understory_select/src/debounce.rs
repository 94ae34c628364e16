// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge debouncing on host timestamps.
//!
//! Times are `u64` milliseconds supplied by the host; the debouncer owns no clock
//! and spawns no timers. The host calls [`Debouncer::poll`] with the current time
//! (typically from its frame or timer callback) and receives the scheduled value
//! once the delay has elapsed since the *last* [`Debouncer::schedule`].

/// Coalesces bursts of values, keeping only the last one.
///
/// ```rust
/// use understory_select::Debouncer;
///
/// let mut d = Debouncer::new(500);
/// d.schedule("a", 0);
/// d.schedule("ab", 120);
/// assert_eq!(d.poll(600), None);
/// assert_eq!(d.deadline(), Some(620));
/// assert_eq!(d.poll(620), Some("ab"));
/// assert!(!d.is_pending());
/// ```
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer firing `delay` ms after the last schedule.
    #[must_use]
    pub const fn new(delay: u64) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured delay in milliseconds.
    #[must_use]
    pub const fn delay(&self) -> u64 {
        self.delay
    }

    /// Schedule `value` to fire at `now + delay`, replacing any pending value.
    ///
    /// Returns the superseded value, if there was one.
    pub fn schedule(&mut self, value: T, now: u64) -> Option<T> {
        let deadline = now.saturating_add(self.delay);
        self.pending.replace((value, deadline)).map(|(old, _)| old)
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Returns `true` while a value is waiting for its deadline.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value fires, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Fire the pending value if its deadline has been reached.
    pub fn poll(&mut self, now: u64) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.cancel(),
            _ => None,
        }
    }
}
