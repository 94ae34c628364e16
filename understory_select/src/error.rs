// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by [`Select::poll`](crate::Select::poll).

/// Boxed error returned by options providers and creation handlers.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A search or creation request failed.
///
/// The session stays usable after either variant: its loading flag is cleared and
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The options provider rejected a search.
    #[error("options provider failed for query {query:?}")]
    ProviderFailure {
        /// The query that was searched.
        query: String,
        /// The provider's error.
        #[source]
        source: BoxError,
    },
    /// The creation handler rejected a new value.
    #[error("creating an option from {text:?} failed")]
    CreateFailure {
        /// The typed text the option was to be created from.
        text: String,
        /// The handler's error.
        #[source]
        source: BoxError,
    },
}
