// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where options and newly created values come from.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use understory_option_tree::{Label, OptionLeaf, OptionTree, OptionValue};

use crate::error::BoxError;
use crate::task::{CancelHandle, CancellableTask};

pub(crate) type RequestFuture<T> = LocalBoxFuture<'static, Result<T, BoxError>>;

/// An asynchronous operation handed to the session, with an optional cancel hook.
///
/// The session wraps it in a [`CancellableTask`]. If the request is superseded
/// before it settles, the hook runs once and the result is discarded.
pub struct Request<T> {
    future: RequestFuture<T>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl<T: 'static> Request<T> {
    /// Wrap a future.
    pub fn new(future: impl Future<Output = Result<T, BoxError>> + 'static) -> Self {
        Self {
            future: future.boxed_local(),
            on_cancel: None,
        }
    }

    /// A request that has already completed.
    pub fn ready(result: Result<T, BoxError>) -> Self {
        Self::new(futures::future::ready(result))
    }

    /// Run `f` if this request is cancelled while still pending.
    #[must_use]
    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub(crate) fn into_task(self) -> (CancellableTask<RequestFuture<T>>, CancelHandle) {
        match self.on_cancel {
            Some(on_cancel) => CancellableTask::with_on_cancel(self.future, on_cancel),
            None => CancellableTask::new(self.future),
        }
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("has_on_cancel", &self.on_cancel.is_some())
            .finish_non_exhaustive()
    }
}

/// Asynchronous search backend.
///
/// Receives the query verbatim. Closures returning a future implement this trait:
///
/// ```rust
/// use understory_option_tree::OptionNode;
/// use understory_select::{BoxError, OptionsSource};
///
/// let source = OptionsSource::provider(|query: &str| {
///     let rows = vec![OptionNode::leaf(format!("{query}!"), 1)];
///     async move { Ok::<_, BoxError>(rows) }
/// });
/// assert!(source.is_remote());
/// ```
pub trait OptionsProvider {
    /// Start a search for `query`.
    fn search(&mut self, query: &str) -> Request<OptionTree>;
}

impl<F, Fut> OptionsProvider for F
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<OptionTree, BoxError>> + 'static,
{
    fn search(&mut self, query: &str) -> Request<OptionTree> {
        Request::new(self(query))
    }
}

/// Result of creating an option from typed text.
#[derive(Clone, Debug, PartialEq)]
pub enum Created {
    /// A raw identifier; the leaf is labelled with the typed text.
    Value(OptionValue),
    /// A complete leaf, used as-is.
    Leaf(OptionLeaf),
}

impl Created {
    /// The leaf this creation commits, labelling raw identifiers with `text`.
    #[must_use]
    pub fn into_leaf(self, text: &str) -> OptionLeaf {
        match self {
            Self::Value(value) => OptionLeaf::new(Label::from(text), value),
            Self::Leaf(leaf) => leaf,
        }
    }
}

impl From<OptionValue> for Created {
    fn from(value: OptionValue) -> Self {
        Self::Value(value)
    }
}

impl From<OptionLeaf> for Created {
    fn from(leaf: OptionLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

/// Asynchronous creation of new options from typed text.
pub trait CreateHandler {
    /// Start creating an option from `text`.
    fn create(&mut self, text: &str) -> Request<Created>;
}

impl<F, Fut> CreateHandler for F
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<Created, BoxError>> + 'static,
{
    fn create(&mut self, text: &str) -> Request<Created> {
        Request::new(self(text))
    }
}

/// The options a session searches.
pub enum OptionsSource {
    /// A fixed tree, filtered locally and synchronously.
    Static(OptionTree),
    /// An asynchronous provider queried on every search.
    Provider(Box<dyn OptionsProvider>),
}

impl OptionsSource {
    /// Wrap a provider.
    pub fn provider(provider: impl OptionsProvider + 'static) -> Self {
        Self::Provider(Box::new(provider))
    }

    /// Returns `true` for provider-backed sources.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

impl Default for OptionsSource {
    fn default() -> Self {
        Self::Static(OptionTree::new())
    }
}

impl From<OptionTree> for OptionsSource {
    fn from(tree: OptionTree) -> Self {
        Self::Static(tree)
    }
}

impl fmt::Debug for OptionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(tree) => f.debug_tuple("Static").field(&tree.len()).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}
