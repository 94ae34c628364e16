// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Search dispatch with single-flight supersession.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Future;
use tracing::{debug, trace, warn};
use understory_option_tree::{OptionLeaf, OptionNode, OptionTree, filter_tree, remove_values};

use crate::error::SelectError;
use crate::provider::{OptionsSource, RequestFuture};
use crate::task::{CancelHandle, CancellableTask};

/// Outcome of starting a search.
#[derive(Debug)]
pub(crate) enum Started {
    /// Static sources resolve synchronously.
    Ready(OptionTree),
    /// A provider request is in flight; see [`SearchPipeline::poll`].
    Pending,
}

/// A provider search that settled and is still current.
#[derive(Debug)]
pub(crate) struct Resolved {
    pub(crate) query: String,
    pub(crate) tree: OptionTree,
}

struct InFlight {
    generation: u64,
    query: String,
    task: CancellableTask<RequestFuture<OptionTree>>,
    handle: CancelHandle,
}

/// Runs searches against an [`OptionsSource`], keeping at most one in flight.
///
/// Every search bumps a generation counter. Starting a search cancels the previous
/// request through its [`CancelHandle`], and a completion whose generation is no
/// longer current is dropped.
pub(crate) struct SearchPipeline {
    source: OptionsSource,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl SearchPipeline {
    pub(crate) fn new(source: OptionsSource) -> Self {
        Self {
            source,
            generation: 0,
            in_flight: None,
        }
    }

    pub(crate) fn source(&self) -> &OptionsSource {
        &self.source
    }

    /// Replace the source, cancelling anything in flight.
    pub(crate) fn set_source(&mut self, source: OptionsSource) {
        self.cancel();
        self.source = source;
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn start(&mut self, query: &str) -> Started {
        self.generation += 1;
        if self.cancel() {
            debug!(generation = self.generation, "superseded in-flight search");
        }
        match &mut self.source {
            OptionsSource::Static(tree) => {
                debug!(query, generation = self.generation, "local search");
                Started::Ready(filter_tree(tree, query))
            }
            OptionsSource::Provider(provider) => {
                debug!(query, generation = self.generation, "remote search started");
                let (task, handle) = provider.search(query).into_task();
                self.in_flight = Some(InFlight {
                    generation: self.generation,
                    query: query.to_owned(),
                    task,
                    handle,
                });
                Started::Pending
            }
        }
    }

    /// Cancel the in-flight request. Returns `true` if one was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(mut flight) => flight.handle.cancel(),
            None => false,
        }
    }

    /// Drive the in-flight request.
    ///
    /// `Ready(None)` means there is nothing (left) to report.
    pub(crate) fn poll(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Resolved, SelectError>>> {
        let Some(mut flight) = self.in_flight.take() else {
            return Poll::Ready(None);
        };
        let outcome = match Pin::new(&mut flight.task).poll(cx) {
            Poll::Pending => {
                self.in_flight = Some(flight);
                return Poll::Pending;
            }
            Poll::Ready(outcome) => outcome,
        };
        if flight.generation != self.generation {
            trace!(
                generation = flight.generation,
                current = self.generation,
                "dropped stale search completion"
            );
            return Poll::Ready(None);
        }
        match outcome {
            Err(_) => {
                trace!(query = %flight.query, "search cancelled");
                Poll::Ready(None)
            }
            Ok(Err(source)) => {
                warn!(query = %flight.query, error = %source, "options provider failed");
                Poll::Ready(Some(Err(SelectError::ProviderFailure {
                    query: flight.query,
                    source,
                })))
            }
            Ok(Ok(tree)) => {
                debug!(
                    query = %flight.query,
                    generation = flight.generation,
                    "remote search resolved"
                );
                Poll::Ready(Some(Ok(Resolved {
                    query: flight.query,
                    tree,
                })))
            }
        }
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("source", &self.source)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight.as_ref().map(|flight| &flight.query))
            .finish()
    }
}

/// Build the displayed tree from raw search results.
///
/// Pinned leaves go first and matching provider leaves are removed from the body;
/// the creatable sentinel is appended for non-empty queries when `creatable`.
pub(crate) fn decorate(
    results: &[OptionNode],
    query: &str,
    creatable: bool,
    pinned: &[OptionLeaf],
) -> OptionTree {
    let mut tree: OptionTree = if pinned.is_empty() {
        results.to_vec()
    } else {
        let body = remove_values(results, pinned.iter().map(|leaf| &leaf.value));
        pinned.iter().cloned().map(OptionNode::Leaf).chain(body).collect()
    };
    if creatable && !query.is_empty() {
        tree.push(OptionNode::Creatable);
    }
    tree
}
