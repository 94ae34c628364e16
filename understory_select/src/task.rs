// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable futures.
//!
//! [`CancellableTask`] wraps a future so that a paired [`CancelHandle`] can turn its
//! eventual result into [`Cancelled`]. Settlement and cancellation race through a
//! single atomic transition out of the pending state, so exactly one of them wins
//! and neither can happen twice:
//!
//! - cancelling a pending task runs the optional cancel callback, then wakes the
//!   task, which resolves to `Err(Cancelled)` without polling the inner future again;
//! - if the inner future completes after cancellation, its output (success or
//!   failure alike) is discarded;
//! - cancelling a task that already settled, or was already cancelled, does nothing.
//!
//! ```rust
//! use futures::executor::block_on;
//! use understory_select::{CancellableTask, Cancelled};
//!
//! let (task, mut handle) = CancellableTask::new(futures::future::pending::<u32>());
//! assert!(handle.cancel());
//! assert!(!handle.cancel());
//! assert_eq!(block_on(task), Err(Cancelled));
//!
//! let (task, mut handle) = CancellableTask::new(futures::future::ready(7));
//! assert_eq!(block_on(task), Ok(7));
//! // Already settled: nothing left to cancel.
//! assert!(!handle.cancel());
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use futures::task::AtomicWaker;

const PENDING: u8 = 0;
const SETTLED: u8 = 1;
const CANCELLED: u8 = 2;

/// The task was cancelled before it settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("task was cancelled before it settled")]
pub struct Cancelled;

/// Observable lifecycle of a [`CancellableTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Neither settled nor cancelled.
    Pending,
    /// The inner future completed and its output was delivered.
    Settled,
    /// The task was cancelled; its output, if any, is discarded.
    Cancelled,
}

#[derive(Debug, Default)]
struct Shared {
    state: AtomicU8,
    waker: AtomicWaker,
}

impl Shared {
    fn state(&self) -> TaskState {
        match self.state.load(Ordering::Acquire) {
            PENDING => TaskState::Pending,
            SETTLED => TaskState::Settled,
            _ => TaskState::Cancelled,
        }
    }
}

/// A future that resolves to `Err(Cancelled)` once its [`CancelHandle`] fires.
///
/// The inner future must be [`Unpin`]; box it (for example with
/// [`FutureExt::boxed_local`](futures::FutureExt::boxed_local)) if it is not.
pub struct CancellableTask<F> {
    future: F,
    shared: Arc<Shared>,
}

/// Cancels the paired [`CancellableTask`].
pub struct CancelHandle {
    shared: Arc<Shared>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl<F: Future + Unpin> CancellableTask<F> {
    /// Wrap `future`.
    pub fn new(future: F) -> (Self, CancelHandle) {
        Self::build(future, None)
    }

    /// Wrap `future`, running `on_cancel` if the task is cancelled while pending.
    ///
    /// Use the callback to abort the underlying operation (close a socket, signal a
    /// worker). It runs at most once, on the thread that calls [`CancelHandle::cancel`].
    pub fn with_on_cancel(
        future: F,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> (Self, CancelHandle) {
        Self::build(future, Some(Box::new(on_cancel)))
    }

    fn build(future: F, on_cancel: Option<Box<dyn FnOnce() + Send>>) -> (Self, CancelHandle) {
        let shared = Arc::new(Shared::default());
        let handle = CancelHandle {
            shared: Arc::clone(&shared),
            on_cancel,
        };
        (Self { future, shared }, handle)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.shared.state()
    }
}

impl<F: Future + Unpin> Future for CancellableTask<F> {
    type Output = Result<F::Output, Cancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        // Register before checking so a concurrent cancel cannot be missed.
        this.shared.waker.register(cx.waker());
        if this.shared.state.load(Ordering::Acquire) == CANCELLED {
            return Poll::Ready(Err(Cancelled));
        }

        let output = match Pin::new(&mut this.future).poll(cx) {
            Poll::Ready(output) => output,
            Poll::Pending => return Poll::Pending,
        };

        match this.shared.state.compare_exchange(
            PENDING,
            SETTLED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Poll::Ready(Ok(output)),
            Err(_) => Poll::Ready(Err(Cancelled)),
        }
    }
}

impl CancelHandle {
    /// Cancel the task if it is still pending.
    ///
    /// Returns `true` if this call performed the cancellation, `false` if the task
    /// had already settled or been cancelled.
    pub fn cancel(&mut self) -> bool {
        if self
            .shared
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
        self.shared.waker.wake();
        true
    }

    /// Current lifecycle state of the paired task.
    pub fn state(&self) -> TaskState {
        self.shared.state()
    }

    /// Returns `true` once the paired task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }
}

impl<F> fmt::Debug for CancellableTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellableTask")
            .field("state", &self.shared.state())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("state", &self.shared.state())
            .field("has_on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}
