// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_select --heading-base-level=0

//! Understory Select: a headless select/combobox engine.
//!
//! This crate drives the behavior of a dropdown select with search: which rows are
//! shown, which one is highlighted, what happens on keys, focus and pointer events,
//! and how typed queries turn into option trees. It draws nothing and owns no clock
//! or executor. The host:
//!
//! - feeds input: [`Select::on_input`], [`Select::on_key`], [`Select::on_focus`],
//!   [`Select::on_blur`], [`Select::on_pointer_down`], [`Select::on_pointer_up`];
//! - fires timers with [`Select::tick`], using [`Select::next_deadline`] to schedule;
//! - drives asynchronous searches and creations with [`Select::poll`] or
//!   [`Select::settle`];
//! - renders from [`Select::row_views`] and drains [`Select::take_events`].
//!
//! The value is owned by the host: [`SelectEvent::Change`] proposes a new value, and
//! [`Select::set_value`] hands back the authoritative one.
//!
//! ## Searching
//!
//! An [`OptionsSource`] is either a static tree, filtered locally and synchronously,
//! or an [`OptionsProvider`] queried asynchronously. Typed input is debounced
//! (500 ms by default). Only the latest search may change the session: starting a
//! search cancels its predecessor through a [`CancelHandle`], and a generation
//! counter drops any completion that arrives late anyway.
//!
//! ```rust
//! use futures::executor::block_on;
//! use understory_option_tree::{OptionLeaf, OptionNode};
//! use understory_select::{
//!     BoxError, Key, OptionsSource, Select, SelectConfig, SelectEvent, SelectValue,
//! };
//!
//! let source = OptionsSource::provider(|query: &str| {
//!     let rows = vec![
//!         OptionNode::leaf(format!("{query} one"), 1),
//!         OptionNode::leaf(format!("{query} two"), 2),
//!     ];
//!     async move { Ok::<_, BoxError>(rows) }
//! });
//! let mut select = Select::new(source, SelectConfig::default());
//!
//! select.on_input("fo", 0);
//! select.on_input("foo", 120);
//! select.tick(620);
//! block_on(select.settle()).unwrap();
//! assert_eq!(select.rows().len(), 2);
//!
//! select.on_key(Key::Down);
//! select.on_key(Key::Down);
//! select.on_key(Key::Enter);
//! let events = select.take_events();
//! let proposed = SelectValue::Single(OptionLeaf::new("foo two", 2));
//! assert!(events.contains(&SelectEvent::Change(proposed)));
//! assert!(!select.is_open());
//! ```
//!
//! ## Cancellation
//!
//! [`CancellableTask`] is usable on its own: a future paired with a handle whose
//! `cancel` wins or loses a single race against settlement.
//!
//! ## Logging
//!
//! Session transitions, searches and creations are reported through `tracing`.

mod config;
mod debounce;
mod error;
mod event;
mod pipeline;
mod provider;
mod session;
mod task;
mod value;
mod view;

pub use config::{DEFAULT_BLUR_GRACE_MS, DEFAULT_DEBOUNCE_MS, SelectConfig, SelectFlags};
pub use debounce::Debouncer;
pub use error::{BoxError, SelectError};
pub use event::{Key, KeyOutcome, PAGE_STEP, PointerTarget, SelectEvent};
pub use provider::{CreateHandler, Created, OptionsProvider, OptionsSource, Request};
pub use session::{Select, SelectBuilder};
pub use task::{CancelHandle, CancellableTask, Cancelled, TaskState};
pub use value::SelectValue;
pub use view::RowView;
