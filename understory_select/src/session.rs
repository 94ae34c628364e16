// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The select session: open/closed state, input, highlight and selection.

use std::fmt;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Future;
use futures::future::poll_fn;
use tracing::{debug, trace, warn};
use understory_option_tree::{
    Address, OptionLeaf, OptionNode, OptionTree, first, flatten_all, is_valid, last,
    locate_value, move_by, relocate, resolve, try_resolve,
};

use crate::config::{SelectConfig, SelectFlags};
use crate::debounce::Debouncer;
use crate::error::SelectError;
use crate::event::{Key, KeyOutcome, PointerTarget, SelectEvent};
use crate::pipeline::{SearchPipeline, Started, decorate};
use crate::provider::{CreateHandler, Created, OptionsSource, RequestFuture};
use crate::task::{CancelHandle, CancellableTask};
use crate::value::SelectValue;
use crate::view::RowView;

type MessageFn = Box<dyn Fn(&str) -> String>;

struct PendingCreate {
    text: String,
    task: CancellableTask<RequestFuture<Created>>,
    handle: CancelHandle,
}

/// Assembles a [`Select`].
pub struct SelectBuilder {
    source: OptionsSource,
    config: SelectConfig,
    value: SelectValue,
    creator: Option<Box<dyn CreateHandler>>,
    no_options: Option<MessageFn>,
    create_option: Option<MessageFn>,
}

impl SelectBuilder {
    /// Start from an options source and the default configuration.
    pub fn new(source: impl Into<OptionsSource>) -> Self {
        Self {
            source: source.into(),
            config: SelectConfig::default(),
            value: SelectValue::None,
            creator: None,
            no_options: None,
            create_option: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    /// Set `flags` on the configuration.
    #[must_use]
    pub fn flags(mut self, flags: SelectFlags) -> Self {
        self.config.flags.insert(flags);
        self
    }

    /// The initial value.
    #[must_use]
    pub fn value(mut self, value: SelectValue) -> Self {
        self.value = value;
        self
    }

    /// Handler that turns typed text into a new option.
    #[must_use]
    pub fn create_with(mut self, handler: impl CreateHandler + 'static) -> Self {
        self.creator = Some(Box::new(handler));
        self
    }

    /// Message shown when there are no options, given the input text.
    #[must_use]
    pub fn no_options_message(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.no_options = Some(Box::new(f));
        self
    }

    /// Label of the creatable row, given the input text.
    #[must_use]
    pub fn create_option_message(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.create_option = Some(Box::new(f));
        self
    }

    /// Build the session.
    ///
    /// Static options are shown immediately. With
    /// [`DEFAULT_OPTIONS`](SelectFlags::DEFAULT_OPTIONS) an empty search runs right
    /// away; for providers, drive it with [`Select::poll`].
    #[must_use]
    pub fn build(self) -> Select {
        let config = self.config;
        let results = match &self.source {
            OptionsSource::Static(tree) => tree.clone(),
            OptionsSource::Provider(_) => OptionTree::new(),
        };
        let pinned = if config.is_multi() {
            self.value.entries().to_vec()
        } else {
            Vec::new()
        };
        let tree = decorate(&results, "", false, &pinned);
        let mut select = Select {
            pipeline: SearchPipeline::new(self.source),
            creator: self.creator,
            no_options: self.no_options,
            create_option: self.create_option,
            open: config.has(SelectFlags::OPEN),
            input: String::new(),
            loading: false,
            first_load: tree.is_empty(),
            rows: flatten_all(&tree),
            tree,
            results,
            results_query: String::new(),
            highlight: Address::new(),
            pinned,
            value: self.value,
            auto_focus_pending: config.has(SelectFlags::AUTO_FOCUS),
            search_debounce: Debouncer::new(config.debounce_ms),
            blur_close: Debouncer::new(config.blur_grace_ms),
            pending_create: None,
            events: Vec::new(),
            config,
        };
        if select.config.has(SelectFlags::DEFAULT_OPTIONS) {
            select.run_search("");
        }
        select
    }
}

impl fmt::Debug for SelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectBuilder")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A headless select/combobox session.
///
/// The session owns the displayed tree, the highlight and the typed input; the host
/// owns the value and the clock. Hosts feed inputs (`on_*`, [`on_key`](Self::on_key),
/// [`tick`](Self::tick)), drive asynchronous work with [`poll`](Self::poll) or
/// [`settle`](Self::settle), render from [`row_views`](Self::row_views) and drain
/// [`take_events`](Self::take_events).
///
/// Dropping the session cancels any in-flight search or creation request.
pub struct Select {
    config: SelectConfig,
    pipeline: SearchPipeline,
    creator: Option<Box<dyn CreateHandler>>,
    no_options: Option<MessageFn>,
    create_option: Option<MessageFn>,

    open: bool,
    input: String,
    loading: bool,
    first_load: bool,
    /// Undecorated results of the last search.
    results: OptionTree,
    results_query: String,
    /// Displayed tree: pinned head, results, optional sentinel.
    tree: OptionTree,
    rows: Vec<Address>,
    highlight: Address,
    pinned: Vec<OptionLeaf>,
    value: SelectValue,
    auto_focus_pending: bool,

    search_debounce: Debouncer<String>,
    blur_close: Debouncer<()>,
    pending_create: Option<PendingCreate>,
    events: Vec<SelectEvent>,
}

impl Select {
    /// Shorthand for [`SelectBuilder::new`].
    pub fn builder(source: impl Into<OptionsSource>) -> SelectBuilder {
        SelectBuilder::new(source)
    }

    /// A session over `source` with `config`.
    #[must_use]
    pub fn new(source: impl Into<OptionsSource>, config: SelectConfig) -> Self {
        SelectBuilder::new(source).config(config).build()
    }

    // --- Accessors ---

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Returns `true` while the option list is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current input text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// A search is pending (debounced or in flight).
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// [`is_loading`](Self::is_loading), or the host's [`LOADING`](SelectFlags::LOADING) flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.loading || self.config.has(SelectFlags::LOADING)
    }

    /// No search has resolved since the tree was last emptied.
    #[must_use]
    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    /// The displayed tree.
    #[must_use]
    pub fn tree(&self) -> &[OptionNode] {
        &self.tree
    }

    /// Addresses of all displayed rows, in pre-order.
    #[must_use]
    pub fn rows(&self) -> &[Address] {
        &self.rows
    }

    /// Displayed rows with their presentation state.
    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.rows.iter().filter_map(move |address| {
            let node = resolve(&self.tree, address)?;
            Some(RowView {
                address,
                node,
                depth: address.depth().saturating_sub(1),
                highlighted: *address == self.highlight,
                selected: node
                    .as_leaf()
                    .is_some_and(|leaf| self.value.contains(&leaf.value)),
                pinned: address.depth() == 1 && address[0] < self.pinned.len(),
            })
        })
    }

    /// The highlighted address; empty when nothing is highlighted.
    #[must_use]
    pub fn highlighted(&self) -> &Address {
        &self.highlight
    }

    /// The highlighted node, if any.
    #[must_use]
    pub fn highlighted_node(&self) -> Option<&OptionNode> {
        resolve(&self.tree, &self.highlight)
    }

    /// The host's value, as last passed to [`set_value`](Self::set_value) or the builder.
    #[must_use]
    pub fn value(&self) -> &SelectValue {
        &self.value
    }

    /// Number of selected entries pinned at the top of the tree.
    #[must_use]
    pub fn pinned_len(&self) -> usize {
        self.pinned.len()
    }

    /// Where the single-select value sits in the tree, for scrolling it into view.
    #[must_use]
    pub fn selected_address(&self) -> Option<Address> {
        let leaf = self.value.single()?;
        locate_value(&self.tree, &leaf.value)
    }

    /// Text shown when there are no options.
    #[must_use]
    pub fn no_options_message(&self) -> String {
        match &self.no_options {
            Some(f) => f(&self.input),
            None => String::from("No Options"),
        }
    }

    /// Label of the creatable row.
    #[must_use]
    pub fn create_option_message(&self) -> String {
        match &self.create_option {
            Some(f) => f(&self.input),
            None => format!("Create \"{}\"", self.input),
        }
    }

    /// Returns `true` when the list should show the loading indicator.
    ///
    /// Only the first load shows it; later searches keep the previous rows visible.
    #[must_use]
    pub fn shows_loading(&self) -> bool {
        self.loading && self.first_load
    }

    /// Returns `true` when the list should show [`no_options_message`](Self::no_options_message).
    #[must_use]
    pub fn shows_no_options(&self) -> bool {
        let options = self.tree.len().saturating_sub(self.pinned.len());
        !self.config.has(SelectFlags::CREATABLE) && options == 0 && !self.shows_loading()
    }

    /// The earliest timer deadline; call [`tick`](Self::tick) no later than this.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        [self.search_debounce.deadline(), self.blur_close.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Returns `true` while timers or requests are outstanding.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.pipeline.is_in_flight()
            || self.pending_create.is_some()
            || self.search_debounce.is_pending()
            || self.blur_close.is_pending()
    }

    /// Drain emitted events, oldest first.
    pub fn take_events(&mut self) -> Vec<SelectEvent> {
        mem::take(&mut self.events)
    }

    // --- Open / close ---

    /// Open the option list.
    pub fn open(&mut self) {
        if !self.is_disabled() {
            self.open_session();
        }
    }

    /// Close the option list.
    ///
    /// With [`CLEAR_SEARCH_ON_CLOSE`](SelectFlags::CLEAR_SEARCH_ON_CLOSE), non-empty
    /// input is cleared and an empty search runs immediately.
    pub fn close(&mut self) {
        self.blur_close.cancel();
        let was_open = mem::replace(&mut self.open, false);
        let reset = !self.input.is_empty() && self.config.has(SelectFlags::CLEAR_SEARCH_ON_CLOSE);
        if reset {
            self.input.clear();
            self.reset_tree();
            self.run_search("");
        }
        if was_open {
            debug!("session closed");
            self.events.push(SelectEvent::Closed);
        }
        if was_open || reset {
            self.events.push(SelectEvent::BlurInput);
        }
    }

    fn open_session(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        if self.config.is_multi() {
            self.reseed_pinned();
        }
        self.highlight.clear();
        debug!("session opened");
        self.events.push(SelectEvent::Opened);
    }

    // --- Input and searching ---

    /// The host's text input changed at time `now`.
    ///
    /// Opens the session (storing `text` trimmed when it does), marks loading and
    /// schedules a debounced search for `text` as typed. Ignored when not searchable
    /// or disabled.
    pub fn on_input(&mut self, text: &str, now: u64) {
        if self.is_disabled() || !self.config.has(SelectFlags::SEARCHABLE) {
            return;
        }
        let stored = if self.open {
            text
        } else {
            self.open_session();
            text.trim()
        };
        self.input = stored.to_owned();
        self.loading = true;
        self.search_debounce.schedule(text.to_owned(), now);
    }

    /// Fire timers that are due at `now`.
    pub fn tick(&mut self, now: u64) {
        if let Some(query) = self.search_debounce.poll(now) {
            self.run_search(&query);
        }
        if self.blur_close.poll(now).is_some() {
            debug!("blur grace elapsed");
            self.close();
        }
    }

    /// Search for `query` now, superseding pending and in-flight searches.
    pub fn search(&mut self, query: &str) {
        self.run_search(query);
    }

    /// Replace the options source and search the current input again.
    pub fn set_source(&mut self, source: OptionsSource) {
        self.pipeline.set_source(source);
        let query = self.input.clone();
        self.run_search(&query);
    }

    fn run_search(&mut self, query: &str) {
        self.search_debounce.cancel();
        self.loading = true;
        if let Started::Ready(results) = self.pipeline.start(query) {
            self.apply_results(query, results);
        }
    }

    fn apply_results(&mut self, query: &str, results: OptionTree) {
        self.results = results;
        self.results_query.clear();
        self.results_query.push_str(query);
        self.pinned = if self.config.is_multi() {
            self.value.entries().to_vec()
        } else {
            Vec::new()
        };
        self.rebuild_tree();
        self.highlight.clear();
        self.loading = false;
        self.first_load = false;
    }

    fn rebuild_tree(&mut self) {
        self.tree = decorate(
            &self.results,
            &self.results_query,
            self.config.has(SelectFlags::CREATABLE),
            &self.pinned,
        );
        self.rows = flatten_all(&self.tree);
    }

    fn reset_tree(&mut self) {
        self.results.clear();
        self.results_query.clear();
        self.pinned.clear();
        self.tree.clear();
        self.rows.clear();
        self.highlight.clear();
    }

    /// Put the live multi value at the head of the tree, keeping the highlight on
    /// the same node if it survives.
    fn reseed_pinned(&mut self) {
        let highlighted = resolve(&self.tree, &self.highlight).cloned();
        self.pinned = self.value.entries().to_vec();
        self.rebuild_tree();
        self.highlight = highlighted
            .and_then(|node| relocate(&self.tree, &node))
            .unwrap_or_default();
    }

    // --- Highlight and keys ---

    /// Highlight `address`, typically on pointer hover. Invalid addresses are ignored.
    pub fn highlight(&mut self, address: Address) {
        if is_valid(&self.tree, &address) {
            self.highlight = address;
        } else {
            trace!(?address, "ignored highlight of invalid address");
        }
    }

    /// Move the highlight by `delta` rows while open.
    pub fn move_highlight(&mut self, delta: isize) {
        if self.open {
            self.highlight = move_by(&self.tree, &self.highlight, delta);
        }
    }

    /// Handle a navigation or commit key.
    pub fn on_key(&mut self, key: Key) -> KeyOutcome {
        if let Some(delta) = key.delta() {
            self.move_highlight(delta);
            return KeyOutcome::Handled;
        }
        match key {
            Key::Home => self.highlight = first(&self.tree),
            Key::End => self.highlight = last(&self.tree),
            Key::Enter => self.enter(),
            Key::Backspace if self.input.is_empty() => self.backspace(),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    fn enter(&mut self) {
        if self.is_disabled() {
            return;
        }
        if !self.open {
            self.open_session();
            self.events.push(SelectEvent::Enter);
            return;
        }
        if self.highlight.depth() == 0 {
            self.events.push(SelectEvent::Enter);
            return;
        }
        match try_resolve(&self.tree, &self.highlight).map(OptionNode::clone) {
            Ok(node) if node.is_group() => {
                trace!(address = ?self.highlight, "enter on group header");
            }
            Ok(node) => self.select(node),
            Err(err) => trace!(%err, "enter on stale highlight"),
        }
    }

    fn backspace(&mut self) {
        if self.is_disabled() || !self.config.has(SelectFlags::CLEARABLE) {
            return;
        }
        if self.config.is_multi() {
            match &self.value {
                SelectValue::Multi(entries) => {
                    if let Some(index) = entries.len().checked_sub(1) {
                        self.remove(index);
                    }
                }
                _ => self.emit_change(SelectValue::Multi(Vec::new())),
            }
        } else if !self.value.is_empty() {
            self.emit_change(SelectValue::None);
        }
    }

    // --- Selection ---

    /// Commit `node`.
    ///
    /// A leaf proposes a replacement value (single) or the host's value with the leaf's
    /// membership toggled (multi). The creatable
    /// sentinel starts a creation request when a handler is configured; the result
    /// is committed from [`poll`](Self::poll). Groups change nothing.
    pub fn select(&mut self, node: OptionNode) {
        if self.is_disabled() {
            return;
        }
        if node.is_creatable() {
            if let Some(creator) = self.creator.as_mut() {
                let text = self.input.clone();
                debug!(text = %text, "creating option");
                let (task, handle) = creator.create(&text).into_task();
                let next = PendingCreate { text, task, handle };
                if let Some(mut previous) = self.pending_create.replace(next) {
                    previous.handle.cancel();
                }
                return;
            }
        }
        self.commit(&node);
    }

    /// Commit the node at `address`, typically on a row click.
    pub fn select_address(&mut self, address: &Address) {
        match try_resolve(&self.tree, address).map(OptionNode::clone) {
            Ok(node) if node.is_group() => trace!(?address, "group headers are not selectable"),
            Ok(node) => self.select(node),
            Err(err) => trace!(%err, "ignored selection of invalid address"),
        }
    }

    fn commit(&mut self, node: &OptionNode) {
        if let OptionNode::Leaf(leaf) = node {
            let next = if self.config.is_multi() {
                self.value.toggled(leaf)
            } else {
                SelectValue::Single(leaf.clone())
            };
            self.emit_change(next);
        }
        if self.config.close_on_select() {
            self.close();
            return;
        }
        if !self.input.is_empty() && self.config.has(SelectFlags::CLEAR_SEARCH_ON_SELECT) {
            self.input.clear();
            self.reset_tree();
            self.first_load = true;
            self.run_search("");
        }
        self.events.push(SelectEvent::FocusInput);
    }

    /// Remove the multi-select entry at `index`.
    pub fn remove(&mut self, index: usize) {
        if self.is_disabled() || !self.config.is_multi() {
            return;
        }
        match self.value.without(index) {
            Some(next) => self.emit_change(next),
            None => trace!(index, "ignored removal past the end of the value"),
        }
    }

    /// Close and propose the empty value.
    pub fn clear(&mut self) {
        if self.is_disabled() {
            return;
        }
        self.close();
        self.emit_change(SelectValue::empty(self.config.is_multi()));
    }

    /// The host's authoritative value changed.
    ///
    /// Proposed values from [`SelectEvent::Change`] take effect only through this
    /// call. In multi mode the pinned head of the tree is rebuilt from the new value.
    pub fn set_value(&mut self, value: SelectValue) {
        self.value = value;
        if self.config.is_multi() && self.pinned.as_slice() != self.value.entries() {
            self.reseed_pinned();
        }
    }

    fn emit_change(&mut self, value: SelectValue) {
        debug!(?value, "value change proposed");
        self.events.push(SelectEvent::Change(value));
    }

    // --- Focus and pointer ---

    /// The widget gained focus.
    ///
    /// Opens the session, except for the initial automatic focus when
    /// [`AUTO_FOCUS`](SelectFlags::AUTO_FOCUS) is set.
    pub fn on_focus(&mut self) {
        self.events.push(SelectEvent::Focus);
        self.blur_close.cancel();
        if mem::take(&mut self.auto_focus_pending) {
            trace!("initial auto focus");
            return;
        }
        if !self.is_disabled() {
            self.open_session();
        }
    }

    /// The widget lost focus at `now`; an open session closes after the blur grace
    /// delay.
    pub fn on_blur(&mut self, now: u64) {
        self.events.push(SelectEvent::Blur);
        if self.open || !self.input.is_empty() {
            self.blur_close.schedule((), now);
        }
    }

    /// A pointer went down. Presses inside the widget keep it open through a blur.
    pub fn on_pointer_down(&mut self, target: PointerTarget) {
        if target.is_inside() && self.blur_close.cancel().is_some() {
            trace!(?target, "pointer inside cancelled blur close");
        }
    }

    /// A pointer was released.
    ///
    /// Outside the widget this closes an open session; on the control it requests
    /// input focus.
    pub fn on_pointer_up(&mut self, target: PointerTarget) {
        match target {
            PointerTarget::Outside => {
                if self.open || !self.input.is_empty() {
                    self.close();
                }
            }
            PointerTarget::Control => {
                if !self.is_disabled() {
                    self.events.push(SelectEvent::FocusInput);
                }
            }
            PointerTarget::Option => {}
        }
    }

    // --- Async ---

    /// Drive in-flight creation and search requests.
    ///
    /// Returns `Ready(Ok(()))` once nothing is in flight. Failures are returned once;
    /// the session stays usable.
    pub fn poll(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), SelectError>> {
        let mut pending = false;

        if let Some(mut create) = self.pending_create.take() {
            let outcome = Pin::new(&mut create.task).poll(cx);
            match outcome {
                Poll::Pending => {
                    self.pending_create = Some(create);
                    pending = true;
                }
                Poll::Ready(Err(_)) => trace!(text = %create.text, "creation cancelled"),
                Poll::Ready(Ok(Err(source))) => {
                    warn!(text = %create.text, error = %source, "option creation failed");
                    return Poll::Ready(Err(SelectError::CreateFailure {
                        text: create.text,
                        source,
                    }));
                }
                Poll::Ready(Ok(Ok(created))) => {
                    let leaf = created.into_leaf(&create.text);
                    debug!(text = %create.text, value = ?leaf.value, "option created");
                    self.commit(&OptionNode::Leaf(leaf));
                }
            }
        }

        match self.pipeline.poll(cx) {
            Poll::Ready(None) => {}
            Poll::Ready(Some(Ok(resolved))) => self.apply_results(&resolved.query, resolved.tree),
            Poll::Ready(Some(Err(err))) => {
                self.loading = false;
                return Poll::Ready(Err(err));
            }
            Poll::Pending => pending = true,
        }

        if pending {
            Poll::Pending
        } else {
            Poll::Ready(Ok(()))
        }
    }

    /// Wait until nothing is in flight.
    pub async fn settle(&mut self) -> Result<(), SelectError> {
        poll_fn(|cx| self.poll(cx)).await
    }

    /// End the session, cancelling in-flight requests. Equivalent to dropping it.
    pub fn unmount(self) {
        debug!("session unmounted");
    }

    fn is_disabled(&self) -> bool {
        self.config.has(SelectFlags::DISABLED)
    }
}

impl Drop for Select {
    fn drop(&mut self) {
        if let Some(mut create) = self.pending_create.take() {
            create.handle.cancel();
        }
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("open", &self.open)
            .field("input", &self.input)
            .field("loading", &self.loading)
            .field("rows", &self.rows.len())
            .field("highlight", &self.highlight)
            .field("value", &self.value)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;
    use understory_option_tree::OptionValue;

    type Calls = Rc<RefCell<Vec<(String, oneshot::Sender<Result<OptionTree, BoxError>>)>>>;

    fn manual_provider() -> (OptionsSource, Calls) {
        let calls: Calls = Rc::default();
        let log = Rc::clone(&calls);
        let source = OptionsSource::provider(move |query: &str| {
            let (tx, rx) = oneshot::channel();
            log.borrow_mut().push((query.to_owned(), tx));
            async move {
                match rx.await {
                    Ok(result) => result,
                    Err(canceled) => Err(Box::new(canceled) as BoxError),
                }
            }
        });
        (source, calls)
    }

    fn respond(calls: &Calls, index: usize, tree: OptionTree) -> bool {
        let (_, tx) = calls.borrow_mut().remove(index);
        tx.send(Ok(tree)).is_ok()
    }

    fn fruit() -> OptionTree {
        vec![
            OptionNode::leaf("Apple", 1),
            OptionNode::group(
                "Citrus",
                vec![OptionNode::leaf("Lemon", 2), OptionNode::leaf("Lime", 3)],
            ),
            OptionNode::leaf("Pear", 4),
        ]
    }

    fn changes(select: &mut Select) -> Vec<SelectValue> {
        select
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                SelectEvent::Change(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn keyboard_walks_groups_in_preorder() {
        let tree = vec![
            OptionNode::leaf("A", 1),
            OptionNode::group("Group", vec![OptionNode::leaf("B", 2)]),
        ];
        let mut select = Select::new(tree, SelectConfig::default());
        select.open();
        assert!(select.on_key(Key::Down).is_handled());
        assert_eq!(select.highlighted(), &Address::from([0]));
        select.on_key(Key::Down);
        assert_eq!(select.highlighted(), &Address::from([1]));
        select.on_key(Key::Down);
        assert_eq!(select.highlighted(), &Address::from([1, 0]));

        select.close();
        select.open();
        assert!(select.highlighted().is_empty());
        select.on_key(Key::Up);
        assert_eq!(select.highlighted(), &Address::from([1, 0]));
    }

    #[test]
    fn movement_keys_need_an_open_list() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.on_key(Key::PageDown);
        assert!(select.highlighted().is_empty());
        select.open();
        select.on_key(Key::PageDown);
        assert_eq!(select.highlighted(), &Address::from([2]));
        select.on_key(Key::End);
        assert_eq!(select.highlighted(), &Address::from([2]));
        select.on_key(Key::Home);
        assert_eq!(select.highlighted(), &Address::from([0]));
        assert_eq!(select.on_key(Key::Backspace), KeyOutcome::Handled);
    }

    #[test]
    fn enter_commits_single_value_and_closes() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        assert_eq!(select.on_key(Key::Enter), KeyOutcome::Handled);
        assert!(select.is_open());
        assert_eq!(select.take_events(), vec![SelectEvent::Opened, SelectEvent::Enter]);

        select.highlight(Address::from([1]));
        select.on_key(Key::Enter);
        assert!(select.take_events().is_empty(), "group headers do not commit");

        select.on_key(Key::Down);
        select.on_key(Key::Enter);
        assert_eq!(
            select.take_events(),
            vec![
                SelectEvent::Change(SelectValue::Single(OptionLeaf::new("Lemon", 2))),
                SelectEvent::Closed,
                SelectEvent::BlurInput,
            ]
        );
        assert!(!select.is_open());
        assert_eq!(select.selected_address(), None);
        select.set_value(SelectValue::Single(OptionLeaf::new("Lemon", 2)));
        assert_eq!(select.selected_address(), Some(Address::from([1, 0])));
    }

    #[test]
    fn enter_on_empty_highlight_emits_enter() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.open();
        select.take_events();
        select.on_key(Key::Enter);
        assert_eq!(select.take_events(), vec![SelectEvent::Enter]);
    }

    #[test]
    fn invalid_addresses_are_ignored() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.open();
        select.highlight(Address::from([0]));
        select.highlight(Address::from([9, 9]));
        assert_eq!(select.highlighted(), &Address::from([0]));
        select.select_address(&Address::from([0, 1]));
        assert!(changes(&mut select).is_empty());
        assert!(select.is_open());
    }

    #[test]
    fn multi_select_toggles_and_stays_open() {
        let value = SelectValue::Multi(vec![OptionLeaf::new("Lemon", 2)]);
        let mut select = Select::builder(fruit())
            .config(SelectConfig::multi())
            .value(value)
            .build();
        // The selected entry is pinned and removed from its group.
        assert_eq!(select.pinned_len(), 1);
        assert_eq!(select.tree()[0], OptionNode::leaf("Lemon", 2));
        assert_eq!(select.tree()[2].children(), &[OptionNode::leaf("Lime", 3)]);

        select.open();
        select.select(OptionNode::leaf("Lemon", 2));
        assert_eq!(changes(&mut select), vec![SelectValue::Multi(vec![])]);
        assert!(select.is_open());

        // The host accepts the removal.
        select.set_value(SelectValue::Multi(vec![]));
        select.select(OptionNode::leaf("Pear", 4));
        let accepted = changes(&mut select);
        assert_eq!(accepted, vec![SelectValue::Multi(vec![OptionLeaf::new("Pear", 4)])]);
        select.set_value(accepted[0].clone());
        select.select(OptionNode::leaf("Apple", 1));
        assert_eq!(
            changes(&mut select),
            vec![SelectValue::Multi(vec![
                OptionLeaf::new("Pear", 4),
                OptionLeaf::new("Apple", 1),
            ])]
        );
    }

    #[test]
    fn toggles_start_from_the_host_value() {
        let apple = OptionLeaf::new("Apple", 1);
        let mut select = Select::builder(fruit())
            .config(SelectConfig::multi())
            .value(SelectValue::Multi(vec![apple.clone()]))
            .build();
        select.open();
        select.select(OptionNode::leaf("Lemon", 2));
        // The host rejects the change and never calls `set_value`.
        select.select(OptionNode::leaf("Pear", 4));
        assert_eq!(
            changes(&mut select),
            vec![
                SelectValue::Multi(vec![apple.clone(), OptionLeaf::new("Lemon", 2)]),
                SelectValue::Multi(vec![apple.clone(), OptionLeaf::new("Pear", 4)]),
            ]
        );
        assert_eq!(select.value(), &SelectValue::Multi(vec![apple]));
        let selected: Vec<_> = select.row_views().filter(|row| row.selected).collect();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].pinned);
    }

    #[test]
    fn set_value_reseeds_pinned_head() {
        let mut select = Select::new(fruit(), SelectConfig::multi());
        select.open();
        select.highlight(Address::from([2]));
        select.set_value(SelectValue::Multi(vec![OptionLeaf::new("Pear", 4)]));
        assert_eq!(select.pinned_len(), 1);
        assert_eq!(select.tree()[0], OptionNode::leaf("Pear", 4));
        // The highlight follows the node it was on.
        assert_eq!(select.highlighted_node(), Some(&OptionNode::leaf("Pear", 4)));
        assert_eq!(select.highlighted(), &Address::from([0]));

        let pinned: Vec<_> = select.row_views().filter(|row| row.pinned).collect();
        assert_eq!(pinned.len(), 1);
        assert!(pinned[0].selected);

        // Deselecting restores the leaf to its place in the results.
        select.set_value(SelectValue::Multi(vec![]));
        assert_eq!(select.tree(), fruit().as_slice());
    }

    #[test]
    fn backspace_removes_values_when_clearable() {
        let entries = vec![OptionLeaf::new("Apple", 1), OptionLeaf::new("Pear", 4)];
        let mut select = Select::builder(fruit())
            .config(SelectConfig::multi().with(SelectFlags::CLEARABLE))
            .value(SelectValue::Multi(entries))
            .build();
        select.on_key(Key::Backspace);
        assert_eq!(
            changes(&mut select),
            vec![SelectValue::Multi(vec![OptionLeaf::new("Apple", 1)])]
        );

        let mut single = Select::builder(fruit())
            .flags(SelectFlags::CLEARABLE)
            .value(SelectValue::Single(OptionLeaf::new("Apple", 1)))
            .build();
        single.on_key(Key::Backspace);
        assert_eq!(changes(&mut single), vec![SelectValue::None]);

        let mut not_clearable = Select::new(fruit(), SelectConfig::default());
        not_clearable.set_value(SelectValue::Single(OptionLeaf::new("Apple", 1)));
        not_clearable.on_key(Key::Backspace);
        assert!(changes(&mut not_clearable).is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let entries = vec![
            OptionLeaf::new("Apple", 1),
            OptionLeaf::new("Lime", 3),
            OptionLeaf::new("Pear", 4),
        ];
        let mut select = Select::builder(fruit())
            .config(SelectConfig::multi())
            .value(SelectValue::Multi(entries))
            .build();
        select.remove(1);
        select.remove(7);
        select.clear();
        assert_eq!(
            changes(&mut select),
            vec![
                SelectValue::Multi(vec![OptionLeaf::new("Apple", 1), OptionLeaf::new("Pear", 4)]),
                SelectValue::Multi(vec![]),
            ]
        );
    }

    #[test]
    fn disabled_sessions_ignore_commits_and_input() {
        let mut select = Select::new(fruit(), SelectConfig::default().with(SelectFlags::DISABLED));
        select.on_input("ap", 0);
        select.select(OptionNode::leaf("Apple", 1));
        select.on_key(Key::Enter);
        select.on_focus();
        select.clear();
        assert!(!select.is_open());
        assert_eq!(select.input(), "");
        assert_eq!(select.take_events(), vec![SelectEvent::Focus]);
    }

    #[test]
    fn typed_searches_are_debounced() {
        let (source, calls) = manual_provider();
        let mut select = Select::new(source, SelectConfig::default());
        select.on_input("  a", 0);
        assert!(select.is_open());
        assert_eq!(select.input(), "a");
        select.on_input("ab", 100);
        select.on_input("abc", 200);
        assert!(select.is_loading());
        assert_eq!(select.next_deadline(), Some(700));

        select.tick(650);
        assert!(calls.borrow().is_empty());
        select.tick(700);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0].0, "abc");

        assert!(respond(&calls, 0, vec![OptionNode::leaf("abc", 1)]));
        block_on(select.settle()).unwrap();
        assert!(!select.is_loading());
        assert_eq!(select.tree(), &[OptionNode::leaf("abc", 1)]);
        assert!(!select.has_pending_work());
    }

    #[test]
    fn superseded_search_never_mutates_state() {
        let (source, calls) = manual_provider();
        let mut select = Select::new(source, SelectConfig::default());
        select.open();
        select.search("a");
        select.search("ab");
        assert_eq!(calls.borrow().len(), 2);

        // The stale request settles last-but-first; it was cancelled and dropped.
        assert!(!respond(&calls, 0, vec![OptionNode::leaf("stale", 0)]));
        assert!(select.is_loading());
        assert!(select.tree().is_empty());

        assert!(respond(&calls, 0, vec![OptionNode::leaf("fresh", 1)]));
        block_on(select.settle()).unwrap();
        assert_eq!(select.tree(), &[OptionNode::leaf("fresh", 1)]);
        assert!(!select.is_first_load());
    }

    #[test]
    fn provider_failures_clear_loading() {
        let (source, calls) = manual_provider();
        let mut select = Select::new(source, SelectConfig::default());
        select.search("boom");
        let (_, tx) = calls.borrow_mut().remove(0);
        tx.send(Err("backend down".into())).unwrap();
        match block_on(select.settle()) {
            Err(SelectError::ProviderFailure { query, source }) => {
                assert_eq!(query, "boom");
                assert_eq!(source.to_string(), "backend down");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!select.is_loading());
        // Still usable.
        select.search("ok");
        assert!(respond(&calls, 0, vec![]));
        block_on(select.settle()).unwrap();
    }

    #[test]
    fn creatable_commits_created_leaf() {
        let (tx, rx) = oneshot::channel::<Created>();
        let rx = RefCell::new(Some(rx));
        let mut select = Select::builder(fruit())
            .flags(SelectFlags::CREATABLE)
            .create_with(move |text: &str| {
                assert_eq!(text, "xyz");
                let rx = rx.borrow_mut().take();
                async move {
                    match rx {
                        Some(rx) => rx.await.map_err(|e| Box::new(e) as BoxError),
                        None => Err("created twice".into()),
                    }
                }
            })
            .build();
        select.on_input("xyz", 0);
        select.tick(500);
        assert_eq!(select.tree(), &[OptionNode::Creatable]);
        assert_eq!(select.create_option_message(), "Create \"xyz\"");
        assert!(!select.shows_no_options());

        select.on_key(Key::Down);
        select.on_key(Key::Enter);
        assert!(changes(&mut select).is_empty());
        assert!(select.has_pending_work());

        tx.send(Created::Value(OptionValue::from("id-1"))).unwrap();
        block_on(select.settle()).unwrap();
        assert_eq!(
            changes(&mut select),
            vec![SelectValue::Single(OptionLeaf::new("xyz", "id-1"))]
        );
        assert!(!select.is_open());
        // Closing cleared the input and searched again.
        assert_eq!(select.input(), "");
        assert_eq!(select.tree(), fruit().as_slice());
    }

    #[test]
    fn multi_select_clears_search_after_commit() {
        let mut select = Select::new(fruit(), SelectConfig::multi());
        select.on_input("pe", 0);
        select.tick(500);
        assert_eq!(select.tree(), &[OptionNode::leaf("Pear", 4)]);
        select.select_address(&Address::from([0]));
        assert!(select.is_open());
        assert_eq!(select.input(), "");
        assert_eq!(select.tree(), fruit().as_slice());
        let events = select.take_events();
        assert_eq!(events.last(), Some(&SelectEvent::FocusInput));

        select.set_value(SelectValue::Multi(vec![OptionLeaf::new("Pear", 4)]));
        assert_eq!(select.tree()[0], OptionNode::leaf("Pear", 4));
        assert_eq!(select.pinned_len(), 1);
    }

    #[test]
    fn blur_closes_after_grace_unless_pointer_inside() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.on_focus();
        assert!(select.is_open());

        select.on_blur(1_000);
        select.on_pointer_down(PointerTarget::Option);
        select.tick(2_000);
        assert!(select.is_open());

        select.on_blur(3_000);
        select.tick(3_249);
        assert!(select.is_open());
        select.tick(3_250);
        assert!(!select.is_open());
        assert_eq!(
            select.take_events(),
            vec![
                SelectEvent::Focus,
                SelectEvent::Opened,
                SelectEvent::Blur,
                SelectEvent::Blur,
                SelectEvent::Closed,
                SelectEvent::BlurInput,
            ]
        );
    }

    #[test]
    fn pointer_up_outside_closes_and_clears() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.on_input("ap", 0);
        select.tick(500);
        assert_eq!(select.tree().len(), 1);
        select.on_pointer_up(PointerTarget::Outside);
        assert!(!select.is_open());
        assert_eq!(select.input(), "");
        assert_eq!(select.tree(), fruit().as_slice());

        select.take_events();
        select.on_pointer_up(PointerTarget::Outside);
        assert!(select.take_events().is_empty());
        select.on_pointer_up(PointerTarget::Control);
        assert_eq!(select.take_events(), vec![SelectEvent::FocusInput]);
    }

    #[test]
    fn auto_focus_does_not_open() {
        let mut select = Select::builder(fruit()).flags(SelectFlags::AUTO_FOCUS).build();
        select.on_focus();
        assert!(!select.is_open());
        select.on_focus();
        assert!(select.is_open());
    }

    #[test]
    fn messages_and_indicators() {
        let (source, calls) = manual_provider();
        let mut select = Select::builder(source)
            .flags(SelectFlags::DEFAULT_OPTIONS)
            .no_options_message(|input| format!("nothing for {input:?}"))
            .build();
        assert!(select.shows_loading());
        assert!(!select.shows_no_options());
        assert!(respond(&calls, 0, vec![]));
        block_on(select.settle()).unwrap();
        assert!(!select.shows_loading());
        assert!(select.shows_no_options());
        assert_eq!(select.no_options_message(), "nothing for \"\"");

        let loading = SelectConfig::default().with(SelectFlags::LOADING);
        let plain = Select::new(OptionTree::new(), loading);
        assert_eq!(plain.no_options_message(), "No Options");
        assert!(plain.is_busy());
        assert!(!plain.is_loading());
    }

    #[test]
    fn creation_failure_keeps_the_session_usable() {
        let mut select = Select::builder(fruit())
            .config(SelectConfig::multi().with(SelectFlags::CREATABLE))
            .create_with(|_: &str| async { Err::<Created, BoxError>("nope".into()) })
            .build();
        select.on_input("zz", 0);
        select.tick(500);
        select.select(OptionNode::Creatable);
        match block_on(select.settle()) {
            Err(SelectError::CreateFailure { text, source }) => {
                assert_eq!(text, "zz");
                assert_eq!(source.to_string(), "nope");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(select.is_open());
        assert!(changes(&mut select).is_empty());
        assert!(!select.has_pending_work());

        select.select(OptionNode::leaf("Pear", 4));
        assert_eq!(
            changes(&mut select),
            vec![SelectValue::Multi(vec![OptionLeaf::new("Pear", 4)])]
        );
    }

    #[test]
    fn second_creation_supersedes_the_first() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Handler {
            senders: Rc<RefCell<Vec<oneshot::Sender<Created>>>>,
            cancelled: Arc<AtomicUsize>,
        }

        impl CreateHandler for Handler {
            fn create(&mut self, _text: &str) -> crate::Request<Created> {
                let (tx, rx) = oneshot::channel();
                self.senders.borrow_mut().push(tx);
                let cancelled = Arc::clone(&self.cancelled);
                crate::Request::new(async move { rx.await.map_err(|e| Box::new(e) as BoxError) })
                    .on_cancel(move || {
                        cancelled.fetch_add(1, Ordering::SeqCst);
                    })
            }
        }

        let senders: Rc<RefCell<Vec<oneshot::Sender<Created>>>> = Rc::default();
        let cancelled = Arc::new(AtomicUsize::new(0));
        let mut select = Select::builder(fruit())
            .flags(SelectFlags::CREATABLE)
            .create_with(Handler {
                senders: Rc::clone(&senders),
                cancelled: Arc::clone(&cancelled),
            })
            .build();
        select.on_input("kiwi", 0);
        select.tick(500);
        select.select(OptionNode::Creatable);
        select.select(OptionNode::Creatable);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);

        let (first, second) = {
            let mut senders = senders.borrow_mut();
            let second = senders.pop().unwrap();
            let first = senders.pop().unwrap();
            (first, second)
        };
        // The first request was dropped along with its receiver.
        assert!(first.send(Created::Value(OptionValue::from("old"))).is_err());
        second.send(Created::Value(OptionValue::from("new"))).unwrap();
        block_on(select.settle()).unwrap();
        assert_eq!(
            changes(&mut select),
            vec![SelectValue::Single(OptionLeaf::new("kiwi", "new"))]
        );
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn opening_input_searches_the_text_as_typed() {
        let mut select = Select::new(fruit(), SelectConfig::default().with(SelectFlags::CREATABLE));
        select.on_input(" ", 0);
        assert_eq!(select.input(), "");
        select.tick(500);
        assert_eq!(select.tree().last(), Some(&OptionNode::Creatable));
    }

    #[test]
    fn blur_after_close_emits_nothing_extra() {
        let mut select = Select::new(fruit(), SelectConfig::default());
        select.on_focus();
        select.select(OptionNode::leaf("Apple", 1));
        assert!(!select.is_open());
        select.take_events();

        select.on_blur(0);
        assert_eq!(select.next_deadline(), None);
        select.tick(1_000);
        select.close();
        assert_eq!(select.take_events(), vec![SelectEvent::Blur]);
    }

    #[test]
    fn unmount_cancels_in_flight_requests() {
        let (source, calls) = manual_provider();
        let mut select = Select::new(source, SelectConfig::default());
        select.search("q");
        select.unmount();
        let (_, tx) = calls.borrow_mut().remove(0);
        assert!(tx.is_canceled());
    }

    #[test]
    fn replacing_the_source_searches_again() {
        let mut select = Select::new(fruit(), SelectConfig::default().with(SelectFlags::OPEN));
        assert!(select.is_open());
        select.on_input("l", 0);
        select.tick(500);
        select.set_source(OptionsSource::Static(vec![
            OptionNode::leaf("Lychee", 5),
            OptionNode::leaf("Fig", 6),
        ]));
        assert_eq!(select.tree(), &[OptionNode::leaf("Lychee", 5)]);
        assert!(!select.has_pending_work());
    }
}
