// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted select session against a simulated remote catalog.
//!
//! This example shows how a host drives `understory_select`:
//! - typed input is debounced on host timestamps and fired with `tick`,
//! - provider searches are driven to completion with `settle`,
//! - keys move the highlight through groups and commit values,
//! - the creatable row turns typed text into a new value,
//! - proposed values take effect once the host echoes them with `set_value`.
//!
//! Run:
//! - `cargo run -p understory_demos --example select_session`
//! - `RUST_LOG=understory_select=trace cargo run -p understory_demos --example select_session`

use futures::executor::block_on;
use tracing_subscriber::EnvFilter;
use understory_option_tree::{Label, OptionNode, OptionTree, filter_tree};
use understory_select::{
    BoxError, Created, Key, OptionsSource, Select, SelectConfig, SelectEvent, SelectFlags,
};

fn catalog() -> OptionTree {
    vec![
        OptionNode::leaf("Rust", "rs"),
        OptionNode::group(
            "Functional",
            vec![
                OptionNode::leaf("Haskell", "hs"),
                OptionNode::leaf("OCaml", "ml"),
                OptionNode::group("Lisps", vec![OptionNode::leaf("Racket", "rkt")]),
            ],
        ),
        OptionNode::leaf("Zig", "zig"),
    ]
}

fn render(select: &Select) {
    println!("  input: {:?}  open: {}", select.input(), select.is_open());
    if select.shows_loading() {
        println!("    (loading)");
    }
    if select.shows_no_options() {
        println!("    {}", select.no_options_message());
    }
    for row in select.row_views() {
        let marker = if row.highlighted { '>' } else { ' ' };
        let check = if row.selected { "[x]" } else { "[ ]" };
        let indent = "  ".repeat(row.depth);
        let text = match row.node {
            OptionNode::Creatable => select.create_option_message(),
            node => match node.label() {
                Some(Label::Text(text)) => text.clone(),
                Some(Label::Opaque(id)) => format!("#{id}"),
                None => String::new(),
            },
        };
        let check = if row.node.is_leaf() { check } else { "   " };
        println!("   {marker} {indent}{check} {text}");
    }
}

/// Print drained events, accepting every proposed value as the host.
fn report(select: &mut Select) {
    for event in select.take_events() {
        println!("  event: {event:?}");
        if let SelectEvent::Change(value) = event {
            select.set_value(value);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The "remote" backend filters the catalog; a real one would hit the network.
    let source = OptionsSource::provider(|query: &str| {
        let rows = filter_tree(&catalog(), query);
        async move { Ok::<_, BoxError>(rows) }
    });

    let mut next_id = 0_u32;
    let mut select = Select::builder(source)
        .config(SelectConfig::multi().with(SelectFlags::CREATABLE | SelectFlags::DEFAULT_OPTIONS))
        .create_with(move |text: &str| {
            next_id += 1;
            let id = format!("custom-{next_id}-{}", text.to_lowercase());
            async move { Ok::<_, BoxError>(Created::Value(id.into())) }
        })
        .build();

    println!("mounted:");
    block_on(select.settle()).expect("static provider does not fail");
    select.on_focus();
    render(&select);
    report(&mut select);

    println!("walk into the groups:");
    for _ in 0..4 {
        select.on_key(Key::Down);
    }
    render(&select);
    select.on_key(Key::Enter);
    report(&mut select);

    println!("type a burst; only the last keystroke searches:");
    let mut now = 1_000;
    for text in ["c", "ca", "cam"] {
        select.on_input(text, now);
        now += 80;
    }
    if let Some(deadline) = select.next_deadline() {
        now = deadline;
    }
    select.tick(now);
    block_on(select.settle()).expect("static provider does not fail");
    render(&select);

    println!("create from the typed text:");
    select.on_key(Key::End);
    select.on_key(Key::Enter);
    block_on(select.settle()).expect("creation does not fail");
    report(&mut select);
    block_on(select.settle()).expect("static provider does not fail");
    render(&select);

    println!("blur, then click outside:");
    select.on_blur(now);
    select.tick(now + select.config().blur_grace_ms);
    let closed = select
        .take_events()
        .iter()
        .any(|event| matches!(event, SelectEvent::Closed));
    println!("  closed after grace: {closed}");
}
