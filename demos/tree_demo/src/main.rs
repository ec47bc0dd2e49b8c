// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds a small scene whose sprites arrive after simulated network delays.
//!
//! Nodes are attached right away; each sprite only shows up in its parent's
//! container once its fetch resolves. One fetch fails and one sprite is
//! removed while still loading, so its late payload is discarded. Lifecycle
//! events are printed with a
//! [`PrettyPrintSink`](arbor_debug::pretty::PrettyPrintSink) and recorded by a
//! [`RecorderSink`](arbor_debug::recorder::RecorderSink); the final tree is
//! dumped as text and JSON.
//!
//! Set `RUST_LOG=debug` (or `trace`) to see the tree's own log output.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use arbor_backend_headless::{HeadlessBackend, RemoteSprite, Sprite};
use arbor_core::config::TreeConfig;
use arbor_core::error::LoadError;
use arbor_core::geom::Position;
use arbor_core::node::NodeTree;
use arbor_core::trace::{
    AttachEvent, DestroyEvent, DetachEvent, LoadCompleteEvent, MountEvent, MountSkippedEvent,
    TraceSink,
};
use arbor_debug::pretty::PrettyPrintSink;
use arbor_debug::recorder::RecorderSink;

/// Loads polled per `poll_loads` call.
const POLL_BUDGET: usize = 2;

/// A fetch that resolves after being polled `polls_left` more times.
#[derive(Debug)]
struct Fetch {
    label: &'static str,
    polls_left: u32,
    missing: bool,
}

impl Fetch {
    fn new(label: &'static str, polls: u32) -> Self {
        Self {
            label,
            polls_left: polls,
            missing: false,
        }
    }

    fn missing(label: &'static str, polls: u32) -> Self {
        Self {
            missing: true,
            ..Self::new(label, polls)
        }
    }
}

impl Future for Fetch {
    type Output = Result<String, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.polls_left > 0 {
            self.polls_left -= 1;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        Poll::Ready(if self.missing {
            Err(LoadError::failed(format!("{} not found", self.label)))
        } else {
            Ok(self.label.to_owned())
        })
    }
}

/// Forwards every event to both sinks.
#[derive(Debug)]
struct Tee(PrettyPrintSink, RecorderSink);

impl TraceSink for Tee {
    fn on_attach(&mut self, e: &AttachEvent) {
        self.0.on_attach(e);
        self.1.on_attach(e);
    }

    fn on_mount(&mut self, e: &MountEvent) {
        self.0.on_mount(e);
        self.1.on_mount(e);
    }

    fn on_load_complete(&mut self, e: &LoadCompleteEvent) {
        self.0.on_load_complete(e);
        self.1.on_load_complete(e);
    }

    fn on_mount_skipped(&mut self, e: &MountSkippedEvent) {
        self.0.on_mount_skipped(e);
        self.1.on_mount_skipped(e);
    }

    fn on_detach(&mut self, e: &DetachEvent) {
        self.0.on_detach(e);
        self.1.on_detach(e);
    }

    fn on_destroy(&mut self, e: &DestroyEvent) {
        self.0.on_destroy(e);
        self.1.on_destroy(e);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // -- sinks -------------------------------------------------------------
    let recorder = RecorderSink::new();
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));

    // -- tree --------------------------------------------------------------
    let backend = HeadlessBackend::new();
    let mut tree = NodeTree::with_config(backend.clone(), TreeConfig::frame_budgeted(POLL_BUDGET));
    tree.set_trace_sink(Box::new(Tee(pretty, recorder.clone())));

    let world = tree.create_node(Position::ZERO);
    tree.load(world)?;

    let forest = tree.create_node(Position::new(100.0, 50.0));
    tree.add(world, forest)?;
    for (label, delay) in [("oak", 3), ("pine", 1), ("birch", 5)] {
        let kind = RemoteSprite::new(&backend, Fetch::new(label, delay));
        let leaf = tree.create_leaf(kind);
        tree.add(forest, leaf)?;
    }

    let sign = tree.create_leaf(Sprite::new("sign"));
    tree.add(world, sign)?;

    let statue = tree.create_leaf(RemoteSprite::new(&backend, Fetch::missing("statue", 2)));
    tree.add(world, statue)?;
    tree.on_loaded(statue, |outcome| {
        if let Err(err) = outcome {
            log::warn!("statue stays invisible: {err}");
        }
    })?;

    let balloon = tree.create_leaf(RemoteSprite::new(&backend, Fetch::new("balloon", 4)));
    tree.add(world, balloon)?;
    // Popped before it finished loading.
    tree.remove(world, balloon);

    // -- drive loads -------------------------------------------------------
    pollster::block_on(tree.settle());

    // -- report ------------------------------------------------------------
    println!();
    print!("{}", arbor_debug::dump::dump(&tree));
    println!();
    arbor_debug::snapshot::write(&tree, &mut std::io::stdout())?;

    println!();
    println!(
        "{} events recorded, {} live drawables, {} double releases",
        recorder.events().len(),
        backend.live_count(),
        backend.double_releases().len(),
    );
    Ok(())
}
