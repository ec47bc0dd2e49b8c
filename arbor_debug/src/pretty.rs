// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use arbor_core::node::NodeId;
use arbor_core::trace::{
    AttachEvent, DestroyEvent, DetachEvent, LoadCompleteEvent, LoadStatus, MountEvent,
    MountSkippedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats a handle as `index.generation`.
struct Id(NodeId);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0.index(), self.0.generation())
    }
}

fn status_name(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Ready => "ready",
        LoadStatus::Failed => "failed",
        LoadStatus::Orphaned => "orphaned",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_attach(&mut self, e: &AttachEvent) {
        let _ = writeln!(
            self.writer,
            "[attach] child={} parent={}",
            Id(e.child),
            Id(e.parent),
        );
    }

    fn on_mount(&mut self, e: &MountEvent) {
        let _ = writeln!(
            self.writer,
            "[mount] child={} parent={}{}",
            Id(e.child),
            Id(e.parent),
            if e.deferred { " (deferred)" } else { "" },
        );
    }

    fn on_load_complete(&mut self, e: &LoadCompleteEvent) {
        let _ = writeln!(
            self.writer,
            "[load] node={} {}",
            Id(e.node),
            status_name(e.status),
        );
    }

    fn on_mount_skipped(&mut self, e: &MountSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[mount:skip] child={} parent={}",
            Id(e.child),
            Id(e.parent),
        );
    }

    fn on_detach(&mut self, e: &DetachEvent) {
        let _ = writeln!(
            self.writer,
            "[detach] child={} parent={}",
            Id(e.child),
            Id(e.parent),
        );
    }

    fn on_destroy(&mut self, e: &DestroyEvent) {
        let _ = writeln!(
            self.writer,
            "[destroy] node={}{}",
            Id(e.node),
            if e.load_in_flight {
                " (load in flight)"
            } else {
                ""
            },
        );
    }
}
