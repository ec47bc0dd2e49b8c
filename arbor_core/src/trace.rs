// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for node lifecycles.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`NodeTree`](crate::node::NodeTree) calls at each lifecycle transition.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional boxed [`TraceSink`]. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Independently of this module, the tree reports the same transitions
//! through the `log` facade.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use crate::node::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a child is linked under a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachEvent {
    /// The new parent.
    pub parent: NodeId,
    /// The attached node.
    pub child: NodeId,
}

/// Emitted when a child's drawable is added to its parent's container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountEvent {
    /// The parent whose container received the drawable.
    pub parent: NodeId,
    /// The mounted node.
    pub child: NodeId,
    /// Whether the mount waited for the child's load step.
    pub deferred: bool,
}

/// How a load step ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    /// The load step succeeded.
    Ready,
    /// The load step failed.
    Failed,
    /// The load step resolved after its node was destroyed.
    Orphaned,
}

/// Emitted when a load step resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadCompleteEvent {
    /// The node whose load step resolved. May be stale.
    pub node: NodeId,
    /// How the load step ended.
    pub status: LoadStatus,
}

/// Emitted when a pending mount is dropped because the child is no longer
/// attached to the parent that requested it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountSkippedEvent {
    /// The parent recorded when the mount was requested.
    pub parent: NodeId,
    /// The node that finished loading.
    pub child: NodeId,
}

/// Emitted when a child is unlinked from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetachEvent {
    /// The former parent.
    pub parent: NodeId,
    /// The detached node.
    pub child: NodeId,
}

/// Emitted after a node's resources were released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestroyEvent {
    /// The destroyed node. Stale from now on.
    pub node: NodeId,
    /// Whether the node's load step was still in flight.
    pub load_in_flight: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives node lifecycle events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a child is attached.
    fn on_attach(&mut self, e: &AttachEvent) {
        _ = e;
    }

    /// Called when a drawable is mounted.
    fn on_mount(&mut self, e: &MountEvent) {
        _ = e;
    }

    /// Called when a load step resolves.
    fn on_load_complete(&mut self, e: &LoadCompleteEvent) {
        _ = e;
    }

    /// Called when a pending mount is dropped.
    fn on_mount_skipped(&mut self, e: &MountSkippedEvent) {
        _ = e;
    }

    /// Called when a child is detached.
    fn on_detach(&mut self, e: &DetachEvent) {
        _ = e;
    }

    /// Called when a node is destroyed.
    fn on_destroy(&mut self, e: &DestroyEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Emits an [`AttachEvent`].
    #[inline]
    pub fn attach(&mut self, e: &AttachEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_attach(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MountEvent`].
    #[inline]
    pub fn mount(&mut self, e: &MountEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mount(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LoadCompleteEvent`].
    #[inline]
    pub fn load_complete(&mut self, e: &LoadCompleteEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_load_complete(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MountSkippedEvent`].
    #[inline]
    pub fn mount_skipped(&mut self, e: &MountSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mount_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DetachEvent`].
    #[inline]
    pub fn detach(&mut self, e: &DetachEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_detach(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DestroyEvent`].
    #[inline]
    pub fn destroy(&mut self, e: &DestroyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_destroy(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(idx: u32) -> NodeId {
        NodeId { idx, generation: 0 }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_attach(&AttachEvent {
            parent: id(0),
            child: id(1),
        });
        sink.on_destroy(&DestroyEvent {
            node: id(1),
            load_in_flight: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.attach(&AttachEvent {
            parent: id(0),
            child: id(1),
        });
        tracer.load_complete(&LoadCompleteEvent {
            node: id(1),
            status: LoadStatus::Orphaned,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        use crate::geom::Position;
        use crate::node::NodeTree;
        use crate::test_backend::RecordingBackend;

        struct RecordingSink {
            attached: Rc<RefCell<Vec<NodeId>>>,
            destroyed: Rc<RefCell<Vec<NodeId>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_attach(&mut self, e: &AttachEvent) {
                self.attached.borrow_mut().push(e.child);
            }
            fn on_destroy(&mut self, e: &DestroyEvent) {
                self.destroyed.borrow_mut().push(e.node);
            }
        }

        let attached = Rc::new(RefCell::new(Vec::new()));
        let destroyed = Rc::new(RefCell::new(Vec::new()));
        let mut tree = NodeTree::new(RecordingBackend::default());
        tree.set_trace_sink(Box::new(RecordingSink {
            attached: Rc::clone(&attached),
            destroyed: Rc::clone(&destroyed),
        }));

        let root = tree.create_node(Position::ZERO);
        let child = tree.create_node(Position::ZERO);
        tree.add(root, child).unwrap();
        tree.remove(root, child);

        assert_eq!(*attached.borrow(), &[child]);
        assert_eq!(*destroyed.borrow(), &[child]);
    }
}
