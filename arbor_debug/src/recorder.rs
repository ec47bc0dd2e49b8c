// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events as
//! little-endian records: a one-byte tag followed by the event's node handles
//! (index and generation, four bytes each) and flags. [`decode`] reads them
//! back as an iterator of [`RecordedEvent`].
//!
//! The tree takes ownership of its sink, so a recorder shares its buffer
//! with its clones: install one clone and read the bytes from another.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::node::NodeId;
use arbor_core::trace::{
    AttachEvent, DestroyEvent, DetachEvent, LoadCompleteEvent, LoadStatus, MountEvent,
    MountSkippedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ATTACH: u8 = 1;
const TAG_MOUNT: u8 = 2;
const TAG_LOAD_COMPLETE: u8 = 3;
const TAG_MOUNT_SKIPPED: u8 = 4;
const TAG_DETACH: u8 = 5;
const TAG_DESTROY: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Decodes everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        decode(&self.buf.borrow()).collect()
    }

    /// Discards the recorded bytes.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u32(&self, v: u32) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_id(&self, id: NodeId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_status(&self, status: LoadStatus) {
        self.write_u8(match status {
            LoadStatus::Ready => 0,
            LoadStatus::Failed => 1,
            LoadStatus::Orphaned => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_attach(&mut self, e: &AttachEvent) {
        self.write_u8(TAG_ATTACH);
        self.write_id(e.parent);
        self.write_id(e.child);
    }

    fn on_mount(&mut self, e: &MountEvent) {
        self.write_u8(TAG_MOUNT);
        self.write_id(e.parent);
        self.write_id(e.child);
        self.write_u8(u8::from(e.deferred));
    }

    fn on_load_complete(&mut self, e: &LoadCompleteEvent) {
        self.write_u8(TAG_LOAD_COMPLETE);
        self.write_id(e.node);
        self.write_status(e.status);
    }

    fn on_mount_skipped(&mut self, e: &MountSkippedEvent) {
        self.write_u8(TAG_MOUNT_SKIPPED);
        self.write_id(e.parent);
        self.write_id(e.child);
    }

    fn on_detach(&mut self, e: &DetachEvent) {
        self.write_u8(TAG_DETACH);
        self.write_id(e.parent);
        self.write_id(e.child);
    }

    fn on_destroy(&mut self, e: &DestroyEvent) {
        self.write_u8(TAG_DESTROY);
        self.write_id(e.node);
        self.write_u8(u8::from(e.load_in_flight));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An [`AttachEvent`].
    Attach(AttachEvent),
    /// A [`MountEvent`].
    Mount(MountEvent),
    /// A [`LoadCompleteEvent`].
    LoadComplete(LoadCompleteEvent),
    /// A [`MountSkippedEvent`].
    MountSkipped(MountSkippedEvent),
    /// A [`DetachEvent`].
    Detach(DetachEvent),
    /// A [`DestroyEvent`].
    Destroy(DestroyEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_id(&mut self) -> Option<NodeId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(NodeId::from_raw(index, generation))
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_status(&mut self) -> Option<LoadStatus> {
        Some(match self.read_u8()? {
            0 => LoadStatus::Ready,
            1 => LoadStatus::Failed,
            2 => LoadStatus::Orphaned,
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        Some(match tag {
            TAG_ATTACH => RecordedEvent::Attach(AttachEvent {
                parent: self.read_id()?,
                child: self.read_id()?,
            }),
            TAG_MOUNT => RecordedEvent::Mount(MountEvent {
                parent: self.read_id()?,
                child: self.read_id()?,
                deferred: self.read_bool()?,
            }),
            TAG_LOAD_COMPLETE => RecordedEvent::LoadComplete(LoadCompleteEvent {
                node: self.read_id()?,
                status: self.read_status()?,
            }),
            TAG_MOUNT_SKIPPED => RecordedEvent::MountSkipped(MountSkippedEvent {
                parent: self.read_id()?,
                child: self.read_id()?,
            }),
            TAG_DETACH => RecordedEvent::Detach(DetachEvent {
                parent: self.read_id()?,
                child: self.read_id()?,
            }),
            TAG_DESTROY => RecordedEvent::Destroy(DestroyEvent {
                node: self.read_id()?,
                load_in_flight: self.read_bool()?,
            }),
            _ => return None, // unknown tag → stop iteration
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::task::{Context, Waker};

    use arbor_backend_headless::{HeadlessBackend, RemoteSprite};
    use arbor_core::error::LoadError;
    use arbor_core::geom::Position;
    use arbor_core::node::NodeTree;
    use arbor_core::signal::OneShot;

    use super::*;

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_destroy(&DestroyEvent {
            node: NodeId::from_raw(1, 0),
            load_in_flight: false,
        });
        rec.on_destroy(&DestroyEvent {
            node: NodeId::from_raw(2, 0),
            load_in_flight: false,
        });
        let mut bytes = rec.bytes();
        bytes.pop();

        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn records_remove_before_load() {
        let backend = HeadlessBackend::new();
        let mut tree = NodeTree::new(backend.clone());
        let rec = RecorderSink::new();
        tree.set_trace_sink(Box::new(rec.clone()));

        let root = tree.create_node(Position::ZERO);
        let gate = OneShot::<Result<String, LoadError>>::new();
        let child = tree.create_leaf(RemoteSprite::new(&backend, gate.listen()));
        tree.add(root, child).unwrap();
        tree.remove(root, child);
        gate.fire(Ok("late".into()));
        let mut cx = Context::from_waker(Waker::noop());
        let _ = tree.poll_loads(&mut cx);

        assert_eq!(
            rec.events(),
            vec![
                RecordedEvent::Attach(AttachEvent {
                    parent: root,
                    child
                }),
                RecordedEvent::Detach(DetachEvent {
                    parent: root,
                    child
                }),
                RecordedEvent::Destroy(DestroyEvent {
                    node: child,
                    load_in_flight: true
                }),
                RecordedEvent::LoadComplete(LoadCompleteEvent {
                    node: child,
                    status: LoadStatus::Orphaned
                }),
            ]
        );
    }

    #[test]
    fn unknown_status_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_load_complete(&LoadCompleteEvent {
            node: NodeId::from_raw(1, 0),
            status: LoadStatus::Ready,
        });
        rec.on_load_complete(&LoadCompleteEvent {
            node: NodeId::from_raw(2, 0),
            status: LoadStatus::Orphaned,
        });
        let mut bytes = rec.bytes();
        // Corrupt the status byte of the second record.
        if let Some(last) = bytes.last_mut() {
            *last = 7;
        }

        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(
            events,
            vec![RecordedEvent::LoadComplete(LoadCompleteEvent {
                node: NodeId::from_raw(1, 0),
                status: LoadStatus::Ready,
            })]
        );
    }

    #[test]
    fn clear_discards_history() {
        let mut rec = RecorderSink::new();
        rec.on_attach(&AttachEvent {
            parent: NodeId::from_raw(0, 0),
            child: NodeId::from_raw(1, 0),
        });
        rec.clear();
        assert!(rec.events().is_empty());
    }
}
