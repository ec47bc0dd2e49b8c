// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording backend and node kinds shared by unit tests.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::future::ready;

use kurbo::Affine;

use crate::backend::Backend;
use crate::error::LoadError;
use crate::kind::{LoadFuture, NodeKind};
use crate::signal::{Listener, OneShot};

/// Containers are numbered from 1; tests pick leaf drawables from 10 up.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next: u32,
    children: BTreeMap<u32, Vec<u32>>,
    transforms: BTreeMap<u32, Affine>,
    pub(crate) created: Vec<u32>,
    pub(crate) released: Vec<u32>,
}

impl RecordingBackend {
    pub(crate) fn children_of(&self, container: u32) -> &[u32] {
        self.children
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn transform(&self, drawable: u32) -> Option<Affine> {
        self.transforms.get(&drawable).copied()
    }
}

impl Backend for RecordingBackend {
    type Drawable = u32;

    fn create_container(&mut self) -> u32 {
        self.next += 1;
        self.created.push(self.next);
        self.children.insert(self.next, Vec::new());
        self.next
    }

    fn set_transform(&mut self, drawable: &u32, transform: Affine) {
        self.transforms.insert(*drawable, transform);
    }

    fn add_child(&mut self, container: &u32, child: &u32) {
        self.children.entry(*container).or_default().push(*child);
    }

    fn release(&mut self, drawable: &u32) {
        self.released.push(*drawable);
        self.children.remove(drawable);
        for mounted in self.children.values_mut() {
            mounted.retain(|d| d != drawable);
        }
    }
}

type Gate = OneShot<Result<Option<u32>, LoadError>>;

/// A leaf whose load step waits until the returned gate fires.
pub(crate) struct Deferred {
    build: Option<u32>,
    pending: Option<Listener<Result<Option<u32>, LoadError>>>,
}

impl Deferred {
    pub(crate) fn new() -> (Self, Gate) {
        Self::with_build(None)
    }

    pub(crate) fn with_build(build: Option<u32>) -> (Self, Gate) {
        let gate = Gate::new();
        let kind = Self {
            build,
            pending: Some(gate.listen()),
        };
        (kind, gate)
    }
}

impl NodeKind<RecordingBackend> for Deferred {
    fn build(&mut self, _: &mut RecordingBackend) -> Option<u32> {
        self.build
    }

    fn create(&mut self) -> LoadFuture<u32> {
        match self.pending.take() {
            Some(listener) => Box::pin(listener),
            None => Box::pin(ready(Err(LoadError::failed("load step restarted")))),
        }
    }
}

/// A leaf with a synchronously available drawable.
pub(crate) struct SyncLeaf(pub(crate) u32);

impl NodeKind<RecordingBackend> for SyncLeaf {
    fn build(&mut self, _: &mut RecordingBackend) -> Option<u32> {
        Some(self.0)
    }
}

/// A group kind counting its destroy hook invocations.
pub(crate) struct Counted {
    destroyed: Rc<Cell<u32>>,
}

impl Counted {
    pub(crate) fn new(counter: &Rc<Cell<u32>>) -> Self {
        Self {
            destroyed: Rc::clone(counter),
        }
    }
}

impl NodeKind<RecordingBackend> for Counted {
    fn destroy(&mut self, _: &mut RecordingBackend) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}
