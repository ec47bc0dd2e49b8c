// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology and teardown.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::backend::Backend;
use crate::config::TreeConfig;
use crate::error::{LoadError, TreeError};
use crate::geom::{Position, assign_position};
use crate::kind::{NodeKind, Plain};
use crate::signal::OneShot;
use crate::trace::{AttachEvent, DestroyEvent, DetachEvent, MountEvent, TraceSink, Tracer};

use super::id::{INVALID, NodeId};
use super::load::{LoadOutcome, LoadState, MountState, PendingLoad};
use super::traverse::{Children, Descendants};

/// Struct-of-arrays storage for a forest of nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The tree owns its [`Backend`]; every container it creates is released
/// through that backend exactly once.
pub struct NodeTree<B: Backend> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Drawables --
    pub(crate) container: Vec<Option<B::Drawable>>,
    pub(crate) internal: Vec<Option<B::Drawable>>,
    pub(crate) position: Vec<Option<Position>>,

    // -- Lifecycle --
    pub(crate) kind: Vec<Option<Box<dyn NodeKind<B>>>>,
    pub(crate) load_state: Vec<LoadState>,
    pub(crate) mount: Vec<MountState>,
    pub(crate) loaded: Vec<OneShot<LoadOutcome>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Load driver --
    pub(crate) loads: Vec<PendingLoad<B::Drawable>>,
    pub(crate) cursor: usize,

    pub(crate) backend: B,
    pub(crate) config: TreeConfig,
    pub(crate) tracer: Tracer,
}

impl<B: Backend> core::fmt::Debug for NodeTree<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeTree")
            .field("slots", &self.len)
            .field("live", &self.len())
            .field("pending_loads", &self.loads.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> NodeTree<B> {
    /// Creates an empty tree with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, TreeConfig::default())
    }

    /// Creates an empty tree.
    #[must_use]
    pub fn with_config(backend: B, config: TreeConfig) -> Self {
        let cap = config.initial_capacity;
        Self {
            parent: Vec::with_capacity(cap),
            first_child: Vec::with_capacity(cap),
            next_sibling: Vec::with_capacity(cap),
            prev_sibling: Vec::with_capacity(cap),
            container: Vec::with_capacity(cap),
            internal: Vec::with_capacity(cap),
            position: Vec::with_capacity(cap),
            kind: Vec::with_capacity(cap),
            load_state: Vec::with_capacity(cap),
            mount: Vec::with_capacity(cap),
            loaded: Vec::with_capacity(cap),
            generation: Vec::with_capacity(cap),
            free_list: Vec::new(),
            len: 0,
            loads: Vec::new(),
            cursor: 0,
            backend,
            config,
            tracer: Tracer::none(),
        }
    }

    /// Routes lifecycle events to `sink`.
    ///
    /// Without the `trace` feature the sink is dropped and no events are
    /// emitted.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    // -- Construction API --

    /// Creates a group node with a fresh container placed at `position`.
    ///
    /// The node has no parent and no children. Its drawable is its container,
    /// so it can be mounted as soon as it is attached.
    pub fn create_node(&mut self, position: Position) -> NodeId {
        self.create_group(position, Plain)
    }

    /// Creates a group node whose lifecycle hooks are provided by `kind`.
    pub fn create_group<K: NodeKind<B> + 'static>(&mut self, position: Position, kind: K) -> NodeId {
        let container = self.backend.create_container();
        assign_position(&mut self.backend, &container, position);
        let id = self.alloc(
            Box::new(kind),
            Some(container.clone()),
            Some(container),
            Some(position),
        );
        log::debug!(
            "created group {id:?} at ({}, {})",
            position.x(),
            position.y()
        );
        id
    }

    /// Creates a leaf node.
    ///
    /// The leaf's drawable is whatever [`NodeKind::build`] returns; if that is
    /// `None`, the drawable is expected from the load step.
    pub fn create_leaf<K: NodeKind<B> + 'static>(&mut self, mut kind: K) -> NodeId {
        let internal = kind.build(&mut self.backend);
        let deferred = internal.is_none();
        let id = self.alloc(Box::new(kind), None, internal, None);
        log::debug!("created leaf {id:?} (deferred drawable: {deferred})");
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.live_index(id).is_some()
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns whether the tree holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Topology API --

    /// Attaches `child` as the last child of `parent`.
    ///
    /// The parent link and child list are updated before anything else, then
    /// the child's load step is started. If the child already has a drawable
    /// it is mounted into the parent's container before this returns;
    /// otherwise it is mounted when its load step resolves, provided it is
    /// still attached to `parent` at that point.
    ///
    /// Returns `child`, so calls can be chained while building a tree. Use
    /// [`ready`](Self::ready) to wait until the child is loaded and mounted.
    ///
    /// # Errors
    ///
    /// Nothing is mutated when an error is returned.
    ///
    /// - [`TreeError::StaleNode`] if either handle is stale.
    /// - [`TreeError::NotAContainer`] if `parent` is a leaf.
    /// - [`TreeError::AlreadyParented`] if `child` already has a parent.
    /// - [`TreeError::WouldCycle`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        let p = self.slot(parent)?;
        let c = self.slot(child)?;
        if self.container[p as usize].is_none() {
            return Err(TreeError::NotAContainer(parent));
        }
        let current = self.parent[c as usize];
        if current != INVALID {
            return Err(TreeError::AlreadyParented {
                child,
                parent: self.id_at(current),
            });
        }
        if self.is_ancestor_or_self(c, p) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.link_last(p, c);
        log::debug!("attached {child:?} under {parent:?}");
        self.tracer.attach(&AttachEvent { parent, child });

        self.start_load(c);

        if self.internal[c as usize].is_some() {
            self.mount_child(p, c, false);
        } else if self.load_state[c as usize] == LoadState::Loading {
            self.mount[c as usize] = MountState::Pending { parent };
        }
        Ok(child)
    }

    /// Detaches `child` from `parent` and destroys it with its subtree.
    ///
    /// Returns `false`, without side effects, if `child` is not currently a
    /// child of `parent` (including when either handle is stale).
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }

        self.unlink_from_parent(child.idx);
        log::debug!("removed {child:?} from {parent:?}");
        self.tracer.detach(&DetachEvent { parent, child });

        self.destroy_subtree(child.idx);
        true
    }

    /// Destroys a node and its subtree, detaching it from its parent first.
    ///
    /// This is how scene roots, which have no parent to `remove` them, are
    /// torn down.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StaleNode`] if the node was already destroyed.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), TreeError> {
        let idx = self.slot(id)?;
        let p = self.parent[idx as usize];
        if p != INVALID {
            let parent = self.id_at(p);
            self.unlink_from_parent(idx);
            self.tracer.detach(&DetachEvent { parent, child: id });
        }
        self.destroy_subtree(idx);
        Ok(())
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let i = self.live_index(id)?;
        let p = self.parent[i];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_, B> {
        let first = self.live_index(id).map_or(INVALID, |i| self.first_child[i]);
        Children::new(self, first)
    }

    /// Returns an iterator over `id` and all of its descendants, parents
    /// before children.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, B> {
        let root = if self.is_alive(id) { id.idx } else { INVALID };
        Descendants::new(self, root)
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && self.kind[idx as usize].is_some())
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the node's drawable, if it has one yet.
    #[must_use]
    pub fn internal(&self, id: NodeId) -> Option<&B::Drawable> {
        self.internal[self.live_index(id)?].as_ref()
    }

    /// Returns the node's container, if it is a live group.
    #[must_use]
    pub fn container(&self, id: NodeId) -> Option<&B::Drawable> {
        self.container[self.live_index(id)?].as_ref()
    }

    /// Returns the position a group was created at.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.position[self.live_index(id)?]
    }

    /// Returns the state of the node's load step.
    #[must_use]
    pub fn load_state(&self, id: NodeId) -> Option<LoadState> {
        Some(self.load_state[self.live_index(id)?])
    }

    /// Returns whether the node's drawable is mounted in its parent's
    /// container, or waiting to be.
    #[must_use]
    pub fn mount_state(&self, id: NodeId) -> Option<MountState> {
        Some(self.mount[self.live_index(id)?])
    }

    /// Returns whether the node's drawable is mounted in its parent's
    /// container.
    #[must_use]
    pub fn is_mounted(&self, id: NodeId) -> bool {
        matches!(self.mount_state(id), Some(MountState::Mounted { .. }))
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend mutably.
    ///
    /// Containers owned by the tree must not be released through this
    /// reference.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    // -- Internal helpers --

    /// Returns the handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn live_index(&self, id: NodeId) -> Option<usize> {
        let i = id.idx as usize;
        (id.idx < self.len && self.generation[i] == id.generation && self.kind[i].is_some())
            .then_some(i)
    }

    pub(crate) fn slot(&self, id: NodeId) -> Result<u32, TreeError> {
        match self.live_index(id) {
            Some(_) => Ok(id.idx),
            None => Err(TreeError::StaleNode(id)),
        }
    }

    fn alloc(
        &mut self,
        kind: Box<dyn NodeKind<B>>,
        container: Option<B::Drawable>,
        internal: Option<B::Drawable>,
        position: Option<Position>,
    ) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.container[i] = container;
            self.internal[i] = internal;
            self.position[i] = position;
            self.kind[i] = Some(kind);
            self.load_state[i] = LoadState::Idle;
            self.mount[i] = MountState::Unmounted;
            self.loaded[i] = OneShot::new();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.container.push(container);
            self.internal.push(internal);
            self.position.push(position);
            self.kind.push(Some(kind));
            self.load_state.push(LoadState::Idle);
            self.mount.push(MountState::Unmounted);
            self.loaded.push(OneShot::new());
            self.generation.push(0);
            idx
        };
        self.id_at(idx)
    }

    /// Returns whether `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor_or_self(&self, ancestor: u32, node: u32) -> bool {
        let mut cur = node;
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// Appends `c` to the child list of `p`.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Returns the slot after `idx` in a pre-order walk of the subtree at
    /// `root`, or [`INVALID`] when the walk is done.
    pub(crate) fn preorder_next(&self, idx: u32, root: u32) -> u32 {
        let first = self.first_child[idx as usize];
        if first != INVALID {
            return first;
        }
        let mut cur = idx;
        while cur != root {
            let next = self.next_sibling[cur as usize];
            if next != INVALID {
                return next;
            }
            cur = self.parent[cur as usize];
            if cur == INVALID {
                break;
            }
        }
        INVALID
    }

    /// Mounts the drawable of `c` into the container of `p`.
    pub(crate) fn mount_child(&mut self, p: u32, c: u32, deferred: bool) {
        let (Some(container), Some(drawable)) =
            (&self.container[p as usize], &self.internal[c as usize])
        else {
            return;
        };
        self.backend.add_child(container, drawable);

        let parent = self.id_at(p);
        let child = self.id_at(c);
        self.mount[c as usize] = MountState::Mounted { parent };
        log::trace!("mounted {child:?} into {parent:?} (deferred: {deferred})");
        self.tracer.mount(&MountEvent {
            parent,
            child,
            deferred,
        });
    }

    /// Destroys the detached subtree rooted at `root`, children first.
    fn destroy_subtree(&mut self, root: u32) {
        let mut order = Vec::new();
        let mut cur = root;
        while cur != INVALID {
            order.push(cur);
            cur = self.preorder_next(cur, root);
        }
        // Reversed pre-order visits every descendant before its ancestors.
        for &idx in order.iter().rev() {
            self.destroy_slot(idx);
        }
    }

    fn destroy_slot(&mut self, idx: u32) {
        let i = idx as usize;
        let id = self.id_at(idx);
        if self.parent[i] != INVALID {
            self.unlink_from_parent(idx);
        }
        debug_assert!(
            self.first_child[i] == INVALID,
            "children are destroyed before their parent"
        );

        if let Some(mut kind) = self.kind[i].take() {
            kind.destroy(&mut self.backend);
        }
        // A group's drawable is its container.
        match (self.container[i].take(), self.internal[i].take()) {
            (Some(container), _) => self.backend.release(&container),
            (None, Some(drawable)) => self.backend.release(&drawable),
            (None, None) => {}
        }

        let load_in_flight = self.load_state[i] == LoadState::Loading;
        self.position[i] = None;
        self.mount[i] = MountState::Unmounted;
        self.load_state[i] = LoadState::Idle;
        self.loaded[i].fire(Err(LoadError::Destroyed));

        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);

        log::debug!("destroyed {id:?} (load in flight: {load_in_flight})");
        self.tracer.destroy(&DestroyEvent {
            node: id,
            load_in_flight,
        });
    }
}
