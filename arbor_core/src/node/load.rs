// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load-step driver and readiness.
//!
//! Each node's load step (its [`NodeKind::create`](crate::kind::NodeKind::create)
//! future) is started once, when the node is first attached or explicitly
//! [loaded](NodeTree::load), and then polled cooperatively by
//! [`NodeTree::poll_loads`]. Nothing is polled inside `add`: structural
//! changes always complete before the first suspension point.
//!
//! When a load step resolves:
//!
//! 1. A drawable it supplied becomes the node's drawable. A leaf left
//!    without a drawable fails to load instead.
//! 2. A pending mount is carried out, but only if the node is still attached
//!    to the parent that requested it.
//! 3. The node's `loaded` signal fires, resolving every [`Ready`] future and
//!    running every [`on_loaded`](NodeTree::on_loaded) callback.
//!
//! A node destroyed while its load step is in flight has its `loaded` signal
//! fired with [`LoadError::Destroyed`] at destruction. The load step keeps
//! running until it resolves; whatever drawable it produces is then released
//! and never mounted.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::backend::Backend;
use crate::error::{LoadError, TreeError};
use crate::kind::LoadFuture;
use crate::signal::{Listener, OneShot};
use crate::trace::{LoadCompleteEvent, LoadStatus, MountSkippedEvent};

use super::id::NodeId;
use super::tree::NodeTree;

/// The payload of a node's `loaded` signal.
pub type LoadOutcome = Result<NodeId, LoadError>;

/// Progress of a node's load step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// The load step has not been started.
    Idle,
    /// The load step is in flight.
    Loading,
    /// The load step resolved successfully.
    Ready,
    /// The load step failed. The node stays attached.
    Failed,
}

/// Whether a node's drawable is part of its parent's container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MountState {
    /// Not mounted anywhere.
    Unmounted,
    /// Attached to `parent`, waiting for the load step to supply a drawable.
    Pending {
        /// The parent whose container will receive the drawable.
        parent: NodeId,
    },
    /// Mounted into the container of `parent`.
    Mounted {
        /// The parent whose container holds the drawable.
        parent: NodeId,
    },
}

pub(crate) struct PendingLoad<D> {
    pub(crate) node: NodeId,
    pub(crate) future: LoadFuture<D>,
}

/// A future resolving once a node has loaded and, if attached, is mounted.
///
/// Created by [`NodeTree::ready`]. It does not borrow the tree: the tree must
/// be driven separately (with [`NodeTree::poll_loads`] or
/// [`NodeTree::settle`]) for the future to make progress.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Ready {
    listener: Listener<LoadOutcome>,
}

impl Ready {
    /// Returns the outcome without waiting, if it is known.
    #[must_use]
    pub fn try_get(&self) -> Option<LoadOutcome> {
        self.listener.try_get()
    }
}

impl Future for Ready {
    type Output = LoadOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<LoadOutcome> {
        Pin::new(&mut self.listener).poll(cx)
    }
}

/// A future that drives every pending load step of a tree to completion.
///
/// Created by [`NodeTree::settle`].
#[must_use = "futures do nothing unless polled"]
pub struct Settle<'a, B: Backend> {
    tree: &'a mut NodeTree<B>,
}

impl<B: Backend> core::fmt::Debug for Settle<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Settle")
            .field("pending_loads", &self.tree.pending_loads())
            .finish()
    }
}

impl<B: Backend> Future for Settle<'_, B> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.get_mut().tree.poll_loads(cx)
    }
}

impl<B: Backend> NodeTree<B> {
    /// Starts the load step of a node that has not been attached.
    ///
    /// Scene roots have no parent to attach them, so their load step only
    /// runs once it is requested here. Does nothing if the load step has
    /// already started.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StaleNode`] if the node was destroyed.
    pub fn load(&mut self, id: NodeId) -> Result<(), TreeError> {
        let idx = self.slot(id)?;
        self.start_load(idx);
        Ok(())
    }

    /// Returns a future resolving to `Ok(id)` once the node has loaded and,
    /// if attached, has been mounted.
    ///
    /// Resolves to the load error if the load step fails, and to
    /// [`LoadError::Destroyed`] if the node is destroyed first (or already
    /// was).
    pub fn ready(&self, id: NodeId) -> Ready {
        let listener = match self.live_index(id) {
            Some(i) => self.loaded[i].listen(),
            None => {
                let gone = OneShot::new();
                gone.fire(Err(LoadError::Destroyed));
                gone.listen()
            }
        };
        Ready { listener }
    }

    /// Runs `callback` once, when the node's `loaded` signal fires.
    ///
    /// If the signal already fired, `callback` runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StaleNode`] if the node was destroyed.
    pub fn on_loaded(
        &self,
        id: NodeId,
        callback: impl FnOnce(&LoadOutcome) + 'static,
    ) -> Result<(), TreeError> {
        let idx = self.slot(id)?;
        self.loaded[idx as usize].subscribe_once(callback);
        Ok(())
    }

    /// Returns the number of load steps still in flight, including those of
    /// nodes destroyed while loading.
    #[must_use]
    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }

    /// Polls pending load steps and applies the ones that resolved.
    ///
    /// Each pending load is polled at most once per call, and no more than
    /// [`TreeConfig::poll_budget`](crate::config::TreeConfig::poll_budget)
    /// loads are polled in total, continuing round-robin where the previous
    /// call stopped. Returns `Poll::Ready(())` when no load is pending.
    pub fn poll_loads(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        let total = self.loads.len();
        let budget = self
            .config
            .poll_budget
            .unwrap_or(usize::MAX)
            .max(1)
            .min(total);

        let mut polled = 0;
        while polled < budget && !self.loads.is_empty() {
            if self.cursor >= self.loads.len() {
                self.cursor = 0;
            }
            let result = self.loads[self.cursor].future.as_mut().poll(cx);
            polled += 1;
            match result {
                Poll::Ready(result) => {
                    let done = self.loads.remove(self.cursor);
                    self.complete_load(done.node, result);
                }
                Poll::Pending => self.cursor += 1,
            }
        }

        if self.loads.is_empty() {
            self.cursor = 0;
            Poll::Ready(())
        } else {
            if budget < total {
                // Loads skipped for budget registered no waker, so ask to be
                // polled again.
                cx.waker().wake_by_ref();
            }
            Poll::Pending
        }
    }

    /// Returns a future that drives all pending load steps to completion.
    pub fn settle(&mut self) -> Settle<'_, B> {
        Settle { tree: self }
    }

    /// Starts the load step of `idx` unless it already started.
    pub(crate) fn start_load(&mut self, idx: u32) {
        let i = idx as usize;
        if self.load_state[i] != LoadState::Idle {
            return;
        }
        let Some(kind) = self.kind[i].as_mut() else {
            return;
        };
        let future = kind.create();
        self.load_state[i] = LoadState::Loading;
        let node = self.id_at(idx);
        self.loads.push(PendingLoad { node, future });
        log::trace!("started load step of {node:?}");
    }

    fn complete_load(&mut self, node: NodeId, result: Result<Option<B::Drawable>, LoadError>) {
        let Some(i) = self.live_index(node) else {
            if let Ok(Some(drawable)) = &result {
                self.backend.release(drawable);
            }
            log::debug!("load step of destroyed {node:?} resolved, payload discarded");
            self.tracer.load_complete(&LoadCompleteEvent {
                node,
                status: LoadStatus::Orphaned,
            });
            return;
        };

        let mount = self.mount[i];
        let drawable = match result {
            Ok(drawable) => drawable,
            Err(err) => return self.fail_load(i, node, mount, err),
        };
        if let Some(drawable) = drawable {
            if self.internal[i].is_some() {
                log::warn!("load step of {node:?} supplied a second drawable, releasing it");
                self.backend.release(&drawable);
            } else {
                self.internal[i] = Some(drawable);
            }
        }
        if self.internal[i].is_none() {
            // A leaf without a drawable can never be mounted.
            let err = LoadError::failed("load step supplied no drawable");
            return self.fail_load(i, node, mount, err);
        }

        self.load_state[i] = LoadState::Ready;
        log::trace!("load step of {node:?} resolved");
        self.tracer.load_complete(&LoadCompleteEvent {
            node,
            status: LoadStatus::Ready,
        });

        if let MountState::Pending { parent } = mount {
            self.mount[i] = MountState::Unmounted;
            if self.parent(node) == Some(parent) {
                self.mount_child(parent.idx, node.idx, true);
            } else {
                log::warn!("{node:?} is no longer attached to {parent:?}, not mounting");
                self.tracer.mount_skipped(&MountSkippedEvent {
                    parent,
                    child: node,
                });
            }
        }
        self.loaded[i].fire(Ok(node));
    }

    /// Marks the load step of live slot `i` as failed. The node stays
    /// attached and unmounted.
    fn fail_load(&mut self, i: usize, node: NodeId, mount: MountState, err: LoadError) {
        log::warn!("load step of {node:?} failed: {err}");
        self.load_state[i] = LoadState::Failed;
        if matches!(mount, MountState::Pending { .. }) {
            self.mount[i] = MountState::Unmounted;
        }
        self.tracer.load_complete(&LoadCompleteEvent {
            node,
            status: LoadStatus::Failed,
        });
        self.loaded[i].fire(Err(err));
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::task::Waker;

    use super::*;
    use crate::config::TreeConfig;
    use crate::geom::Position;
    use crate::kind::Plain;
    use crate::test_backend::{Deferred, RecordingBackend, SyncLeaf};

    fn tree() -> NodeTree<RecordingBackend> {
        NodeTree::new(RecordingBackend::default())
    }

    fn pump(tree: &mut NodeTree<RecordingBackend>) -> Poll<()> {
        let mut cx = Context::from_waker(Waker::noop());
        tree.poll_loads(&mut cx)
    }

    fn poll_ready(ready: &mut Ready) -> Poll<LoadOutcome> {
        let mut cx = Context::from_waker(Waker::noop());
        Pin::new(ready).poll(&mut cx)
    }

    #[test]
    fn plain_node_becomes_ready_after_pump() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let child = tree.create_node(Position::ZERO);
        tree.add(root, child).unwrap();

        let mut ready = tree.ready(child);
        assert_eq!(poll_ready(&mut ready), Poll::Pending);
        assert_eq!(tree.pending_loads(), 1);

        assert_eq!(pump(&mut tree), Poll::Ready(()));
        assert_eq!(tree.load_state(child), Some(LoadState::Ready));
        assert_eq!(poll_ready(&mut ready), Poll::Ready(Ok(child)));
        // The container was mounted at attach time and not a second time.
        let rc = *tree.container(root).unwrap();
        assert_eq!(tree.backend().children_of(rc).len(), 1);
    }

    #[test]
    fn deferred_child_mounts_only_when_loaded() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();
        let rc = *tree.container(root).unwrap();

        // Structurally attached, visually absent.
        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![child]);
        assert_eq!(
            tree.mount_state(child),
            Some(MountState::Pending { parent: root })
        );
        assert_eq!(pump(&mut tree), Poll::Pending);
        assert!(tree.backend().children_of(rc).is_empty());

        gate.fire(Ok(Some(500)));
        assert!(tree.backend().children_of(rc).is_empty());
        assert_eq!(pump(&mut tree), Poll::Ready(()));

        assert_eq!(tree.backend().children_of(rc), &[500]);
        assert_eq!(tree.internal(child), Some(&500));
        assert!(tree.is_mounted(child));

        // Further pumps never mount again.
        assert_eq!(pump(&mut tree), Poll::Ready(()));
        assert_eq!(tree.backend().children_of(rc), &[500]);
    }

    #[test]
    fn mount_happens_before_loaded_callbacks() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tree.on_loaded(child, move |outcome| sink.borrow_mut().push(outcome.clone()))
            .unwrap();

        gate.fire(Ok(Some(7)));
        let _ = pump(&mut tree);
        assert_eq!(*seen.borrow(), vec![Ok(child)]);
        assert!(tree.is_mounted(child));
    }

    #[test]
    fn removed_before_load_never_mounts() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();
        let mut ready = tree.ready(child);

        assert!(tree.remove(root, child));
        assert!(!tree.is_alive(child));
        assert_eq!(
            poll_ready(&mut ready),
            Poll::Ready(Err(LoadError::Destroyed))
        );
        // The load keeps running in the background.
        assert_eq!(tree.pending_loads(), 1);

        gate.fire(Ok(Some(900)));
        assert_eq!(pump(&mut tree), Poll::Ready(()));

        let rc = *tree.container(root).unwrap();
        assert!(tree.backend().children_of(rc).is_empty());
        assert_eq!(tree.backend().released, vec![900]);
    }

    #[test]
    fn stale_mount_is_skipped_after_slot_reuse() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();
        tree.remove(root, child);

        // A new node takes over the slot before the old load resolves.
        let newcomer = tree.create_leaf(SyncLeaf(42));
        assert_eq!(newcomer.index(), child.index());
        tree.add(root, newcomer).unwrap();

        gate.fire(Ok(Some(900)));
        let _ = pump(&mut tree);
        let rc = *tree.container(root).unwrap();
        assert_eq!(tree.backend().children_of(rc), &[42]);
        assert_eq!(tree.internal(newcomer), Some(&42));
    }

    #[test]
    fn load_failure_keeps_node_attached() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();
        let mut ready = tree.ready(child);

        gate.fire(Err(LoadError::failed("404")));
        let _ = pump(&mut tree);

        assert_eq!(
            poll_ready(&mut ready),
            Poll::Ready(Err(LoadError::failed("404")))
        );
        assert_eq!(tree.load_state(child), Some(LoadState::Failed));
        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.mount_state(child), Some(MountState::Unmounted));

        // Cleanup is the caller's decision.
        assert!(tree.remove(root, child));
    }

    #[test]
    fn leaf_without_drawable_fails_readiness() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let leaf = tree.create_leaf(Plain);
        tree.add(root, leaf).unwrap();
        let ready = tree.ready(leaf);

        assert_eq!(pump(&mut tree), Poll::Ready(()));

        assert_eq!(
            ready.try_get(),
            Some(Err(LoadError::failed("load step supplied no drawable")))
        );
        assert_eq!(tree.load_state(leaf), Some(LoadState::Failed));
        assert_eq!(tree.mount_state(leaf), Some(MountState::Unmounted));
        assert_eq!(tree.parent(leaf), Some(root));
    }

    #[test]
    fn removing_an_ancestor_cancels_deferred_mounts() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let mid = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let leaf = tree.create_leaf(kind);
        tree.add(root, mid).unwrap();
        tree.add(mid, leaf).unwrap();
        let rc = *tree.container(root).unwrap();
        let mid_container = *tree.container(mid).unwrap();

        assert!(tree.remove(root, mid));
        assert!(!tree.is_alive(leaf));

        gate.fire(Ok(Some(900)));
        assert_eq!(pump(&mut tree), Poll::Ready(()));

        assert!(tree.backend().children_of(rc).is_empty());
        assert!(tree.backend().children_of(mid_container).is_empty());
        assert_eq!(tree.backend().released, vec![mid_container, 900]);
    }

    #[test]
    fn second_drawable_is_released() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::with_build(Some(11));
        let child = tree.create_leaf(kind);
        tree.add(root, child).unwrap();

        gate.fire(Ok(Some(12)));
        let _ = pump(&mut tree);
        assert_eq!(tree.internal(child), Some(&11));
        assert_eq!(tree.backend().released, vec![12]);
    }

    #[test]
    fn load_starts_once() {
        let mut tree = tree();
        let a = tree.create_node(Position::ZERO);
        let b = tree.create_node(Position::ZERO);
        let (kind, gate) = Deferred::new();
        let child = tree.create_leaf(kind);

        tree.load(child).unwrap();
        tree.load(child).unwrap();
        assert_eq!(tree.pending_loads(), 1);

        // Attaching a node whose load is in flight does not restart it.
        tree.add(a, child).unwrap();
        assert_eq!(tree.pending_loads(), 1);
        assert!(tree.add(b, child).is_err());

        gate.fire(Ok(Some(3)));
        let _ = pump(&mut tree);
        let ac = *tree.container(a).unwrap();
        assert_eq!(tree.backend().children_of(ac), &[3]);
    }

    #[test]
    fn ready_on_stale_handle_resolves_destroyed() {
        let mut tree = tree();
        let id = tree.create_node(Position::ZERO);
        tree.destroy(id).unwrap();
        assert_eq!(tree.ready(id).try_get(), Some(Err(LoadError::Destroyed)));
        assert_eq!(
            tree.on_loaded(id, |_| {}),
            Err(TreeError::StaleNode(id))
        );
        assert_eq!(tree.load(id), Err(TreeError::StaleNode(id)));
    }

    #[test]
    fn poll_budget_round_robins() {
        let mut tree = NodeTree::with_config(RecordingBackend::default(), TreeConfig::frame_budgeted(1));
        let root = tree.create_node(Position::ZERO);
        let (k1, g1) = Deferred::new();
        let (k2, g2) = Deferred::new();
        let c1 = tree.create_leaf(k1);
        let c2 = tree.create_leaf(k2);
        tree.add(root, c1).unwrap();
        tree.add(root, c2).unwrap();
        g1.fire(Ok(Some(1)));
        g2.fire(Ok(Some(2)));

        assert_eq!(pump(&mut tree), Poll::Pending);
        assert_eq!(tree.pending_loads(), 1);
        assert_eq!(pump(&mut tree), Poll::Ready(()));
        assert!(tree.is_mounted(c1));
        assert!(tree.is_mounted(c2));
    }

    #[test]
    fn settle_drives_all_loads() {
        let mut tree = tree();
        let root = tree.create_node(Position::ZERO);
        for n in 0..3 {
            let child = tree.create_leaf(SyncLeaf(10 + n));
            tree.add(root, child).unwrap();
        }
        let mut cx = Context::from_waker(Waker::noop());
        let mut settle = tree.settle();
        assert_eq!(Pin::new(&mut settle).poll(&mut cx), Poll::Ready(()));
        assert_eq!(tree.pending_loads(), 0);
    }
}
