// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node variants and their lifecycle hooks.
//!
//! Every node in a [`NodeTree`](crate::node::NodeTree) carries a boxed
//! [`NodeKind`]. The tree drives the hooks; a kind never touches topology:
//!
//! 1. [`build`](NodeKind::build) runs once at construction of a leaf and may
//!    return a drawable that is available synchronously.
//! 2. [`create`](NodeKind::create) is the load step. It runs once, when the
//!    node is first attached (or explicitly loaded), and returns a future the
//!    tree polls cooperatively. Resolving with `Ok(Some(drawable))` supplies
//!    the node's drawable; resolving with `Ok(None)` means there is nothing
//!    more to wait for. A leaf that still has no drawable at that point fails
//!    to load.
//! 3. [`destroy`](NodeKind::destroy) runs once when the node is destroyed,
//!    before the tree releases the node's container or drawable.
//!
//! [`Plain`] is the kind of an ordinary group node: nothing to build, a load
//! step that resolves immediately, and no extra resources.

use alloc::boxed::Box;
use core::future::{Future, ready};
use core::pin::Pin;

use crate::backend::Backend;
use crate::error::LoadError;

/// The future returned by a node's load step.
pub type LoadFuture<D> = Pin<Box<dyn Future<Output = Result<Option<D>, LoadError>>>>;

/// Capability interface implemented by node variants.
///
/// All methods have default implementations, so a kind only overrides the
/// hooks it needs.
pub trait NodeKind<B: Backend> {
    /// Builds the drawable of a leaf node at construction, if it can be built
    /// without waiting.
    fn build(&mut self, backend: &mut B) -> Option<B::Drawable> {
        _ = backend;
        None
    }

    /// Starts the load step.
    ///
    /// Called at most once per node. The default resolves immediately without
    /// supplying a drawable.
    fn create(&mut self) -> LoadFuture<B::Drawable> {
        Box::pin(ready(Ok(None)))
    }

    /// Releases resources owned by the kind.
    ///
    /// Called exactly once, after all of the node's children were destroyed
    /// and before the tree releases the node's own drawable.
    fn destroy(&mut self, backend: &mut B) {
        _ = backend;
    }
}

/// The kind of an ordinary group node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Plain;

impl<B: Backend> NodeKind<B> for Plain {}
