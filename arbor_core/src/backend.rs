// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for rendering integrations.
//!
//! The node tree never draws anything itself. Every visual handle it manages
//! belongs to a rendering library that implements [`Backend`]:
//!
//! - **Containers** are drawables that can hold other drawables. Each group
//!   node owns exactly one, created at construction and released at
//!   destruction.
//! - **Drawables** are whatever the backend renders (sprites, meshes, text,
//!   containers). Leaf nodes obtain theirs from their
//!   [`NodeKind`](crate::kind::NodeKind).
//!
//! The tree relies on four operations only: create a container, place a
//! drawable, add a drawable to a container, and release a drawable. How the
//! backend composites, orders or culls its drawables is its own business.
//!
//! # Handles
//!
//! [`Backend::Drawable`] is a cheap handle (an index, a reference-counted
//! pointer, a DOM node). The tree clones it freely and compares handles to
//! detect double assignment, so equality must mean identity.

use core::fmt::Debug;

use kurbo::Affine;

/// A rendering library hosting node drawables.
///
/// Both the headless recording backend and real GPU or DOM backends
/// implement this trait, enabling generic trees and test doubles.
pub trait Backend {
    /// Handle to a backend drawable.
    type Drawable: Clone + PartialEq + Debug + 'static;

    /// Allocates a new empty container.
    fn create_container(&mut self) -> Self::Drawable;

    /// Applies a local placement to `drawable`.
    fn set_transform(&mut self, drawable: &Self::Drawable, transform: Affine);

    /// Appends `child` to the drawables rendered by `container`.
    fn add_child(&mut self, container: &Self::Drawable, child: &Self::Drawable);

    /// Releases `drawable`.
    ///
    /// The drawable is detached from whatever container currently holds it.
    /// Drawables mounted inside it are detached as well, but remain owned by
    /// whoever created them.
    fn release(&mut self, drawable: &Self::Drawable);
}
