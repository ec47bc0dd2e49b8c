// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless backend for arbor.
//!
//! This crate hosts node drawables in memory instead of a renderer:
//!
//! - [`HeadlessBackend`]: a [`Backend`] that tracks containers, mounted
//!   children, transforms and releases
//! - [`Sprite`] and [`RemoteSprite`]: leaf kinds with synchronous and
//!   deferred drawables
//!
//! It is meant for tests, tooling and server-side runs where the tree's
//! structure matters but nothing is drawn.

mod kinds;
mod scene;

pub use arbor_core::backend::Backend;
pub use kinds::{RemoteSprite, Sprite};
pub use scene::{DrawableId, ElementKind, HeadlessBackend};
