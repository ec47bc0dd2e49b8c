// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node hierarchy core for scene graphs with deferred asset loading.
//!
//! `arbor_core` manages a tree of nodes, each wrapping a drawable owned by an
//! external rendering backend. Children are attached synchronously but become
//! visible only once their payload has loaded, so a node is never shown
//! before it is ready, never has two parents, and releases its backend
//! resources exactly once. The crate is `no_std` compatible (with `alloc`)
//! and stores nodes in struct-of-arrays slots addressed by generational
//! handles.
//!
//! # Architecture
//!
//! ```text
//!   NodeTree::create_node() ──► NodeId
//!                                  │
//!   NodeTree::add(parent, child) ──┤ link + start load step
//!                                  │
//!          drawable present? ──yes─┼──► Backend::add_child (mount now)
//!                  │ no            │
//!                  ▼               │
//!   NodeTree::poll_loads() ──► load resolves ──► mount if still attached
//!                                  │
//!   NodeTree::remove(parent, child) ──► unlink + destroy subtree
//!                                        └─► NodeKind::destroy, Backend::release
//! ```
//!
//! **[`node`]**: The [`NodeTree`](node::NodeTree) arena, the attach/detach
//! protocol and the load driver.
//!
//! **[`kind`]**: The [`NodeKind`](kind::NodeKind) capability trait with the
//! overridable load (`create`) and teardown (`destroy`) hooks.
//!
//! **[`signal`]**: [`OneShot`](signal::OneShot), the single-fire notification
//! channel behind each node's `loaded` event.
//!
//! **[`backend`]**: The [`Backend`](backend::Backend) trait that rendering
//! libraries implement to host node drawables.
//!
//! **[`geom`]**: [`Position`](geom::Position) and the placement utility.
//!
//! **[`config`]**: [`TreeConfig`](config::TreeConfig).
//!
//! **[`error`]**: [`TreeError`](error::TreeError) and
//! [`LoadError`](error::LoadError).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and lifecycle event
//! types, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod error;
pub mod geom;
pub mod kind;
pub mod node;
pub mod signal;
pub mod trace;

#[cfg(test)]
mod test_backend;
