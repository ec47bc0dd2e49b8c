// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tree data model.
//!
//! A *node* is an element of a scene tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child and sibling links forming an ordered tree.
//!   A node's presence in its parent's child list and its parent link are
//!   always updated together.
//! - A drawable handle owned by the [`Backend`](crate::backend::Backend).
//!   *Group* nodes own a container, created at construction, into which the
//!   drawables of their children are mounted. *Leaf* nodes have no container
//!   and obtain their drawable from their [`NodeKind`](crate::kind::NodeKind).
//! - A load state and a single-fire `loaded` signal.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! # Lifecycle
//!
//! ```text
//!   create ──► add ──► Loading ──► Ready ──► remove/destroy (terminal)
//!                         └──────► Failed ─┘
//! ```
//!
//! A child's drawable is mounted into its parent's container as soon as both
//! exist: immediately in [`add`](NodeTree::add) when the child already has a
//! drawable, otherwise when its load step resolves, and only if the child is
//! still attached to the same parent at that moment. Removing a node destroys
//! it together with its subtree; a destroyed node can never come back.
//!
//! # Stale handles
//!
//! Mutating operations report stale handles as
//! [`TreeError::StaleNode`](crate::error::TreeError::StaleNode). Queries
//! answer as if the node were absent: no parent, no children, not mounted.

mod id;
mod load;
mod traverse;
mod tree;

pub use id::{INVALID, NodeId};
pub use load::{LoadOutcome, LoadState, MountState, Ready, Settle};
pub use traverse::{Children, Descendants};
pub use tree::NodeTree;
