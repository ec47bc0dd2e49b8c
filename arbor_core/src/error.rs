// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Structural errors ([`TreeError`]) are returned synchronously and always
//! before the tree is mutated. Load errors ([`LoadError`]) are delivered
//! through the node's readiness signal to every listener.

use alloc::string::String;

use thiserror::Error;

use crate::node::NodeId;

/// A structural operation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle refers to a node that was destroyed.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
    /// The node has no container and cannot hold children.
    #[error("{0:?} has no container and cannot hold children")]
    NotAContainer(NodeId),
    /// The child is already attached elsewhere.
    #[error("{child:?} already has a parent ({parent:?})")]
    AlreadyParented {
        /// The node that was being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Attaching would make a node its own ancestor.
    #[error("cannot attach {child:?} under its own descendant {parent:?}")]
    WouldCycle {
        /// The requested parent.
        parent: NodeId,
        /// The node that was being attached.
        child: NodeId,
    },
}

/// A node's load step did not produce a ready node.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The load step itself failed.
    #[error("load step failed: {0}")]
    Failed(String),
    /// The node was destroyed before its load step resolved.
    #[error("node was destroyed before it finished loading")]
    Destroyed,
}

impl LoadError {
    /// Creates a [`LoadError::Failed`] from any message.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_nodes() {
        let child = NodeId {
            idx: 3,
            generation: 1,
        };
        let parent = NodeId {
            idx: 0,
            generation: 0,
        };
        let msg = TreeError::AlreadyParented { child, parent }.to_string();
        assert!(msg.contains("NodeId(3@gen1)"), "got: {msg}");
        assert!(msg.contains("NodeId(0@gen0)"), "got: {msg}");
    }

    #[test]
    fn failed_carries_reason() {
        assert_eq!(
            LoadError::failed("404").to_string(),
            "load step failed: 404"
        );
    }
}
