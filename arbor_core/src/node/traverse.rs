// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use crate::backend::Backend;

use super::id::{INVALID, NodeId};
use super::tree::NodeTree;

/// An iterator over the direct children of a node, in attachment order.
///
/// Created by [`NodeTree::children`].
pub struct Children<'a, B: Backend> {
    tree: &'a NodeTree<B>,
    current: u32,
}

impl<B: Backend> core::fmt::Debug for Children<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Children")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a, B: Backend> Children<'a, B> {
    pub(crate) fn new(tree: &'a NodeTree<B>, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl<B: Backend> Iterator for Children<'_, B> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator over a subtree in depth-first pre-order, starting at its root.
///
/// Created by [`NodeTree::descendants`].
pub struct Descendants<'a, B: Backend> {
    tree: &'a NodeTree<B>,
    root: u32,
    current: u32,
}

impl<B: Backend> core::fmt::Debug for Descendants<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Descendants")
            .field("root", &self.root)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a, B: Backend> Descendants<'a, B> {
    pub(crate) fn new(tree: &'a NodeTree<B>, root: u32) -> Self {
        Self {
            tree,
            root,
            current: root,
        }
    }
}

impl<B: Backend> Iterator for Descendants<'_, B> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.preorder_next(idx, self.root);
        Some(self.tree.id_at(idx))
    }
}
