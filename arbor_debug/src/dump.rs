// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text outline of a node tree.
//!
//! Each node is one line, indented two spaces per level:
//!
//! ```text
//! 0.0 group (0, 0) Ready
//!   1.0 group (10, 20) Ready mounted
//!     2.0 leaf Loading pending
//! ```

use std::fmt::Write;

use arbor_core::backend::Backend;
use arbor_core::node::{LoadState, MountState, NodeId, NodeTree};

/// Returns an outline of every root of `tree` and its subtree.
#[must_use]
pub fn dump<B: Backend>(tree: &NodeTree<B>) -> String {
    let mut out = String::new();
    for root in tree.roots() {
        write_subtree(tree, root, 0, &mut out);
    }
    out
}

/// Returns an outline of the subtree rooted at `root`.
///
/// A stale handle yields an empty string.
#[must_use]
pub fn dump_subtree<B: Backend>(tree: &NodeTree<B>, root: NodeId) -> String {
    let mut out = String::new();
    if tree.is_alive(root) {
        write_subtree(tree, root, 0, &mut out);
    }
    out
}

fn write_subtree<B: Backend>(tree: &NodeTree<B>, id: NodeId, depth: usize, out: &mut String) {
    write_line(tree, id, depth, out);
    for child in tree.children(id) {
        write_subtree(tree, child, depth + 1, out);
    }
}

fn write_line<B: Backend>(tree: &NodeTree<B>, id: NodeId, depth: usize, out: &mut String) {
    let _ = write!(
        out,
        "{:indent$}{}.{}",
        "",
        id.index(),
        id.generation(),
        indent = depth * 2
    );
    if tree.container(id).is_some() {
        out.push_str(" group");
        if let Some(position) = tree.position(id) {
            let _ = write!(out, " ({}, {})", position.x(), position.y());
        }
    } else {
        out.push_str(" leaf");
    }
    if let Some(state) = tree.load_state(id) {
        out.push_str(match state {
            LoadState::Idle => " Idle",
            LoadState::Loading => " Loading",
            LoadState::Ready => " Ready",
            LoadState::Failed => " Failed",
        });
    }
    match tree.mount_state(id) {
        Some(MountState::Mounted { .. }) => out.push_str(" mounted"),
        Some(MountState::Pending { .. }) => out.push_str(" pending"),
        Some(MountState::Unmounted) | None => {}
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use arbor_backend_headless::{HeadlessBackend, RemoteSprite, Sprite};
    use arbor_core::error::LoadError;
    use arbor_core::geom::Position;
    use arbor_core::signal::OneShot;

    use super::*;

    #[test]
    fn outlines_nested_nodes() {
        let backend = HeadlessBackend::new();
        let mut tree = NodeTree::new(backend.clone());
        let root = tree.create_node(Position::ZERO);
        let group = tree.create_node(Position::new(10.0, 20.0));
        let sprite = tree.create_leaf(Sprite::new("tree"));
        let gate = OneShot::<Result<String, LoadError>>::new();
        let remote = tree.create_leaf(RemoteSprite::new(&backend, gate.listen()));
        tree.add(root, group).unwrap();
        tree.add(group, sprite).unwrap();
        tree.add(group, remote).unwrap();

        assert_eq!(
            dump(&tree),
            "0.0 group (0, 0) Idle\n\
             \x20 1.0 group (10, 20) Loading mounted\n\
             \x20   2.0 leaf Loading mounted\n\
             \x20   3.0 leaf Loading pending\n"
        );
    }

    #[test]
    fn stale_subtree_is_empty() {
        let mut tree = NodeTree::new(HeadlessBackend::new());
        let root = tree.create_node(Position::ZERO);
        tree.destroy(root).unwrap();
        assert_eq!(dump_subtree(&tree, root), "");
        assert_eq!(dump(&tree), "");
    }
}
