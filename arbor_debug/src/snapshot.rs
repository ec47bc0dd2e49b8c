// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of a node tree.
//!
//! [`to_json`] captures every root and its subtree as nested objects:
//!
//! ```json
//! {
//!   "live": 2,
//!   "pending_loads": 1,
//!   "roots": [
//!     {
//!       "index": 0, "generation": 0, "kind": "group",
//!       "position": [0.0, 0.0], "load": "Ready", "mount": "unmounted",
//!       "drawable": "Drawable(0)",
//!       "children": [ ... ]
//!     }
//!   ]
//! }
//! ```
//!
//! Drawables are rendered with their `Debug` representation.

use std::io::{self, Write};

use serde_json::{Value, json};

use arbor_core::backend::Backend;
use arbor_core::node::{MountState, NodeId, NodeTree};

/// Captures the structure and state of `tree`.
#[must_use]
pub fn to_json<B: Backend>(tree: &NodeTree<B>) -> Value {
    let roots: Vec<Value> = tree.roots().into_iter().map(|r| node(tree, r)).collect();
    json!({
        "live": tree.len(),
        "pending_loads": tree.pending_loads(),
        "roots": roots,
    })
}

/// Writes a pretty-printed snapshot of `tree` to `writer`.
pub fn write<B: Backend>(tree: &NodeTree<B>, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &to_json(tree))?;
    writeln!(writer)
}

fn node<B: Backend>(tree: &NodeTree<B>, id: NodeId) -> Value {
    let children: Vec<Value> = tree.children(id).map(|c| node(tree, c)).collect();
    let kind = if tree.container(id).is_some() {
        "group"
    } else {
        "leaf"
    };
    let mount = match tree.mount_state(id) {
        Some(MountState::Mounted { .. }) => "mounted",
        Some(MountState::Pending { .. }) => "pending",
        Some(MountState::Unmounted) | None => "unmounted",
    };
    json!({
        "index": id.index(),
        "generation": id.generation(),
        "kind": kind,
        "position": tree.position(id).map(|p| [p.x(), p.y()]),
        "load": tree.load_state(id).map(|s| format!("{s:?}")),
        "mount": mount,
        "drawable": tree.internal(id).map(|d| format!("{d:?}")),
        "children": children,
    })
}

#[cfg(test)]
mod tests {
    use arbor_backend_headless::{HeadlessBackend, Sprite};
    use arbor_core::geom::Position;

    use super::*;

    #[test]
    fn captures_nested_state() {
        let mut tree = NodeTree::new(HeadlessBackend::new());
        let root = tree.create_node(Position::new(5.0, 6.0));
        let leaf = tree.create_leaf(Sprite::new("a"));
        tree.add(root, leaf).unwrap();

        let snapshot = to_json(&tree);
        assert_eq!(snapshot["live"], 2);
        assert_eq!(snapshot["pending_loads"], 1);

        let root_json = &snapshot["roots"][0];
        assert_eq!(root_json["kind"], "group");
        assert_eq!(root_json["position"], json!([5.0, 6.0]));
        assert_eq!(root_json["load"], "Idle");
        assert_eq!(root_json["drawable"], "Drawable(0)");

        let leaf_json = &root_json["children"][0];
        assert_eq!(leaf_json["kind"], "leaf");
        assert_eq!(leaf_json["position"], Value::Null);
        assert_eq!(leaf_json["mount"], "mounted");
        assert_eq!(leaf_json["drawable"], "Drawable(1)");
    }

    #[test]
    fn write_emits_parseable_json() {
        let mut tree = NodeTree::new(HeadlessBackend::new());
        tree.create_node(Position::ZERO);

        let mut out = Vec::new();
        write(&tree, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, to_json(&tree));
    }
}
