//! Hit testing: point → node lookup.
//!
//! Reverse-walks the draw tree (front-to-back) to find which node is at a
//! given canvas pixel.

use crate::tree::DrawTree;
use collage_core::{ObjectId, VisualShape};
use kurbo::Point;

/// Find the topmost node at canvas pixel `screen`.
/// Returns `None` if no node is hit (background).
pub fn hit_test(tree: &DrawTree, screen: Point) -> Option<ObjectId> {
    let content = tree.view.to_content(screen);

    // last painted = topmost
    tree.nodes.iter().rev().find_map(|node| {
        let local = node.affine.inverse() * content;
        node.geometry.contains_local(local).then_some(node.id)
    })
}
