//! Camera visibility culling
//!
//! Axis-aligned only: every node is reduced to the bounding box of its
//! transformed local rect and tested against the camera's world-space view
//! rectangle. The boxes are conservative, so a node that is on screen is never
//! rejected; a rotated node near the edge may be kept when it is not.

use crate::coords::{Camera2D, Rect};
use crate::foundation::math::{affine, utils, Point2};
use crate::scene::node::NodeId;
use crate::scene::stats::FrameStats;
use crate::scene::tree::SceneTree;
use crate::transform::ParentWorld;

/// Collects the nodes of a tree that overlap a camera's view
#[derive(Debug, Clone, Copy)]
pub struct Culler<'a> {
    camera: &'a Camera2D,
    view: Rect,
}

impl<'a> Culler<'a> {
    /// Culler for `camera`; the view rectangle is computed once here
    pub fn new(camera: &'a Camera2D) -> Self {
        Self {
            camera,
            view: camera.view_rect(),
        }
    }

    /// World-space view rectangle
    pub fn view_rect(&self) -> Rect {
        self.view
    }

    /// Camera being culled against
    pub fn camera(&self) -> &Camera2D {
        self.camera
    }

    /// Visible nodes under `start`, nearest to the camera first.
    ///
    /// The tree root is a bounds-less container: when `start` is the root it
    /// is not tested and its children are at depth 1. Children of rejected
    /// nodes are still visited because a child may extend past its parent.
    /// Run world preparation first in the same frame; this pass composes
    /// against whatever parent matrices it resolves along the way.
    pub fn collect(&self, tree: &mut SceneTree, start: NodeId, stats: &mut FrameStats) -> Vec<NodeId> {
        stats.reset_culling();
        if !tree.contains(start) {
            log::warn!("Culling requested from unknown node {:?}", start);
            return Vec::new();
        }

        let mut visible: Vec<(NodeId, f64)> = Vec::new();
        let mut stack: Vec<(NodeId, usize, Option<ParentWorld>)> = Vec::new();

        if start == tree.root() {
            tree.resolve_world(start, None, stats);
            let parent = tree.get(start).map(|n| n.transform.as_parent());
            stack.extend(tree.children(start).iter().rev().map(|&c| (c, 1, parent)));
        } else {
            let parent = match tree.parent(start) {
                Some(p) if tree.world_matrix(p, stats).is_ok() => tree.get(p).map(|n| n.transform.as_parent()),
                _ => None,
            };
            stack.push((start, 0, parent));
        }

        while let Some((id, depth, parent)) = stack.pop() {
            stats.culling_tested += 1;
            stats.max_depth = stats.max_depth.max(depth);

            let world = tree.resolve_world(id, parent.as_ref(), stats);
            let aabb = tree.aabb_with_matrix(id, &world);

            if aabb.overlaps(&self.view) {
                stats.culling_drawn += 1;
                let pivot = tree.get(id).map_or_else(Point2::origin, |n| Point2::from(n.transform.origin()));
                let position = affine::apply_to_point(&world, pivot).coords;
                visible.push((id, utils::distance_squared(position, self.camera.position)));
            } else {
                stats.culling_rejected += 1;
                log::trace!("Culled {:?} with bounds {:?}", id, aabb);
            }

            if let Some(node) = tree.get(id) {
                let resolved = node.transform.as_parent();
                stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1, Some(resolved))));
            }
        }

        // Stable: equal distances keep traversal order
        visible.sort_by(|a, b| a.1.total_cmp(&b.1));

        stats.total_objects = stats.culling_tested;
        stats.visible_objects = visible.len();
        stats.culled_objects = stats.total_objects - stats.visible_objects;

        visible.into_iter().map(|(id, _)| id).collect()
    }
}
