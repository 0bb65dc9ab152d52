//! World preparation pass

use crate::scene::node::NodeId;
use crate::scene::stats::FrameStats;
use crate::scene::tree::SceneTree;
use crate::transform::ParentWorld;

/// Bring every world matrix in `tree` up to date.
///
/// Depth-first with an explicit stack: a node is popped only after its parent
/// has been resolved in this pass, so every child composes against its
/// parent's current matrix. Each visited node counts toward
/// `stats.nodes_updated`, whether or not its cache was rebuilt.
pub fn prepare_world_all(tree: &mut SceneTree, stats: &mut FrameStats) {
    let mut stack: Vec<(NodeId, Option<ParentWorld>)> = vec![(tree.root(), None)];

    while let Some((id, parent)) = stack.pop() {
        tree.resolve_world(id, parent.as_ref(), stats);
        stats.nodes_updated += 1;

        let Some(node) = tree.get(id) else { continue };
        let resolved = node.transform.as_parent();
        // Reverse so the first child is processed first
        stack.extend(node.children().iter().rev().map(|&child| (child, Some(resolved))));
    }

    log::trace!(
        "Prepared {} nodes with {} multiplications",
        stats.nodes_updated,
        stats.matrix_multiplications
    );
}
