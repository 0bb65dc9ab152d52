//! Arena-backed transform hierarchy
//!
//! Nodes live in a [`SlotMap`]; parent/child links are [`NodeId`] handles.
//! Every structural change goes through the tree so the single-parent
//! invariant holds: a node is listed in exactly one child list, and the root
//! in none.

use slotmap::SlotMap;
use thiserror::Error;

use crate::coords::{CoordSpace, Rect};
use crate::foundation::math::{affine, Mat3, MatrixKernel, ScalarKernel};
use crate::scene::node::{NodeId, NodeTransform};
use crate::scene::stats::FrameStats;
use crate::transform::{ParentWorld, Transform2D};
use crate::world::ObjectId;

/// Structural misuse of the tree or registry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not resolve (never existed or already removed)
    #[error("Node {0:?} is not in the tree")]
    StaleNode(NodeId),

    /// The root was asked to be removed or reparented
    #[error("The root node cannot be removed or reparented")]
    RootMisuse,

    /// Attaching would make a node its own ancestor
    #[error("Cannot attach {child:?} under {parent:?}: it would create a cycle")]
    CycleDetected {
        /// Node being attached
        child: NodeId,
        /// Requested parent
        parent: NodeId,
    },

    /// External object id has no node
    #[error("Object {0} is not registered")]
    UnknownObject(ObjectId),
}

/// The transform hierarchy
#[derive(Debug)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, NodeTransform>,
    root: NodeId,
    kernel: Box<dyn MatrixKernel>,
}

impl SceneTree {
    /// Empty tree (root only) using the scalar kernel
    pub fn new() -> Self {
        Self::with_kernel(Box::new(ScalarKernel))
    }

    /// Empty tree using `kernel` for compositions and corner transforms
    pub fn with_kernel(kernel: Box<dyn MatrixKernel>) -> Self {
        Self::with_capacity_and_kernel(0, kernel)
    }

    /// Empty tree with room for `capacity` nodes besides the root
    pub fn with_capacity_and_kernel(capacity: usize, kernel: Box<dyn MatrixKernel>) -> Self {
        let mut nodes = SlotMap::with_capacity_and_key(capacity + 1);
        let root = nodes.insert(NodeTransform::default());
        log::debug!("Created scene tree with {} kernel", kernel.name());
        Self { nodes, root, kernel }
    }

    /// Root handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Active matrix kernel
    pub fn kernel(&self) -> &dyn MatrixKernel {
        self.kernel.as_ref()
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Whether `id` resolves
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&NodeTransform> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node.
    ///
    /// Links are not reachable through this; use [`add_child`](Self::add_child)
    /// and [`remove`](Self::remove) to restructure.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeTransform> {
        self.nodes.get_mut(id)
    }

    /// Mutably borrow a node's transform
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform2D> {
        self.nodes.get_mut(id).map(|n| &mut n.transform)
    }

    /// Parent of `id`; `None` for the root or a stale handle
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of `id`; empty for a stale handle
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate every node, root included, in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeTransform)> {
        self.nodes.iter()
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            depth += 1;
            node = self.nodes.get(parent)?;
        }
        Some(depth)
    }

    /// Whether `ancestor` is `node` or lies on its path to the root
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Insert `node` as the last child of `parent`
    pub fn spawn(&mut self, parent: NodeId, node: NodeTransform) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::StaleNode(parent));
        }
        Ok(self.insert_under(parent, node))
    }

    /// Insert `node` as the last child of the root
    pub fn spawn_top_level(&mut self, node: NodeTransform) -> NodeId {
        self.insert_under(self.root, node)
    }

    fn insert_under(&mut self, parent: NodeId, mut node: NodeTransform) -> NodeId {
        node.parent = Some(parent);
        node.children.clear();
        node.transform.invalidate_world();
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        log::trace!("Spawned node {:?} under {:?}", id, parent);
        id
    }

    /// Make `child` the last child of `parent`, detaching it from its current parent first.
    ///
    /// Re-adding a child to its current parent is a no-op. The moved subtree's
    /// world matrices are rebuilt on next use.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::StaleNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SceneError::StaleNode(child));
        }
        if child == self.root {
            return Err(SceneError::RootMisuse);
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {:?} under its own descendant {:?}", child, parent);
            return Err(SceneError::CycleDetected { child, parent });
        }

        let previous = self.nodes[child].parent;
        if previous == Some(parent) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.detach_from(previous, child);
        }

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.invalidate_world();
        log::trace!("Moved node {:?} from {:?} to {:?}", child, previous, parent);
        Ok(())
    }

    /// Remove `id` from the tree and return it.
    ///
    /// Its children are handed to its parent (appended, order kept) rather
    /// than removed with it.
    pub fn remove(&mut self, id: NodeId) -> Result<NodeTransform, SceneError> {
        if id == self.root {
            return Err(SceneError::RootMisuse);
        }
        let mut node = self.nodes.remove(id).ok_or(SceneError::StaleNode(id))?;

        // Every non-root node has a parent
        let parent = node.parent.unwrap_or(self.root);
        self.detach_from(parent, id);

        let orphans = std::mem::take(&mut node.children);
        for &orphan in &orphans {
            if let Some(child) = self.nodes.get_mut(orphan) {
                child.parent = Some(parent);
                child.transform.invalidate_world();
            }
        }
        if !orphans.is_empty() {
            log::debug!("Removed node {:?}; re-attached {} children to {:?}", id, orphans.len(), parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.extend(orphans);
        }

        node.parent = None;
        Ok(node)
    }

    fn detach_from(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
    }

    /// World matrix of `id`, resolving ancestors root-first.
    ///
    /// Usable outside the bulk preparation pass; cost grows with depth and
    /// only stale links are recomputed.
    pub fn world_matrix(&mut self, id: NodeId, stats: &mut FrameStats) -> Result<Mat3, SceneError> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::StaleNode(id));
        }
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            chain.push(node);
            cursor = self.nodes[node].parent;
        }

        let mut parent: Option<ParentWorld> = None;
        let mut world = affine::identity();
        for &node in chain.iter().rev() {
            world = self.resolve_world(node, parent.as_ref(), stats);
            parent = Some(self.nodes[node].transform.as_parent());
        }
        Ok(world)
    }

    /// World-space bounding box of `id`'s local rect.
    ///
    /// Conservative for rotated or sheared nodes: the box of the transformed
    /// corners contains the true silhouette.
    pub fn world_aabb(&mut self, id: NodeId, stats: &mut FrameStats) -> Result<Rect, SceneError> {
        let world = self.world_matrix(id, stats)?;
        Ok(self.aabb_with_matrix(id, &world))
    }

    /// Rebuild (if needed) and return `id`'s world matrix against a known parent.
    ///
    /// Callers guarantee `id` is live and `parent` is its parent's current world.
    pub(crate) fn resolve_world(&mut self, id: NodeId, parent: Option<&ParentWorld>, stats: &mut FrameStats) -> Mat3 {
        let kernel = self.kernel.as_ref();
        self.nodes[id].transform.compute_world(parent, kernel, stats)
    }

    /// Box of `id`'s local rect corners under `world`
    pub(crate) fn aabb_with_matrix(&self, id: NodeId, world: &Mat3) -> Rect {
        let local = self.nodes[id].local_rect;
        let mut corners = local.corners();
        self.kernel.apply_to_points(world, &mut corners);
        Rect::bounding(&corners, CoordSpace::World).unwrap_or_default()
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}
