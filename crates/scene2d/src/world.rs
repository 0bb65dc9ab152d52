//! Transform world - bridge between the object store and the renderer
//!
//! ```text
//! Object store (gameplay)
//!      ↓  register / update
//! TransformWorld (tree + stats + id map)
//!      ↓  prepare / visible
//! Renderer
//! ```
//!
//! The world only reads the objects it is handed; it never holds on to them.
//! All state that used to be process-wide (root, id map, statistics) lives in
//! the world value, so independent worlds can coexist.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::coords::{self, Camera2D, Coord, Rect};
use crate::foundation::math::{Mat3, Vec2};
use crate::scene::{prepare_world_all, Culler, FrameStats, NodeId, NodeTransform, SceneError, SceneTree};
use crate::transform::Transform2D;

/// Stable identifier of an object in the external store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of an external object
pub trait SceneObject {
    /// Stable id
    fn object_id(&self) -> ObjectId;

    /// Current position in its parent's space
    fn position(&self) -> Vec2;
}

/// Owned copy of one frame's visible set, safe to hand to another thread
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Visible objects nearest first, with their world matrices
    pub visible: Vec<(ObjectId, Mat3)>,
    /// Counters as of the cull that produced `visible`
    pub stats: FrameStats,
}

/// Registry binding external objects to nodes of a transform tree
#[derive(Debug)]
pub struct TransformWorld {
    config: WorldConfig,
    tree: SceneTree,
    stats: FrameStats,
    nodes: HashMap<ObjectId, NodeId>,
}

impl TransformWorld {
    /// Create a world with default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with custom configuration
    pub fn with_config(config: WorldConfig) -> Self {
        log::info!(
            "Creating transform world ({:?} kernel, y-axis {:?})",
            config.kernel,
            config.y_axis
        );
        let tree = SceneTree::with_capacity_and_kernel(config.initial_capacity, config.kernel.create());
        Self {
            nodes: HashMap::with_capacity(config.initial_capacity),
            config,
            tree,
            stats: FrameStats::default(),
        }
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The underlying tree
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Counters of the current frame
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no objects are registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node bound to `id`
    pub fn node_of(&self, id: ObjectId) -> Option<NodeId> {
        self.nodes.get(&id).copied()
    }

    /// Register `obj` with the configured default bounds.
    ///
    /// Registering an id twice updates the existing node instead of adding one.
    pub fn register(&mut self, obj: &impl SceneObject) -> NodeId {
        self.register_with_bounds(obj, self.config.default_bounds)
    }

    /// Register `obj` with explicit local bounds.
    ///
    /// For an already registered id the bounds and position are updated.
    pub fn register_with_bounds(&mut self, obj: &impl SceneObject, bounds: Rect) -> NodeId {
        let id = obj.object_id();
        if let Some(node_id) = self.node_of(id) {
            if let Some(node) = self.tree.get_mut(node_id) {
                node.local_rect = bounds;
                node.transform.set_pos(obj.position());
            }
            log::trace!("Object {} already registered, updated node {:?}", id, node_id);
            return node_id;
        }

        let node = NodeTransform::new(Transform2D::from_position(obj.position()), bounds).with_object(id);
        let node_id = self.tree.spawn_top_level(node);
        self.nodes.insert(id, node_id);
        log::debug!("Registered object {} as node {:?}", id, node_id);
        node_id
    }

    /// Detach `obj`'s node; its child nodes move to its parent
    pub fn unregister(&mut self, obj: &impl SceneObject) -> Option<NodeId> {
        self.unregister_id(obj.object_id())
    }

    /// Detach the node bound to `id`
    pub fn unregister_id(&mut self, id: ObjectId) -> Option<NodeId> {
        let node_id = self.nodes.remove(&id)?;
        if let Err(err) = self.tree.remove(node_id) {
            log::warn!("Object {} mapped to missing node {:?}: {}", id, node_id, err);
        } else {
            log::debug!("Unregistered object {} (node {:?})", id, node_id);
        }
        Some(node_id)
    }

    /// Copy `obj`'s position into its node; rotation and scale are left alone
    pub fn update(&mut self, obj: &impl SceneObject) -> Result<(), SceneError> {
        let id = obj.object_id();
        let transform = self.transform_mut(id).ok_or(SceneError::UnknownObject(id))?;
        transform.set_pos(obj.position());
        Ok(())
    }

    /// Mutable access to the transform of a registered object
    pub fn transform_mut(&mut self, id: ObjectId) -> Option<&mut Transform2D> {
        let node_id = self.node_of(id)?;
        self.tree.transform_mut(node_id)
    }

    /// Replace the local bounds of a registered object
    pub fn set_bounds(&mut self, id: ObjectId, bounds: Rect) -> Result<(), SceneError> {
        let node_id = self.node_of(id).ok_or(SceneError::UnknownObject(id))?;
        let node = self.tree.get_mut(node_id).ok_or(SceneError::StaleNode(node_id))?;
        node.local_rect = bounds;
        Ok(())
    }

    /// Attach `child` under `parent`, or back under the root for `None`
    pub fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> Result<(), SceneError> {
        let child_node = self.node_of(child).ok_or(SceneError::UnknownObject(child))?;
        let parent_node = match parent {
            Some(p) => self.node_of(p).ok_or(SceneError::UnknownObject(p))?,
            None => self.tree.root(),
        };
        self.tree.add_child(parent_node, child_node)
    }

    /// Reset frame statistics and bring every world matrix up to date
    pub fn prepare(&mut self) {
        self.stats.reset();
        prepare_world_all(&mut self.tree, &mut self.stats);
    }

    /// Nodes overlapping `camera`'s view, nearest first.
    ///
    /// Call [`prepare`](Self::prepare) earlier in the same frame.
    pub fn visible(&mut self, camera: &Camera2D) -> Vec<NodeId> {
        let root = self.tree.root();
        let visible = Culler::new(camera).collect(&mut self.tree, root, &mut self.stats);
        if self.config.log_frame_stats {
            self.stats.log_summary();
        }
        visible
    }

    /// Like [`visible`](Self::visible) but mapped to object ids
    pub fn visible_objects(&mut self, camera: &Camera2D) -> Vec<ObjectId> {
        let visible = self.visible(camera);
        visible
            .into_iter()
            .filter_map(|node_id| self.tree.get(node_id).and_then(NodeTransform::object))
            .collect()
    }

    /// Cull and copy the result out so it can outlive this borrow
    pub fn snapshot(&mut self, camera: &Camera2D) -> FrameSnapshot {
        let visible = self.visible(camera);
        let visible = visible
            .into_iter()
            .filter_map(|node_id| {
                let node = self.tree.get(node_id)?;
                Some((node.object()?, *node.transform.cached_world()))
            })
            .collect();
        FrameSnapshot {
            visible,
            stats: self.stats,
        }
    }

    /// World matrix of a registered object, resolved lazily
    pub fn world_matrix(&mut self, id: ObjectId) -> Result<Mat3, SceneError> {
        let node_id = self.node_of(id).ok_or(SceneError::UnknownObject(id))?;
        self.tree.world_matrix(node_id, &mut self.stats)
    }

    /// World-space bounds of a registered object
    pub fn world_aabb(&mut self, id: ObjectId) -> Result<Rect, SceneError> {
        let node_id = self.node_of(id).ok_or(SceneError::UnknownObject(id))?;
        self.tree.world_aabb(node_id, &mut self.stats)
    }

    /// Map a point in `id`'s local space to world space
    pub fn local_to_world(&mut self, id: ObjectId, coord: Coord) -> Result<Coord, SceneError> {
        let node_id = self.node_of(id).ok_or(SceneError::UnknownObject(id))?;
        coords::local_to_world(&mut self.tree, node_id, coord, &mut self.stats)
    }

    /// World to screen using the configured up-axis
    pub fn world_to_screen(&self, camera: &Camera2D, coord: Coord) -> Coord {
        coords::world_to_screen(camera, coord, self.config.y_axis)
    }

    /// Screen to world using the configured up-axis
    pub fn screen_to_world(&self, camera: &Camera2D, coord: Coord) -> Coord {
        coords::screen_to_world(camera, coord, self.config.y_axis)
    }
}

impl Default for TransformWorld {
    fn default() -> Self {
        Self::new()
    }
}
