//! Scene node: a transform plus local bounds, linked into the arena tree

use slotmap::new_key_type;

use crate::coords::Rect;
use crate::transform::Transform2D;
use crate::world::ObjectId;

new_key_type! {
    /// Handle to a node in a [`SceneTree`](super::SceneTree).
    ///
    /// Generational: a handle to a removed node never resolves to a node
    /// allocated later in the same slot.
    pub struct NodeId;
}

/// A node of the transform hierarchy.
///
/// The parent owns its children through the arena; `parent` is a plain handle
/// and never keeps a node alive.
#[derive(Debug, Clone)]
pub struct NodeTransform {
    /// Local transform
    pub transform: Transform2D,
    /// Bounds in the node's local space
    pub local_rect: Rect,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) object: Option<ObjectId>,
}

impl NodeTransform {
    /// Unattached node with the given transform and bounds
    pub fn new(transform: Transform2D, local_rect: Rect) -> Self {
        Self {
            transform,
            local_rect,
            parent: None,
            children: Vec::new(),
            object: None,
        }
    }

    /// Builder pattern: bind to an external object id
    #[must_use]
    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    /// Parent handle; `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// External object this node mirrors, if any
    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::new(Transform2D::default(), Rect::local(0.0, 0.0, 0.0, 0.0))
    }
}
