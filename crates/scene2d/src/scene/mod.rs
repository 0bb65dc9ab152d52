//! Transform hierarchy, world preparation and visibility culling
//!
//! ## Frame flow
//!
//! ```text
//! setters on Transform2D (game logic)
//!      ↓
//! prepare_world_all (parent-before-child world matrices)
//!      ↓
//! Culler::collect (AABB vs view rect, nearest first)
//!      ↓
//! renderer
//! ```

mod node;
mod tree;
mod prepare;
mod cull;
pub mod stats;

pub use node::{NodeId, NodeTransform};
pub use tree::{SceneError, SceneTree};
pub use prepare::prepare_world_all;
pub use cull::Culler;
pub use stats::FrameStats;
