//! # Scene2D
//!
//! Hierarchical 2D transforms and camera visibility culling for a renderer.
//!
//! ## Features
//!
//! - **Cached Transforms**: Local and world matrices rebuilt only when inputs change
//! - **Arena Hierarchy**: Parent/child links as handles, no reference cycles
//! - **Visibility Culling**: World-space AABBs against the camera view, nearest first
//! - **Coordinate Spaces**: Local, world and screen conversions with pixel snapping
//! - **Swappable Kernels**: Scalar or batched matrix math behind one trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene2d::prelude::*;
//!
//! struct Ship {
//!     id: u64,
//!     pos: Vec2,
//! }
//!
//! impl SceneObject for Ship {
//!     fn object_id(&self) -> ObjectId {
//!         ObjectId(self.id)
//!     }
//!
//!     fn position(&self) -> Vec2 {
//!         self.pos
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut world = TransformWorld::with_config(WorldConfig::default());
//!     let ship = Ship { id: 1, pos: Vec2::new(10.0, 0.0) };
//!     world.register(&ship);
//!
//!     let camera = Camera2D::new(Vec2::zeros(), Vec2::new(1280.0, 720.0));
//!     world.prepare();
//!     for id in world.visible_objects(&camera) {
//!         println!("draw {id}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod foundation;
pub mod coords;
pub mod transform;
pub mod scene;
pub mod config;
pub mod world;

pub use config::{Config, ConfigError, WorldConfig};
pub use world::{FrameSnapshot, ObjectId, SceneObject, TransformWorld};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, WorldConfig},
        coords::{Camera2D, Coord, CoordSpace, Rect, YAxis},
        foundation::math::{KernelKind, Mat3, MatrixKernel, Point2, Vec2},
        scene::{Culler, FrameStats, NodeId, NodeTransform, SceneError, SceneTree},
        transform::Transform2D,
        world::{FrameSnapshot, ObjectId, SceneObject, TransformWorld},
    };
}

#[cfg(test)]
mod tests;
