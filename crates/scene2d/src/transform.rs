//! Per-node local transform with cached local and world matrices
//!
//! The local matrix is rebuilt only when a setter touched one of the inputs.
//! The world matrix is rebuilt when the node itself changed or when the parent
//! matrix it was composed against has been rebuilt since (tracked by a
//! generation stamp), so moving a parent reaches children whose own caches
//! were clean.
//!
//! Stamps come from one increasing counter shared by every transform, so a
//! transform swapped in through `&mut` never repeats a stamp its children saw.

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::foundation::math::{affine, Mat3, MatrixKernel, Vec2};
use crate::scene::stats::FrameStats;

/// Last issued world generation; 0 is never issued
static GENERATION: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed) + 1
}

bitflags! {
    /// Which local inputs changed since the local matrix was last built
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// Position changed
        const POS = 1 << 0;
        /// Rotation changed
        const ROT = 1 << 1;
        /// Scale changed
        const SCALE = 1 << 2;
        /// Shear changed
        const SHEAR = 1 << 3;
        /// Origin (pivot) changed
        const ORIGIN = 1 << 4;
    }
}

/// A parent's resolved world matrix together with the generation it was built at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentWorld {
    /// Parent world matrix
    pub matrix: Mat3,
    /// Parent world generation
    pub generation: u64,
}

/// Local transform of a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2D {
    position: Vec2,
    rotation: f64,
    scale: Vec2,
    shear: Vec2,
    origin: Vec2,

    local: Mat3,
    world: Mat3,
    dirty: DirtyFlags,
    local_stale: bool,
    world_stale: bool,

    /// Fresh stamp every time `world` is rebuilt; 0 until the first build
    generation: u64,
    /// Parent generation `world` was composed against; `None` when built as a root
    parent_generation: Option<u64>,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            shear: Vec2::zeros(),
            origin: Vec2::zeros(),
            local: affine::identity(),
            world: affine::identity(),
            dirty: DirtyFlags::all(),
            local_stale: true,
            world_stale: true,
            generation: 0,
            parent_generation: None,
        }
    }
}

impl Transform2D {
    /// Identity transform with stale caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec2) -> Self {
        let mut transform = Self::default();
        transform.position = position;
        transform
    }

    /// Builder pattern: set rotation in radians
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rot(rotation);
        self
    }

    /// Builder pattern: set scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder pattern: set origin
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.set_origin(origin);
        self
    }

    /// Position in parent space
    pub fn pos(&self) -> Vec2 {
        self.position
    }

    /// Rotation in radians
    pub fn rot(&self) -> f64 {
        self.rotation
    }

    /// Scale factors
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Shear factors
    pub fn shear(&self) -> Vec2 {
        self.shear
    }

    /// Pivot in local units
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Set position
    pub fn set_pos(&mut self, position: Vec2) {
        self.position = position;
        self.touch(DirtyFlags::POS);
    }

    /// Set rotation in radians
    pub fn set_rot(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.touch(DirtyFlags::ROT);
    }

    /// Set scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.touch(DirtyFlags::SCALE);
    }

    /// Set shear
    pub fn set_shear(&mut self, shear: Vec2) {
        self.shear = shear;
        self.touch(DirtyFlags::SHEAR);
    }

    /// Set pivot
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        self.touch(DirtyFlags::ORIGIN);
    }

    fn touch(&mut self, flag: DirtyFlags) {
        self.dirty |= flag;
        self.local_stale = true;
        self.world_stale = true;
    }

    /// Force the world matrix to be rebuilt on next use (e.g. after reparenting)
    pub fn invalidate_world(&mut self) {
        self.world_stale = true;
    }

    /// Inputs changed since the last local rebuild
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Whether the local matrix needs rebuilding
    pub fn local_stale(&self) -> bool {
        self.local_stale
    }

    /// Whether the world matrix needs rebuilding regardless of the parent
    pub fn world_stale(&self) -> bool {
        self.world_stale
    }

    /// Current world generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last local matrix, without rebuilding
    pub fn cached_local(&self) -> &Mat3 {
        &self.local
    }

    /// Last world matrix, without rebuilding
    pub fn cached_world(&self) -> &Mat3 {
        &self.world
    }

    /// Last world matrix packaged for composing children
    pub fn as_parent(&self) -> ParentWorld {
        ParentWorld {
            matrix: self.world,
            generation: self.generation,
        }
    }

    /// Rebuild the local matrix if any input changed, then return it
    pub fn compute_local(&mut self) -> Mat3 {
        if self.local_stale {
            self.local = affine::from_transform(self.position, self.rotation, self.scale, self.shear, self.origin);
            self.local_stale = false;
            self.dirty = DirtyFlags::empty();
        }
        self.local
    }

    /// Rebuild the world matrix if this node or its parent changed, then return it.
    ///
    /// Every parent composition counts one matrix multiplication in `stats`.
    pub fn compute_world(&mut self, parent: Option<&ParentWorld>, kernel: &dyn MatrixKernel, stats: &mut FrameStats) -> Mat3 {
        let parent_generation = parent.map(|p| p.generation);
        if self.world_stale || self.parent_generation != parent_generation {
            let local = self.compute_local();
            self.world = match parent {
                None => local,
                Some(p) => {
                    stats.matrix_multiplications += 1;
                    kernel.multiply(&p.matrix, &local)
                }
            };
            self.parent_generation = parent_generation;
            self.world_stale = false;
            self.generation = next_generation();
        }
        self.world
    }
}
