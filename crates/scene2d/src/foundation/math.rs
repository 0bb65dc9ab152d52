//! Math utilities and types
//!
//! Provides the 2D affine math used by the transform hierarchy. Matrices are
//! 3x3 homogeneous transforms whose last row is `[0, 0, 1]`; the translation
//! lives in the third column (`m13`, `m23`).

use serde::{Deserialize, Serialize};
use std::fmt;

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f64>;

/// 3x3 affine matrix type
pub type Mat3 = Matrix3<f64>;

/// Pure affine helpers. Every function returns a fresh value; nothing is cached here.
pub mod affine {
    use super::{Mat3, Point2, Vec2};

    /// Identity matrix
    pub fn identity() -> Mat3 {
        Mat3::identity()
    }

    /// Compose two transforms: the result applies `b` first, then `a`.
    ///
    /// `a` is the outer (parent) transform.
    pub fn multiply(a: &Mat3, b: &Mat3) -> Mat3 {
        let mut out = Mat3::zeros();
        for row in 0..3 {
            for col in 0..3 {
                out[(row, col)] = a[(row, 0)] * b[(0, col)]
                    + a[(row, 1)] * b[(1, col)]
                    + a[(row, 2)] * b[(2, col)];
            }
        }
        out
    }

    /// Apply an affine matrix to a point
    pub fn apply_to_point(m: &Mat3, p: Point2) -> Point2 {
        Point2::new(
            m.m11 * p.x + m.m12 * p.y + m.m13,
            m.m21 * p.x + m.m22 * p.y + m.m23,
        )
    }

    /// Build a local matrix from position, rotation, scale, shear and origin.
    ///
    /// The linear block is `R(rotation) * K(shear) * S(scale)` with
    /// `K = [[1, shx], [shy, 1]]`. The translation is chosen so that `origin`
    /// (the pivot, in local units) lands on `pos`.
    pub fn from_transform(pos: Vec2, rotation: f64, scale: Vec2, shear: Vec2, origin: Vec2) -> Mat3 {
        let (sin, cos) = rotation.sin_cos();

        // K * S
        let ks11 = scale.x;
        let ks12 = shear.x * scale.y;
        let ks21 = shear.y * scale.x;
        let ks22 = scale.y;

        // R * (K * S)
        let a = cos * ks11 - sin * ks21;
        let b = cos * ks12 - sin * ks22;
        let c = sin * ks11 + cos * ks21;
        let d = sin * ks12 + cos * ks22;

        let tx = pos.x - (a * origin.x + b * origin.y);
        let ty = pos.y - (c * origin.x + d * origin.y);

        Mat3::new(
            a, b, tx,
            c, d, ty,
            0.0, 0.0, 1.0,
        )
    }

    /// Translation component of an affine matrix
    pub fn translation(m: &Mat3) -> Vec2 {
        Vec2::new(m.m13, m.m23)
    }
}

/// Swappable strategy for the hot matrix operations.
///
/// The transform hierarchy routes every parent/child composition and every
/// bounding-box corner transform through a kernel, so a batched implementation
/// can be selected at configuration time without touching the traversal code.
pub trait MatrixKernel: fmt::Debug + Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Compose `a` after `b`
    fn multiply(&self, a: &Mat3, b: &Mat3) -> Mat3;

    /// Transform a single point
    fn apply_to_point(&self, m: &Mat3, p: Point2) -> Point2;

    /// Transform a batch of points in place
    fn apply_to_points(&self, m: &Mat3, points: &mut [Point2]) {
        for p in points.iter_mut() {
            *p = self.apply_to_point(m, *p);
        }
    }
}

/// Default kernel: plain element-wise arithmetic, one point at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl MatrixKernel for ScalarKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn multiply(&self, a: &Mat3, b: &Mat3) -> Mat3 {
        affine::multiply(a, b)
    }

    fn apply_to_point(&self, m: &Mat3, p: Point2) -> Point2 {
        affine::apply_to_point(m, p)
    }
}

/// Batched kernel: packs points into a `3xN` matrix and transforms the whole
/// batch with a single nalgebra product.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedKernel;

impl MatrixKernel for BatchedKernel {
    fn name(&self) -> &'static str {
        "batched"
    }

    fn multiply(&self, a: &Mat3, b: &Mat3) -> Mat3 {
        a * b
    }

    fn apply_to_point(&self, m: &Mat3, p: Point2) -> Point2 {
        m.transform_point(&p)
    }

    fn apply_to_points(&self, m: &Mat3, points: &mut [Point2]) {
        if points.is_empty() {
            return;
        }
        let packed = nalgebra::Matrix3xX::from_fn(points.len(), |row, col| match row {
            0 => points[col].x,
            1 => points[col].y,
            _ => 1.0,
        });
        let out = m * packed;
        for (col, p) in points.iter_mut().enumerate() {
            *p = Point2::new(out[(0, col)], out[(1, col)]);
        }
    }
}

/// Which [`MatrixKernel`] a world is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KernelKind {
    /// [`ScalarKernel`]
    #[default]
    Scalar,
    /// [`BatchedKernel`]
    Batched,
}

impl KernelKind {
    /// Instantiate the selected kernel
    pub fn create(self) -> Box<dyn MatrixKernel> {
        match self {
            Self::Scalar => Box::new(ScalarKernel),
            Self::Batched => Box::new(BatchedKernel),
        }
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees.to_radians()
    }

    /// Squared distance between two points
    pub fn distance_squared(a: super::Vec2, b: super::Vec2) -> f64 {
        (a - b).norm_squared()
    }
}
