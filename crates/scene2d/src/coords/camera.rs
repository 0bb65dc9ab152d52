//! # 2D Camera
//!
//! The camera is owned by the caller (game or renderer) and only read by this
//! crate. It never stores derived matrices; conversions are computed on demand.

use serde::{Deserialize, Serialize};

use crate::coords::geometry::{CoordSpace, Rect};
use crate::foundation::math::{affine, Mat3, Vec2};

/// Which way world +Y points on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YAxis {
    /// World +Y is screen-up; screen Y grows downwards so it is flipped
    #[default]
    Up,
    /// World +Y is screen-down; no flip
    Down,
}

impl YAxis {
    /// Sign applied to Y when going from view units to screen pixels
    pub fn screen_sign(self) -> f64 {
        match self {
            Self::Up => -1.0,
            Self::Down => 1.0,
        }
    }
}

/// Orthographic 2D camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera2D {
    /// Centre of the view in world space
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise
    pub rotation: f64,
    /// Pixels per world unit; expected to be `> 0`
    pub zoom: f64,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl Camera2D {
    /// Camera at `position` with zoom 1 and no rotation
    pub fn new(position: Vec2, viewport: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            zoom: 1.0,
            viewport,
        }
    }

    /// Builder pattern: set zoom
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Builder pattern: set rotation in radians
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        log::trace!("Camera2D position updated to: {:?}", position);
    }

    /// Visible extent in world units (`viewport / zoom`)
    pub fn view_size(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    /// World-space rectangle covered by the viewport.
    ///
    /// For a rotated camera this is the axis-aligned box around the rotated
    /// view, so it may be larger than what is actually on screen.
    pub fn view_rect(&self) -> Rect {
        let size = self.view_size();
        let unrotated = Rect::centered(self.position, size.x, size.y, CoordSpace::World);
        if self.rotation == 0.0 {
            return unrotated;
        }
        let spin = affine::from_transform(self.position, self.rotation, Vec2::new(1.0, 1.0), Vec2::zeros(), self.position);
        let corners = unrotated.corners().map(|c| affine::apply_to_point(&spin, c));
        Rect::bounding(&corners, CoordSpace::World).unwrap_or(unrotated)
    }

    /// Matrix taking world coordinates to screen pixels
    pub fn world_to_screen_matrix(&self, y_axis: YAxis) -> Mat3 {
        let (sin, cos) = (-self.rotation).sin_cos();
        let sx = self.zoom;
        let sy = self.zoom * y_axis.screen_sign();
        // screen = S * R(-rot) * (world - pos) + viewport / 2
        let a = sx * cos;
        let b = -sx * sin;
        let c = sy * sin;
        let d = sy * cos;
        let center = self.viewport * 0.5;
        let tx = center.x - (a * self.position.x + b * self.position.y);
        let ty = center.y - (c * self.position.x + d * self.position.y);
        Mat3::new(
            a, b, tx,
            c, d, ty,
            0.0, 0.0, 1.0,
        )
    }

    /// Matrix taking screen pixels back to world coordinates
    pub fn screen_to_world_matrix(&self, y_axis: YAxis) -> Mat3 {
        let (sin, cos) = self.rotation.sin_cos();
        let inv_x = 1.0 / self.zoom;
        let inv_y = y_axis.screen_sign() / self.zoom;
        // world = R(rot) * S^-1 * (screen - viewport / 2) + pos
        let a = cos * inv_x;
        let b = -sin * inv_y;
        let c = sin * inv_x;
        let d = cos * inv_y;
        let center = self.viewport * 0.5;
        let tx = self.position.x - (a * center.x + b * center.y);
        let ty = self.position.y - (c * center.x + d * center.y);
        Mat3::new(
            a, b, tx,
            c, d, ty,
            0.0, 0.0, 1.0,
        )
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(Vec2::zeros(), Vec2::new(1280.0, 720.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_rect_centered_on_camera() {
        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));
        assert_eq!(camera.view_rect(), Rect::world(-50.0, -50.0, 100.0, 100.0));
    }

    #[test]
    fn test_view_rect_scales_with_zoom() {
        let camera = Camera2D::new(Vec2::new(10.0, 20.0), Vec2::new(200.0, 100.0)).with_zoom(2.0);
        let rect = camera.view_rect();
        assert_relative_eq!(rect.w, 100.0);
        assert_relative_eq!(rect.h, 50.0);
        assert_relative_eq!(rect.x, -40.0);
        assert_relative_eq!(rect.y, -5.0);
    }

    #[test]
    fn test_rotated_view_rect_contains_unrotated_corners() {
        let camera = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 50.0)).with_rotation(std::f64::consts::FRAC_PI_4);
        let rect = camera.view_rect();
        let extent = 150.0 / 2.0f64.sqrt();
        assert_relative_eq!(rect.w, extent, epsilon = 1e-9);
        assert_relative_eq!(rect.h, extent, epsilon = 1e-9);
        assert_relative_eq!(rect.center().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(rect.center().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matrices_are_inverse() {
        let camera = Camera2D::new(Vec2::new(3.0, -7.0), Vec2::new(640.0, 480.0))
            .with_zoom(2.5)
            .with_rotation(0.6);
        for y_axis in [YAxis::Up, YAxis::Down] {
            let product = camera.screen_to_world_matrix(y_axis) * camera.world_to_screen_matrix(y_axis);
            assert_relative_eq!(product, Mat3::identity(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_zoom_view_rect() {
        let base = Camera2D::new(Vec2::zeros(), Vec2::new(100.0, 100.0));

        let zero = base.with_zoom(0.0).view_rect();
        assert!(zero.w.is_infinite() && zero.h.is_infinite());

        let negative = base.with_zoom(-1.0).view_rect();
        assert_relative_eq!(negative.w, -100.0);
        assert_relative_eq!(negative.x, 50.0);

        // Rotated path goes through the corner box and must not panic either
        let spun = base.with_zoom(0.0).with_rotation(0.3).view_rect();
        assert_eq!(spun.space, CoordSpace::World);
    }
}
