//! Tagged coordinate and rectangle value types

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Point2, Vec2};

/// Coordinate space a [`Coord`] or [`Rect`] is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordSpace {
    /// Node-local units, before the node's own transform
    Local,
    /// Units of the parent node's local space
    Parent,
    /// Root space
    #[default]
    World,
    /// Camera-relative world units
    View,
    /// Viewport pixels
    Screen,
    /// Overlay pixels, not affected by the camera
    Ui,
}

impl CoordSpace {
    /// Whether one unit in this space is one device pixel
    pub fn is_pixel_space(self) -> bool {
        matches!(self, Self::Screen | Self::Ui)
    }
}

/// A point tagged with its coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Space the components are expressed in
    pub space: CoordSpace,
}

impl Coord {
    /// Create a coordinate in the given space
    pub fn new(x: f64, y: f64, space: CoordSpace) -> Self {
        Self { x, y, space }
    }

    /// Create a world-space coordinate
    pub fn world(x: f64, y: f64) -> Self {
        Self::new(x, y, CoordSpace::World)
    }

    /// Create a screen-space coordinate
    pub fn screen(x: f64, y: f64) -> Self {
        Self::new(x, y, CoordSpace::Screen)
    }

    /// Create a node-local coordinate
    pub fn local(x: f64, y: f64) -> Self {
        Self::new(x, y, CoordSpace::Local)
    }

    /// Components as a point
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Build from a point, tagging it with `space`
    pub fn from_point(p: Point2, space: CoordSpace) -> Self {
        Self::new(p.x, p.y, space)
    }
}

/// Axis-aligned rectangle: `(x, y)` is the minimum corner, `w`/`h` the extent.
///
/// With a Y-up world the minimum corner is the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum X
    pub x: f64,
    /// Minimum Y
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
    /// Space the rectangle is expressed in
    #[serde(default)]
    pub space: CoordSpace,
}

impl Rect {
    /// Create a rectangle in the given space
    pub fn new(x: f64, y: f64, w: f64, h: f64, space: CoordSpace) -> Self {
        Self { x, y, w, h, space }
    }

    /// Create a world-space rectangle
    pub fn world(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, w, h, CoordSpace::World)
    }

    /// Create a node-local rectangle
    pub fn local(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, w, h, CoordSpace::Local)
    }

    /// Rectangle of size `w`x`h` centred on `center`
    pub fn centered(center: Vec2, w: f64, h: f64, space: CoordSpace) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h, space)
    }

    /// Smallest rectangle containing every point; `None` for an empty slice
    pub fn bounding(points: &[Point2], space: CoordSpace) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y, space))
    }

    /// Left edge
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge (minimum Y)
    pub fn bottom(&self) -> f64 {
        self.y
    }

    /// Top edge (maximum Y)
    pub fn top(&self) -> f64 {
        self.y + self.h
    }

    /// Centre point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// The four corners, counter-clockwise from the minimum corner
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.left(), self.bottom()),
            Point2::new(self.right(), self.bottom()),
            Point2::new(self.right(), self.top()),
            Point2::new(self.left(), self.top()),
        ]
    }

    /// Flip negative extents so `w` and `h` are non-negative
    #[must_use]
    pub fn normalized(self) -> Self {
        let (x, w) = if self.w < 0.0 { (self.x + self.w, -self.w) } else { (self.x, self.w) };
        let (y, h) = if self.h < 0.0 { (self.y + self.h, -self.h) } else { (self.y, self.h) };
        Self::new(x, y, w, h, self.space)
    }

    /// Inclusive separating-axis overlap test; touching edges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.right() < other.left()
            || other.right() < self.left()
            || self.top() < other.bottom()
            || other.top() < self.bottom())
    }

    /// Whether `p` lies inside or on the boundary
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.bottom() && p.y <= self.top()
    }
}
