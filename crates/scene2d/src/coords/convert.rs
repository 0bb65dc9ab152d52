//! Conversions between local, world and screen space, and pixel snapping

use crate::coords::camera::{Camera2D, YAxis};
use crate::coords::geometry::{Coord, CoordSpace, Rect};
use crate::foundation::math::{affine, Mat3, Point2};
use crate::scene::{FrameStats, NodeId, SceneError, SceneTree};

/// Map a point in `node`'s local space to world space.
///
/// Resolves the node's world matrix lazily, so it is correct even between
/// preparation passes.
pub fn local_to_world(tree: &mut SceneTree, node: NodeId, coord: Coord, stats: &mut FrameStats) -> Result<Coord, SceneError> {
    let world = tree.world_matrix(node, stats)?;
    let p = tree.kernel().apply_to_point(&world, coord.point());
    Ok(Coord::from_point(p, CoordSpace::World))
}

/// World coordinate to screen pixels
pub fn world_to_screen(camera: &Camera2D, coord: Coord, y_axis: YAxis) -> Coord {
    let p = affine::apply_to_point(&camera.world_to_screen_matrix(y_axis), coord.point());
    Coord::from_point(p, CoordSpace::Screen)
}

/// Screen pixels to world coordinate; the exact inverse of [`world_to_screen`]
pub fn screen_to_world(camera: &Camera2D, coord: Coord, y_axis: YAxis) -> Coord {
    let p = affine::apply_to_point(&camera.screen_to_world_matrix(y_axis), coord.point());
    Coord::from_point(p, CoordSpace::World)
}

/// Snap so the coordinate lands on a whole device pixel.
///
/// Pixel spaces (screen, UI) round to the nearest integer; every other space
/// rounds to the nearest multiple of `1 / zoom`.
pub fn pixel_snap(coord: Coord, zoom: f64) -> Coord {
    if coord.space.is_pixel_space() {
        Coord::new(coord.x.round(), coord.y.round(), coord.space)
    } else {
        Coord::new((coord.x * zoom).round() / zoom, (coord.y * zoom).round() / zoom, coord.space)
    }
}

/// Screen rectangle to the world-space box around it
pub fn screen_rect_to_world(camera: &Camera2D, rect: Rect, y_axis: YAxis) -> Rect {
    map_rect(&camera.screen_to_world_matrix(y_axis), rect, CoordSpace::World)
}

/// World rectangle to the screen-space box around it
pub fn world_rect_to_screen(camera: &Camera2D, rect: Rect, y_axis: YAxis) -> Rect {
    map_rect(&camera.world_to_screen_matrix(y_axis), rect, CoordSpace::Screen)
}

/// Snap both corners with [`pixel_snap`]; width and height stay non-negative
pub fn snap_rect(rect: Rect, zoom: f64) -> Rect {
    let min = pixel_snap(Coord::new(rect.left(), rect.bottom(), rect.space), zoom);
    let max = pixel_snap(Coord::new(rect.right(), rect.top(), rect.space), zoom);
    Rect::new(min.x, min.y, max.x - min.x, max.y - min.y, rect.space).normalized()
}

fn map_rect(m: &Mat3, rect: Rect, space: CoordSpace) -> Rect {
    let corners: [Point2; 4] = rect.normalized().corners().map(|c| affine::apply_to_point(m, c));
    Rect::bounding(&corners, space).unwrap_or_default()
}
