//! Coordinate spaces, the 2D camera and conversions between them
//!
//! ```text
//! Local --(node world matrix)--> World --(camera)--> Screen
//!                                  ^                   |
//!                                  +----(inverse)------+
//! ```

mod geometry;
mod camera;
mod convert;

pub use geometry::{Coord, CoordSpace, Rect};
pub use camera::{Camera2D, YAxis};
pub use convert::{
    local_to_world, pixel_snap, screen_rect_to_world, screen_to_world, snap_rect, world_rect_to_screen,
    world_to_screen,
};
