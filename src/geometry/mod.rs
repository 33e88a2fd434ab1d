//! Planar geometry shared by the board model and the layout engine.

pub mod point;

pub use point::{decidegrees_to_radians, normalize_angle, radians_to_decidegrees, Point};
