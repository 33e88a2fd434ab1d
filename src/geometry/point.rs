//! Two-dimensional point type used for every board coordinate.
//!
//! Points are stored in Cartesian form (millimetres). The polar view
//! (`radius` / `theta`) is computed from the same storage, and writing one
//! polar component rewrites `x` and `y` while holding the other fixed.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::ops::{Add, Div, Sub};

use serde::{Deserialize, Serialize};

/// A point (or displacement vector) in board units.
///
/// Equality is exact Cartesian equality. Callers that need a tolerance
/// compare with [`Point::distance_to`] against their own threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in mm.
    pub x: f64,
    /// Y coordinate in mm.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a point from Cartesian coordinates.
    #[must_use]
    pub const fn from_xy(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a point from a radius and an angle in radians.
    #[must_use]
    pub fn from_polar(radius: f64, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            x: radius * cos,
            y: radius * sin,
        }
    }

    /// Distance from the origin.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle from the positive X axis, normalised to `[0, 2π)`.
    ///
    /// Points on the Y axis are special-cased: `x == 0` yields `π/2` when
    /// `y > 0` and `3π/2` otherwise, which includes the origin.
    #[must_use]
    pub fn theta(&self) -> f64 {
        if self.x == 0.0 {
            return if self.y > 0.0 { FRAC_PI_2 } else { 3.0 * FRAC_PI_2 };
        }
        let theta = self.y.atan2(self.x).rem_euclid(TAU);
        // rem_euclid can round a tiny negative angle up to exactly 2π
        if theta >= TAU {
            0.0
        } else {
            theta
        }
    }

    /// Rotates the point about the origin to `theta`, keeping its radius.
    pub fn set_theta(&mut self, theta: f64) {
        *self = Self::from_polar(self.radius(), theta);
    }

    /// Scales the point along its current direction to `radius`.
    ///
    /// The origin has direction `3π/2` (see [`Point::theta`]).
    pub fn set_radius(&mut self, radius: f64) {
        *self = Self::from_polar(radius, self.theta());
    }

    /// Moves the point by `vec`.
    pub fn translate(&mut self, vec: Self) {
        self.x += vec.x;
        self.y += vec.y;
    }

    /// Returns the point moved by `vec`.
    #[must_use]
    pub fn translated(self, vec: Self) -> Self {
        Self::from_xy(self.x + vec.x, self.y + vec.y)
    }

    /// Moves the point `distance` along the direction `angle`.
    pub fn polar_translate(&mut self, distance: f64, angle: f64) {
        self.translate(Self::from_polar(distance, angle));
    }

    /// Returns the point moved `distance` along the direction `angle`.
    #[must_use]
    pub fn polar_translated(self, distance: f64, angle: f64) -> Self {
        self.translated(Self::from_polar(distance, angle))
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(&self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) / 2.0
    }

    /// Rotates a footprint-local offset into board orientation.
    ///
    /// Board Y grows downward, so a positive `angle` turns counter-clockwise
    /// as seen on screen: `x' = x·cos + y·sin`, `y' = −x·sin + y·cos`.
    #[must_use]
    pub fn board_rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_xy(
            self.x.mul_add(cos, self.y * sin),
            self.y.mul_add(cos, -self.x * sin),
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::from_xy(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::from_xy(x, y)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.translated(rhs)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_xy(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self::from_xy(self.x / scalar, self.y / scalar)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Normalises an angle in radians to `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Converts radians to tenths of a degree, the board's orientation unit.
#[must_use]
pub fn radians_to_decidegrees(radians: f64) -> f64 {
    radians * 1800.0 / PI
}

/// Converts tenths of a degree to radians.
#[must_use]
pub fn decidegrees_to_radians(decidegrees: f64) -> f64 {
    decidegrees * PI / 1800.0
}
