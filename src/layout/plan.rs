//! Placement plan files.
//!
//! A plan is a JSON document listing the placement requests of one layout
//! run in order. Besides single pixels it supports straight lines and arcs
//! of evenly spaced pixels, which are expanded into individual requests
//! before placement starts.
//!
//! ```json
//! {
//!   "steps": [
//!     { "type": "line", "from": { "x": 0, "y": 0 }, "to": { "x": 20, "y": 0 }, "count": 5 },
//!     { "type": "discontinuity" },
//!     { "type": "arc", "center": { "x": 0, "y": 0 }, "radius": 15,
//!       "start_angle": 0, "sweep": 3.14159, "count": 8 },
//!     { "type": "pixel", "x": 0, "y": 30, "orientation": 1.5708, "allow_overlaps": false }
//!   ]
//! }
//! ```
//!
//! Coordinates are millimetres relative to the chain origin and angles are
//! radians.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{LayoutError, LayoutResult};
use crate::geometry::Point;

/// An ordered list of placement steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutPlan {
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum PlanStep {
    /// A single pixel.
    Pixel {
        /// X offset from the origin (mm).
        x: f64,
        /// Y offset from the origin (mm).
        y: f64,
        /// Orientation in radians.
        #[serde(default)]
        orientation: f64,
        /// Skip the overlap check.
        #[serde(default = "default_allow_overlaps")]
        allow_overlaps: bool,
    },
    /// Break the chain before the next pixel.
    Discontinuity,
    /// Pixels evenly spaced along a segment, both ends included.
    Line {
        /// First pixel position.
        from: Point,
        /// Last pixel position.
        to: Point,
        /// Number of pixels.
        count: usize,
        /// Skip the overlap check.
        #[serde(default = "default_allow_overlaps")]
        allow_overlaps: bool,
    },
    /// Pixels evenly spaced along a circular arc, both ends included.
    Arc {
        /// Arc centre.
        center: Point,
        /// Arc radius (mm).
        radius: f64,
        /// Angle of the first pixel (radians).
        start_angle: f64,
        /// Signed angular extent (radians).
        sweep: f64,
        /// Number of pixels.
        count: usize,
        /// Skip the overlap check.
        #[serde(default = "default_allow_overlaps")]
        allow_overlaps: bool,
    },
}

const fn default_allow_overlaps() -> bool {
    true
}

/// A single placement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    /// Position relative to the chain origin.
    pub point: Point,
    /// Orientation in radians.
    pub orientation: f64,
    /// Skip the overlap check.
    pub allow_overlaps: bool,
}

/// What the series placer is asked to do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainCommand {
    /// Place one pixel.
    Place(PlacementRequest),
    /// Break the chain.
    Discontinuity,
}

impl LayoutPlan {
    /// Reads a plan from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid plan.
    pub fn load(path: impl AsRef<Path>) -> LayoutResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LayoutError::PlanRead {
            path: path.to_path_buf(),
            source,
        })?;
        let plan: Self = serde_json::from_str(&contents).map_err(|source| LayoutError::PlanParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), steps = plan.steps.len(), "Loaded placement plan");
        Ok(plan)
    }

    /// Expands every step into individual chain commands.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidPlan`] for a step with no pixels, a
    /// multi-pixel line of zero length, or non-finite coordinates.
    pub fn commands(&self) -> LayoutResult<Vec<ChainCommand>> {
        let mut commands = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            expand(index, step, &mut commands)?;
        }
        Ok(commands)
    }
}

fn expand(index: usize, step: &PlanStep, out: &mut Vec<ChainCommand>) -> LayoutResult<()> {
    match *step {
        PlanStep::Pixel {
            x,
            y,
            orientation,
            allow_overlaps,
        } => {
            check_finite(index, &[x, y, orientation])?;
            out.push(place(Point::from_xy(x, y), orientation, allow_overlaps));
        }
        PlanStep::Discontinuity => out.push(ChainCommand::Discontinuity),
        PlanStep::Line {
            from,
            to,
            count,
            allow_overlaps,
        } => {
            check_finite(index, &[from.x, from.y, to.x, to.y])?;
            check_count(index, count)?;
            let direction = to - from;
            if count > 1 && direction.radius() == 0.0 {
                return Err(LayoutError::invalid_plan(
                    index,
                    format!("line of {count} pixels has zero length"),
                ));
            }
            // A lone pixel on a zero-length line has no direction to follow.
            let orientation = if direction.radius() == 0.0 {
                0.0
            } else {
                heading(direction)
            };
            for i in 0..count {
                let t = fraction(i, count);
                let point = Point::from_xy(from.x + direction.x * t, from.y + direction.y * t);
                out.push(place(point, orientation, allow_overlaps));
            }
        }
        PlanStep::Arc {
            center,
            radius,
            start_angle,
            sweep,
            count,
            allow_overlaps,
        } => {
            check_finite(index, &[center.x, center.y, radius, start_angle, sweep])?;
            check_count(index, count)?;
            if radius <= 0.0 {
                return Err(LayoutError::invalid_plan(
                    index,
                    format!("arc radius must be positive, got {radius}"),
                ));
            }
            if count > 1 && sweep == 0.0 {
                return Err(LayoutError::invalid_plan(
                    index,
                    format!("arc of {count} pixels has zero sweep"),
                ));
            }
            let winding = if sweep < 0.0 { -1.0 } else { 1.0 };
            for i in 0..count {
                let angle = start_angle + sweep * fraction(i, count);
                let point = center.polar_translated(radius, angle);
                let (sin, cos) = angle.sin_cos();
                let tangent = Point::from_xy(-sin * winding, cos * winding);
                out.push(place(point, heading(tangent), allow_overlaps));
            }
        }
    }
    Ok(())
}

const fn place(point: Point, orientation: f64, allow_overlaps: bool) -> ChainCommand {
    ChainCommand::Place(PlacementRequest {
        point,
        orientation,
        allow_overlaps,
    })
}

/// Position of pixel `i` of `count` along a path, in `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
fn fraction(i: usize, count: usize) -> f64 {
    if count < 2 {
        0.0
    } else {
        i as f64 / (count - 1) as f64
    }
}

/// Footprint orientation that points along `direction`.
///
/// Board Y grows downward while orientation is counter-clockwise as seen on
/// screen, so the Y component is mirrored before taking the angle.
#[must_use]
pub fn heading(direction: Point) -> f64 {
    Point::from_xy(direction.x, -direction.y).theta()
}

fn check_count(index: usize, count: usize) -> LayoutResult<()> {
    if count == 0 {
        return Err(LayoutError::invalid_plan(index, "count must be at least 1"));
    }
    Ok(())
}

fn check_finite(index: usize, values: &[f64]) -> LayoutResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LayoutError::invalid_plan(index, "coordinates must be finite"))
    }
}
