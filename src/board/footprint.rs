//! Footprints and their pads.
//!
//! A footprint stores pads in footprint-local coordinates. Absolute pad
//! positions are derived on demand from the footprint position and
//! orientation, so moving or rotating a footprint moves its pads with it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::primitives::{Layer, NetCode};
use crate::geometry::{decidegrees_to_radians, radians_to_decidegrees, Point};

/// A named pad on a footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad name (e.g. "1", "2").
    pub name: String,

    /// Offset from the footprint origin in mm, unrotated.
    pub offset: Point,

    /// Pad size (width, height) in mm.
    #[serde(default)]
    pub size: Point,

    /// Net the pad is connected to.
    #[serde(default)]
    pub net: NetCode,
}

impl Pad {
    /// Creates an unconnected pad.
    #[must_use]
    pub fn new(name: impl Into<String>, offset: Point, size: Point) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
            net: NetCode::UNCONNECTED,
        }
    }
}

/// A pad resolved to its absolute board position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPad<'a> {
    /// Pad name.
    pub name: &'a str,
    /// Absolute pad position.
    pub position: Point,
    /// Net the pad is connected to.
    pub net: NetCode,
}

/// A component footprint, either a library prototype or an instance on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Instance identity.
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,

    /// Reference designator (e.g. "D12").
    #[serde(default)]
    pub reference: String,

    /// Library footprint name this instance was created from.
    pub footprint: String,

    /// Absolute position of the footprint origin.
    #[serde(default)]
    pub position: Point,

    /// Orientation in tenths of a degree.
    #[serde(default)]
    pub orientation: f64,

    /// Side of the board the footprint is mounted on.
    #[serde(default)]
    pub layer: Layer,

    /// Whether the reference designator is shown on the silkscreen.
    #[serde(default = "default_true")]
    pub reference_visible: bool,

    /// Pads in prototype order.
    #[serde(default)]
    pub pads: Vec<Pad>,
}

const fn default_true() -> bool {
    true
}

impl Footprint {
    /// Creates an empty footprint prototype.
    #[must_use]
    pub fn new(footprint: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            reference: String::new(),
            footprint: footprint.into(),
            position: Point::ORIGIN,
            orientation: 0.0,
            layer: Layer::FrontCopper,
            reference_visible: true,
            pads: Vec::new(),
        }
    }

    /// Adds a pad to the footprint.
    pub fn add_pad(&mut self, pad: Pad) {
        self.pads.push(pad);
    }

    /// Creates a new instance of this prototype with a fresh identity.
    #[must_use]
    pub fn instantiate(&self, reference: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            reference: reference.into(),
            ..self.clone()
        }
    }

    /// Orientation in radians.
    #[must_use]
    pub fn orientation_radians(&self) -> f64 {
        decidegrees_to_radians(self.orientation)
    }

    /// Sets the orientation from radians.
    pub fn set_orientation_radians(&mut self, radians: f64) {
        self.orientation = radians_to_decidegrees(radians);
    }

    /// Absolute position of `pad` for the current placement.
    #[must_use]
    pub fn pad_position(&self, pad: &Pad) -> Point {
        self.position
            .translated(pad.offset.board_rotated(self.orientation_radians()))
    }

    /// Iterates the pads at their absolute positions, in prototype order.
    pub fn pads(&self) -> impl Iterator<Item = PlacedPad<'_>> {
        self.pads.iter().map(|pad| PlacedPad {
            name: &pad.name,
            position: self.pad_position(pad),
            net: pad.net,
        })
    }

    /// Finds the first pad with the given name.
    #[must_use]
    pub fn pad(&self, name: &str) -> Option<PlacedPad<'_>> {
        self.pads().find(|pad| pad.name == name)
    }

    /// Assigns `net` to every pad named `name`, returning how many matched.
    pub fn set_pad_net(&mut self, name: &str, net: NetCode) -> usize {
        let mut count = 0;
        for pad in self.pads.iter_mut().filter(|p| p.name == name) {
            pad.net = net;
            count += 1;
        }
        count
    }
}
