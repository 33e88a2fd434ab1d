//! Board-level primitive types: layers, nets, copper tracks, vias and
//! graphic drawings.
//!
//! All coordinates are absolute board positions in mm.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;

/// Identifier of an electrical net.
///
/// Code `0` is the unconnected net, present on every board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetCode(pub u32);

impl NetCode {
    /// The unconnected net.
    pub const UNCONNECTED: Self = Self(0);

    /// Returns true for the unconnected net.
    #[must_use]
    pub const fn is_unconnected(self) -> bool {
        self.0 == 0
    }
}

/// A named electrical net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// Net code referenced by pads, tracks and vias.
    pub code: NetCode,
    /// Human-readable net name (e.g. "GND", "+5V").
    pub name: String,
}

/// A copper track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track identity.
    pub uuid: Uuid,
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Copper layer.
    pub layer: Layer,
    /// Track width in mm.
    pub width: f64,
    /// Net the track belongs to.
    #[serde(default)]
    pub net: NetCode,
}

impl Track {
    /// Creates a new track with a fresh identity.
    #[must_use]
    pub fn new(start: Point, end: Point, layer: Layer, width: f64, net: NetCode) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            start,
            end,
            layer,
            width,
            net,
        }
    }
}

/// A plated via joining two copper layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    /// Via identity.
    pub uuid: Uuid,
    /// Via centre.
    pub position: Point,
    /// Drill diameter in mm.
    pub drill: f64,
    /// Copper annular ring outer diameter in mm.
    pub diameter: f64,
    /// The pair of copper layers the via bridges.
    pub layers: (Layer, Layer),
    /// Net the via belongs to.
    #[serde(default)]
    pub net: NetCode,
}

impl Via {
    /// Creates a through via from front to back copper.
    #[must_use]
    pub fn new(position: Point, drill: f64, diameter: f64, net: NetCode) -> Self {
        Self::with_layers(position, drill, diameter, (Layer::FrontCopper, Layer::BackCopper), net)
    }

    /// Creates a via bridging an explicit layer pair.
    #[must_use]
    pub fn with_layers(
        position: Point,
        drill: f64,
        diameter: f64,
        layers: (Layer, Layer),
        net: NetCode,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            position,
            drill,
            diameter,
            layers,
            net,
        }
    }
}

/// A graphic (non-copper) drawing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drawing {
    /// Straight line segment.
    Segment {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Layer the line is drawn on.
        layer: Layer,
        /// Line width in mm.
        width: f64,
    },
    /// Circle outline.
    Circle {
        /// Centre point.
        center: Point,
        /// Radius in mm.
        radius: f64,
        /// Layer the circle is drawn on.
        layer: Layer,
        /// Line width in mm.
        width: f64,
    },
}

impl Drawing {
    /// Returns the layer the drawing lives on.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        match self {
            Self::Segment { layer, .. } | Self::Circle { layer, .. } => *layer,
        }
    }
}

/// Board layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    // Copper
    /// Front copper.
    #[default]
    #[serde(rename = "F.Cu")]
    FrontCopper,
    /// Back copper.
    #[serde(rename = "B.Cu")]
    BackCopper,

    // Silkscreen
    /// Front silkscreen.
    #[serde(rename = "F.Silkscreen")]
    FrontSilkscreen,
    /// Back silkscreen.
    #[serde(rename = "B.Silkscreen")]
    BackSilkscreen,

    // Solder mask
    /// Front solder mask.
    #[serde(rename = "F.Mask")]
    FrontMask,
    /// Back solder mask.
    #[serde(rename = "B.Mask")]
    BackMask,

    // Fabrication
    /// Front fabrication drawing.
    #[serde(rename = "F.Fab")]
    FrontFab,
    /// Back fabrication drawing.
    #[serde(rename = "B.Fab")]
    BackFab,

    /// Board outline.
    #[serde(rename = "Edge.Cuts")]
    EdgeCuts,
}

impl Layer {
    /// Returns the board layer name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FrontCopper => "F.Cu",
            Self::BackCopper => "B.Cu",
            Self::FrontSilkscreen => "F.Silkscreen",
            Self::BackSilkscreen => "B.Silkscreen",
            Self::FrontMask => "F.Mask",
            Self::BackMask => "B.Mask",
            Self::FrontFab => "F.Fab",
            Self::BackFab => "B.Fab",
            Self::EdgeCuts => "Edge.Cuts",
        }
    }

    /// Parses a layer from its board name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "F.Cu" => Some(Self::FrontCopper),
            "B.Cu" => Some(Self::BackCopper),
            "F.Silkscreen" => Some(Self::FrontSilkscreen),
            "B.Silkscreen" => Some(Self::BackSilkscreen),
            "F.Mask" => Some(Self::FrontMask),
            "B.Mask" => Some(Self::BackMask),
            "F.Fab" => Some(Self::FrontFab),
            "B.Fab" => Some(Self::BackFab),
            "Edge.Cuts" => Some(Self::EdgeCuts),
            _ => None,
        }
    }

    /// Returns true for copper layers.
    #[must_use]
    pub const fn is_copper(&self) -> bool {
        matches!(self, Self::FrontCopper | Self::BackCopper)
    }
}
