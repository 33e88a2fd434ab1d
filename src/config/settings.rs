//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every field has a default matching the SK9822-EC20 pixel chain.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::board::Layer;
use crate::error::{ConfigError, ConfigResult};
use crate::geometry::Point;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Series placement settings.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Pixel footprint and pad roles.
    #[serde(default)]
    pub pixel: PixelConfig,

    /// Chain trace routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Graphic drawing settings.
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("layout.overlap_threshold", self.layout.overlap_threshold),
            ("layout.reanchor_threshold", self.layout.reanchor_threshold),
            ("routing.trace_width", self.routing.trace_width),
            ("routing.via_drill", self.routing.via_drill),
            ("routing.via_diameter", self.routing.via_diameter),
            ("routing.ground_stub_length", self.routing.ground_stub_length),
            ("routing.power_stub_length", self.routing.power_stub_length),
            ("drawing.line_width", self.drawing.line_width),
            ("drawing.preview_line_width", self.drawing.preview_line_width),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::validation(
                    field,
                    format!("must be positive, got {value}"),
                ));
            }
        }

        if self.routing.via_drill >= self.routing.via_diameter {
            return Err(ConfigError::validation(
                "routing.via_drill",
                format!(
                    "{} must be smaller than routing.via_diameter ({})",
                    self.routing.via_drill, self.routing.via_diameter
                ),
            ));
        }

        if !self.routing.trace_layer.is_copper() {
            return Err(ConfigError::validation(
                "routing.trace_layer",
                format!("{} is not a copper layer", self.routing.trace_layer.as_str()),
            ));
        }

        let (top, bottom) = self.routing.via_layers;
        if !(top.is_copper() && bottom.is_copper()) || top == bottom {
            return Err(ConfigError::validation(
                "routing.via_layers",
                format!(
                    "must be two different copper layers, got {} and {}",
                    top.as_str(),
                    bottom.as_str()
                ),
            ));
        }

        let names = [
            ("layout.reference_prefix", &self.layout.reference_prefix),
            ("pixel.footprint", &self.pixel.footprint),
            ("pixel.ground_pad", &self.pixel.ground_pad),
            ("pixel.power_pad", &self.pixel.power_pad),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(ConfigError::validation(field, "must not be empty"));
            }
        }
        if self
            .pixel
            .chain_links
            .iter()
            .any(|(from, to)| from.is_empty() || to.is_empty())
        {
            return Err(ConfigError::validation(
                "pixel.chain_links",
                "pad names must not be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logging.level",
                format!(
                    "'{}' is not one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

/// Series placement configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Chain origin; placement requests are relative to this point.
    #[serde(default = "default_origin")]
    pub origin: Point,

    /// Distance below which a request merges into an existing footprint (mm).
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,

    /// Distance within which a track endpoint follows a moved pad (mm).
    #[serde(default = "default_reanchor_threshold")]
    pub reanchor_threshold: f64,

    /// Prefix of generated reference designators.
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// Hide reference designators of newly placed pixels.
    #[serde(default = "default_true")]
    pub hide_references: bool,

    /// Draw lines between pixel positions instead of placing footprints.
    #[serde(default)]
    pub preview_lines_only: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            overlap_threshold: default_overlap_threshold(),
            reanchor_threshold: default_reanchor_threshold(),
            reference_prefix: default_reference_prefix(),
            hide_references: default_true(),
            preview_lines_only: false,
        }
    }
}

const fn default_origin() -> Point {
    Point::from_xy(100.0, 100.0)
}

const fn default_overlap_threshold() -> f64 {
    0.8
}

const fn default_reanchor_threshold() -> f64 {
    0.1
}

fn default_reference_prefix() -> String {
    "D".to_string()
}

const fn default_true() -> bool {
    true
}

/// Pixel footprint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PixelConfig {
    /// Footprint library directory, relative to the board file.
    #[serde(default = "default_library")]
    pub library: PathBuf,

    /// Footprint name within the library.
    #[serde(default = "default_footprint")]
    pub footprint: String,

    /// Name of the ground pad.
    #[serde(default = "default_ground_pad")]
    pub ground_pad: String,

    /// Name of the +5V pad.
    #[serde(default = "default_power_pad")]
    pub power_pad: String,

    /// Net assigned to the ground pad.
    #[serde(default = "default_ground_net")]
    pub ground_net: String,

    /// Net assigned to the +5V pad.
    #[serde(default = "default_power_net")]
    pub power_net: String,

    /// Chain-link pads: a pad of the previous pixel maps to a pad of the next.
    #[serde(default = "default_chain_links")]
    pub chain_links: IndexMap<String, String>,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            footprint: default_footprint(),
            ground_pad: default_ground_pad(),
            power_pad: default_power_pad(),
            ground_net: default_ground_net(),
            power_net: default_power_net(),
            chain_links: default_chain_links(),
        }
    }
}

fn default_library() -> PathBuf {
    PathBuf::from("kicad_footprints.pretty")
}

fn default_footprint() -> String {
    "LED-SK9822-EC20".to_string()
}

fn default_ground_pad() -> String {
    "2".to_string()
}

fn default_power_pad() -> String {
    "5".to_string()
}

fn default_ground_net() -> String {
    "GND".to_string()
}

fn default_power_net() -> String {
    "+5V".to_string()
}

// SCK and SD* continuation for the SK9822-EC20
fn default_chain_links() -> IndexMap<String, String> {
    IndexMap::from([
        ("1".to_string(), "3".to_string()),
        ("6".to_string(), "4".to_string()),
    ])
}

/// Chain trace routing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Emit tracks and vias for placed pixels.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Track width in mm.
    #[serde(default = "default_trace_width")]
    pub trace_width: f64,

    /// Copper layer for tracks.
    #[serde(default)]
    pub trace_layer: Layer,

    /// Via drill diameter in mm.
    #[serde(default = "default_via_drill")]
    pub via_drill: f64,

    /// Via copper diameter in mm.
    #[serde(default = "default_via_diameter")]
    pub via_diameter: f64,

    /// Layers bridged by ground vias.
    #[serde(default = "default_via_layers")]
    pub via_layers: (Layer, Layer),

    /// Length of the ground stub from pad to via in mm.
    #[serde(default = "default_ground_stub_length")]
    pub ground_stub_length: f64,

    /// Length of the +5V stub in mm.
    #[serde(default = "default_power_stub_length")]
    pub power_stub_length: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            trace_width: default_trace_width(),
            trace_layer: Layer::FrontCopper,
            via_drill: default_via_drill(),
            via_diameter: default_via_diameter(),
            via_layers: default_via_layers(),
            ground_stub_length: default_ground_stub_length(),
            power_stub_length: default_power_stub_length(),
        }
    }
}

const fn default_trace_width() -> f64 {
    0.25
}

const fn default_via_drill() -> f64 {
    0.254
}

const fn default_via_diameter() -> f64 {
    0.4064
}

const fn default_via_layers() -> (Layer, Layer) {
    (Layer::FrontCopper, Layer::BackCopper)
}

const fn default_ground_stub_length() -> f64 {
    0.8
}

const fn default_power_stub_length() -> f64 {
    1.0
}

/// Graphic drawing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawingConfig {
    /// Line width for polygon drawings in mm.
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Line width of preview lines between pixels in mm.
    #[serde(default = "default_preview_line_width")]
    pub preview_line_width: f64,

    /// Layer preview lines are drawn on.
    #[serde(default = "default_preview_layer")]
    pub preview_layer: Layer,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            preview_line_width: default_preview_line_width(),
            preview_layer: default_preview_layer(),
        }
    }
}

const fn default_line_width() -> f64 {
    0.15
}

const fn default_preview_line_width() -> f64 {
    0.35
}

const fn default_preview_layer() -> Layer {
    Layer::FrontSilkscreen
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout.origin, Point::from_xy(100.0, 100.0));
        assert_eq!(config.pixel.footprint, "LED-SK9822-EC20");
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Ring of pixels",
            "layout": {
                "origin": { "x": 50.0, "y": 75.0 },
                "overlap_threshold": 1.2,
                "reanchor_threshold": 0.05,
                "reference_prefix": "LED",
                "hide_references": false
            },
            "pixel": {
                "library": "libs/pixels.pretty",
                "footprint": "LED-APA102-2020",
                "ground_pad": "4",
                "power_pad": "1",
                "ground_net": "VSS",
                "power_net": "VDD",
                "chain_links": { "2": "5", "3": "6" }
            },
            "routing": {
                "enabled": false,
                "trace_width": 0.2,
                "trace_layer": "B.Cu",
                "via_drill": 0.3,
                "via_diameter": 0.6,
                "via_layers": ["B.Cu", "F.Cu"],
                "ground_stub_length": 0.5,
                "power_stub_length": 0.7
            },
            "drawing": { "line_width": 0.2 },
            "logging": { "level": "debug" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout.origin, Point::from_xy(50.0, 75.0));
        assert!((config.layout.overlap_threshold - 1.2).abs() < f64::EPSILON);
        assert_eq!(config.layout.reference_prefix, "LED");
        assert!(!config.layout.hide_references);
        assert_eq!(config.pixel.library, PathBuf::from("libs/pixels.pretty"));
        let links: Vec<_> = config.pixel.chain_links.iter().collect();
        assert_eq!(links[0], (&"2".to_string(), &"5".to_string()));
        assert!(!config.routing.enabled);
        assert_eq!(config.routing.trace_layer, Layer::BackCopper);
        assert_eq!(
            config.routing.via_layers,
            (Layer::BackCopper, Layer::FrontCopper)
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn routing_config_defaults() {
        let config = RoutingConfig::default();
        assert!(config.enabled);
        assert!((config.trace_width - 0.25).abs() < f64::EPSILON);
        assert!((config.via_drill - 0.254).abs() < f64::EPSILON);
        assert!((config.via_diameter - 0.4064).abs() < f64::EPSILON);
        assert!((config.ground_stub_length - 0.8).abs() < f64::EPSILON);
        assert!((config.power_stub_length - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chain_links_default_order() {
        let config = PixelConfig::default();
        let links: Vec<_> = config
            .chain_links
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        assert_eq!(links, vec![("1", "3"), ("6", "4")]);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_non_positive_threshold() {
        let json = r#"{ "layout": { "overlap_threshold": 0.0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("layout.overlap_threshold"));
    }

    #[test]
    fn reject_drill_larger_than_via() {
        let json = r#"{ "routing": { "via_drill": 0.5, "via_diameter": 0.4 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("via_drill"));
    }

    #[test]
    fn reject_non_copper_trace_layer() {
        let json = r#"{ "routing": { "trace_layer": "Edge.Cuts" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_bad_via_layers() {
        for layers in [r#"["F.Silkscreen", "Edge.Cuts"]"#, r#"["F.Cu", "F.Cu"]"#] {
            let json = format!(r#"{{ "routing": {{ "via_layers": {layers} }} }}"#);
            let config: Config = serde_json::from_str(&json).unwrap();
            let err = config.validate().unwrap_err();
            assert_eq!(err.field(), Some("routing.via_layers"));
        }
    }

    #[test]
    fn preview_defaults() {
        let config = Config::default();
        assert!(!config.layout.preview_lines_only);
        assert!((config.drawing.preview_line_width - 0.35).abs() < f64::EPSILON);
        assert_eq!(config.drawing.preview_layer, Layer::FrontSilkscreen);
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("logging.level"));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
