//! Graphic drawing and board clean-up.

use std::f64::consts::{PI, TAU};
use std::str::FromStr;

use regex::Regex;

use super::error::{LayoutError, LayoutResult};
use crate::board::{reference_pattern, Board, BoardResult, Drawing, Layer};
use crate::geometry::Point;

/// A regular polygon request, parsed from `"sides,radius,layer"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonSpec {
    /// Number of sides, at least 3.
    pub sides: usize,
    /// Circumradius in mm.
    pub radius: f64,
    /// Layer to draw on.
    pub layer: Layer,
}

impl FromStr for PolygonSpec {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [sides, radius, layer] = fields.as_slice() else {
            return Err(LayoutError::invalid_polygon(
                s,
                format!("expected 3 comma-separated fields, got {}", fields.len()),
            ));
        };

        let sides: usize = sides
            .parse()
            .map_err(|_| LayoutError::invalid_polygon(s, format!("'{sides}' is not a side count")))?;
        if sides < 3 {
            return Err(LayoutError::invalid_polygon(
                s,
                format!("a polygon needs at least 3 sides, got {sides}"),
            ));
        }

        let radius: f64 = radius
            .parse()
            .map_err(|_| LayoutError::invalid_polygon(s, format!("'{radius}' is not a radius")))?;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LayoutError::invalid_polygon(
                s,
                format!("radius must be positive, got {radius}"),
            ));
        }

        let layer = Layer::parse(layer)
            .ok_or_else(|| LayoutError::invalid_polygon(s, format!("unknown layer '{layer}'")))?;

        Ok(Self {
            sides,
            radius,
            layer,
        })
    }
}

/// A circle request, parsed from `"radius,layer"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleSpec {
    /// Radius in mm.
    pub radius: f64,
    /// Layer to draw on.
    pub layer: Layer,
}

impl FromStr for CircleSpec {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [radius, layer] = fields.as_slice() else {
            return Err(LayoutError::invalid_circle(
                s,
                format!("expected 2 comma-separated fields, got {}", fields.len()),
            ));
        };

        let radius: f64 = radius
            .parse()
            .map_err(|_| LayoutError::invalid_circle(s, format!("'{radius}' is not a radius")))?;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LayoutError::invalid_circle(
                s,
                format!("radius must be positive, got {radius}"),
            ));
        }
        let layer = Layer::parse(layer)
            .ok_or_else(|| LayoutError::invalid_circle(s, format!("unknown layer '{layer}'")))?;

        Ok(Self { radius, layer })
    }
}

/// Vertices of a regular polygon centred on `center`.
///
/// Vertex `i` sits at angle `2π·i/n + π/n`, so a square has flat sides
/// parallel to the axes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn regular_polygon_vertices(center: Point, sides: usize, radius: f64) -> Vec<Point> {
    let n = sides as f64;
    (0..sides)
        .map(|i| center.polar_translated(radius, TAU * i as f64 / n + PI / n))
        .collect()
}

/// Draws a regular polygon centred on `center` as closed segment drawings.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidPolygon`] if an edge has zero length. No
/// segment is added in that case.
pub fn draw_polygon(
    board: &mut Board,
    center: Point,
    spec: &PolygonSpec,
    width: f64,
) -> LayoutResult<usize> {
    let vertices = regular_polygon_vertices(center, spec.sides, spec.radius);
    let edges: Vec<(Point, Point)> = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&start, &end)| (start, end))
        .collect();

    if edges.iter().any(|(start, end)| start.distance_to(*end) == 0.0) {
        return Err(LayoutError::invalid_polygon(
            format!("{},{},{}", spec.sides, spec.radius, spec.layer.as_str()),
            "polygon has a zero-length edge",
        ));
    }

    tracing::info!(
        sides = spec.sides,
        radius = spec.radius,
        layer = spec.layer.as_str(),
        center = %center,
        "Drawing polygon"
    );
    for &(start, end) in &edges {
        draw_segment(board, start, end, spec.layer, width);
    }
    Ok(edges.len())
}

/// Adds one line segment drawing.
pub fn draw_segment(board: &mut Board, start: Point, end: Point, layer: Layer, width: f64) {
    board.add_drawing(Drawing::Segment {
        start,
        end,
        layer,
        width,
    });
}

/// Adds one circle outline drawing.
pub fn draw_circle(board: &mut Board, center: Point, radius: f64, layer: Layer, width: f64) {
    tracing::info!(center = %center, radius, layer = layer.as_str(), "Drawing circle");
    board.add_drawing(Drawing::Circle {
        center,
        radius,
        layer,
        width,
    });
}

/// Builds the pattern matching generated pixel references, e.g. `^D\d+$`.
///
/// # Errors
///
/// Returns an error if the resulting pattern does not compile.
pub fn pixel_reference_pattern(prefix: &str) -> BoardResult<Regex> {
    reference_pattern(&format!(r"^{}\d+$", regex::escape(prefix)))
}

/// Removes every generated pixel footprint and all tracks and vias.
pub fn reset_pixels(board: &mut Board, pixels: &Regex) -> (usize, usize) {
    let footprints = board.remove_footprints_matching(pixels).len();
    let tracks = board.delete_all_tracks();
    tracing::info!(footprints, tracks, "Removed previous pixel layout");
    (footprints, tracks)
}

/// Deletes every track and via.
pub fn delete_all_traces(board: &mut Board) -> usize {
    let count = board.delete_all_tracks();
    tracing::info!(count, "Deleted all traces");
    count
}

/// Deletes every graphic drawing.
pub fn delete_all_drawings(board: &mut Board) -> usize {
    let count = board.delete_drawings(None);
    tracing::info!(count, "Deleted all drawings");
    count
}

/// Deletes the drawings a layout run regenerates.
pub fn clear_outline_layers(board: &mut Board) -> usize {
    let count: usize = [Layer::FrontSilkscreen, Layer::EdgeCuts]
        .into_iter()
        .map(|layer| board.delete_drawings(Some(layer)))
        .sum();
    tracing::info!(count, "Cleared silkscreen and edge cut drawings");
    count
}

/// Deleting short traces would also remove vias sitting on them, so it
/// always fails.
///
/// # Errors
///
/// Always returns [`LayoutError::ShortTraceDeletionDisabled`].
pub fn delete_short_traces(_board: &mut Board) -> LayoutResult<usize> {
    Err(LayoutError::ShortTraceDeletionDisabled)
}

/// Hides the reference of every visible pixel footprint.
pub fn hide_pixel_labels(board: &mut Board, pixels: &Regex) -> usize {
    let mut count = 0;
    for footprint in board
        .footprints_mut()
        .filter(|f| f.reference_visible && pixels.is_match(&f.reference))
    {
        footprint.reference_visible = false;
        count += 1;
    }
    tracing::info!(count, "Hid pixel labels");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Footprint, NetCode, Track};

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn parses_polygon_spec() {
        let spec: PolygonSpec = "6, 12.5, Edge.Cuts".parse().unwrap();
        assert_eq!(spec.sides, 6);
        assert!(approx_eq(spec.radius, 12.5, 1e-12));
        assert_eq!(spec.layer, Layer::EdgeCuts);
    }

    #[test]
    fn rejects_malformed_polygon_specs() {
        for bad in [
            "6,12.5",
            "6,12.5,F.Silkscreen,extra",
            "six,12.5,F.Silkscreen",
            "2,12.5,F.Silkscreen",
            "6,abc,F.Silkscreen",
            "6,0,F.Silkscreen",
            "6,-1,F.Silkscreen",
            "6,12.5,Top",
        ] {
            let err = bad.parse::<PolygonSpec>().unwrap_err();
            assert!(
                matches!(err, LayoutError::InvalidPolygon { ref spec, .. } if spec == bad),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parses_circle_spec() {
        let spec: CircleSpec = "30, F.Silkscreen".parse().unwrap();
        assert!(approx_eq(spec.radius, 30.0, 1e-12));
        assert_eq!(spec.layer, Layer::FrontSilkscreen);

        for bad in ["30", "0,Edge.Cuts", "r,Edge.Cuts", "30,Top", "30,Edge.Cuts,1"] {
            assert!(
                matches!(bad.parse::<CircleSpec>(), Err(LayoutError::InvalidCircle { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn circle_is_added_as_one_drawing() {
        let mut board = Board::new();
        draw_circle(&mut board, Point::from_xy(100.0, 100.0), 30.0, Layer::EdgeCuts, 0.15);

        assert_eq!(
            board.drawings(),
            [Drawing::Circle {
                center: Point::from_xy(100.0, 100.0),
                radius: 30.0,
                layer: Layer::EdgeCuts,
                width: 0.15,
            }]
        );
    }

    #[test]
    fn square_vertices_are_offset_by_half_step() {
        let vertices = regular_polygon_vertices(Point::ORIGIN, 4, 2.0_f64.sqrt());
        assert_eq!(vertices.len(), 4);
        assert!(approx_eq(vertices[0].x, 1.0, 1e-12));
        assert!(approx_eq(vertices[0].y, 1.0, 1e-12));
        assert!(approx_eq(vertices[2].x, -1.0, 1e-12));
        assert!(approx_eq(vertices[2].y, -1.0, 1e-12));
    }

    #[test]
    fn polygon_is_closed() {
        let mut board = Board::new();
        let spec = PolygonSpec {
            sides: 5,
            radius: 10.0,
            layer: Layer::FrontSilkscreen,
        };
        let center = Point::from_xy(100.0, 100.0);

        let count = draw_polygon(&mut board, center, &spec, 0.15).unwrap();

        assert_eq!(count, 5);
        let segments: Vec<(Point, Point)> = board
            .drawings()
            .iter()
            .map(|d| match d {
                Drawing::Segment { start, end, .. } => (*start, *end),
                Drawing::Circle { .. } => panic!("unexpected circle"),
            })
            .collect();
        for (i, (_, end)) in segments.iter().enumerate() {
            assert_eq!(*end, segments[(i + 1) % segments.len()].0);
        }
        for (start, _) in &segments {
            assert!(approx_eq(start.distance_to(center), 10.0, 1e-9));
        }
    }

    #[test]
    fn degenerate_polygon_draws_nothing() {
        let mut board = Board::new();
        let spec = PolygonSpec {
            sides: 3,
            radius: 1e-3,
            layer: Layer::FrontSilkscreen,
        };
        // The offsets vanish when added to coordinates this large.
        let far = Point::from_xy(1e20, 1e20);
        let err = draw_polygon(&mut board, far, &spec, 0.15).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPolygon { .. }));
        assert!(board.drawings().is_empty());
    }

    #[test]
    fn pixel_pattern_matches_generated_references_only() {
        let pattern = pixel_reference_pattern("D").unwrap();
        assert!(pattern.is_match("D1"));
        assert!(pattern.is_match("D120"));
        assert!(!pattern.is_match("D"));
        assert!(!pattern.is_match("DA1"));
        assert!(!pattern.is_match("U1"));

        let escaped = pixel_reference_pattern("LED.").unwrap();
        assert!(escaped.is_match("LED.3"));
        assert!(!escaped.is_match("LEDX3"));
    }

    #[test]
    fn reset_removes_pixels_and_tracks_only() {
        let mut board = Board::new();
        for reference in ["D1", "D2", "U1"] {
            board.add_footprint(Footprint::new("X").instantiate(reference));
        }
        board.add_track(Track::new(
            Point::ORIGIN,
            Point::from_xy(1.0, 0.0),
            Layer::FrontCopper,
            0.25,
            NetCode::UNCONNECTED,
        ));
        draw_segment(
            &mut board,
            Point::ORIGIN,
            Point::from_xy(1.0, 1.0),
            Layer::FrontSilkscreen,
            0.15,
        );

        let pattern = pixel_reference_pattern("D").unwrap();
        assert_eq!(reset_pixels(&mut board, &pattern), (2, 1));
        assert_eq!(board.footprints().len(), 1);
        assert_eq!(board.footprints()[0].reference, "U1");
        assert!(board.tracks().is_empty());
        assert_eq!(board.drawings().len(), 1);
    }

    #[test]
    fn outline_clearing_keeps_other_layers() {
        let mut board = Board::new();
        for layer in [Layer::FrontSilkscreen, Layer::EdgeCuts, Layer::FrontFab] {
            draw_segment(&mut board, Point::ORIGIN, Point::from_xy(1.0, 0.0), layer, 0.1);
        }
        assert_eq!(clear_outline_layers(&mut board), 2);
        assert_eq!(board.drawings().len(), 1);
        assert_eq!(board.drawings()[0].layer(), Layer::FrontFab);

        assert_eq!(delete_all_drawings(&mut board), 1);
        assert!(board.drawings().is_empty());
    }

    #[test]
    fn short_trace_deletion_is_refused() {
        let mut board = Board::new();
        assert!(matches!(
            delete_short_traces(&mut board),
            Err(LayoutError::ShortTraceDeletionDisabled)
        ));
    }

    #[test]
    fn hides_only_visible_pixel_labels() {
        let mut board = Board::new();
        for (reference, visible) in [("D1", true), ("D2", false), ("U1", true)] {
            let mut fp = Footprint::new("X").instantiate(reference);
            fp.reference_visible = visible;
            board.add_footprint(fp);
        }

        let pattern = pixel_reference_pattern("D").unwrap();
        assert_eq!(hide_pixel_labels(&mut board, &pattern), 1);
        assert!(!board.footprint_by_reference("D1").unwrap().reference_visible);
        assert!(board.footprint_by_reference("U1").unwrap().reference_visible);
    }
}
