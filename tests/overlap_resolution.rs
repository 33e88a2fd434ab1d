//! Overlap handling during series placement.

use std::f64::consts::FRAC_PI_2;

use pixel_layout::board::{Board, Footprint, Pad};
use pixel_layout::config::Config;
use pixel_layout::geometry::Point;
use pixel_layout::layout::{blend_orientation, PixelSource, Placement, SeriesPlacer};

fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

const COORD_TOLERANCE: f64 = 1e-6;

fn sk9822() -> Footprint {
    let mut fp = Footprint::new("LED-SK9822-EC20");
    for (name, x, y) in [
        ("1", -0.8, -0.55),
        ("2", -0.8, 0.0),
        ("3", -0.8, 0.55),
        ("4", 0.8, 0.55),
        ("5", 0.8, 0.0),
        ("6", 0.8, -0.55),
    ] {
        fp.add_pad(Pad::new(name, Point::from_xy(x, y), Point::from_xy(0.6, 0.4)));
    }
    fp
}

#[test]
fn close_request_merges_into_existing_pixel() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    placer
        .place_series_pixel(&mut board, Point::ORIGIN, 0.0, false)
        .unwrap();
    let placement = placer
        .place_series_pixel(&mut board, Point::from_xy(0.3, 0.0), 0.0, false)
        .unwrap();

    let Placement::Merged(merge) = placement else {
        panic!("expected a merge");
    };
    assert_eq!(merge.reference, "D1");
    assert_eq!(board.footprints().len(), 1);

    let fp = &board.footprints()[0];
    assert!(approx_eq(fp.position.x, 100.15, COORD_TOLERANCE));
    assert!(approx_eq(fp.position.y, 100.0, COORD_TOLERANCE));
    assert!(approx_eq(fp.orientation, 0.0, 1e-9));

    // No new routing for a merged request.
    assert_eq!(board.tracks().len(), 2);
    assert_eq!(board.vias().len(), 1);
    assert_eq!(placer.chain().sequence(), 2);
}

#[test]
fn request_beyond_threshold_is_not_merged() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    placer
        .place_series_pixel(&mut board, Point::ORIGIN, 0.0, false)
        .unwrap();
    let placement = placer
        .place_series_pixel(&mut board, Point::from_xy(0.9, 0.0), 0.0, false)
        .unwrap();

    assert!(matches!(placement, Placement::Placed { .. }));
    assert_eq!(board.footprints().len(), 2);
}

#[test]
fn allowing_overlaps_skips_the_check() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    for _ in 0..2 {
        placer
            .place_series_pixel(&mut board, Point::ORIGIN, 0.0, true)
            .unwrap();
    }

    assert_eq!(board.footprints().len(), 2);
    assert_eq!(board.footprints()[1].reference, "D2");
}

#[test]
fn merged_pixel_drags_its_tracks_along() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    placer
        .place_series_pixel(&mut board, Point::ORIGIN, 0.0, false)
        .unwrap();
    placer
        .place_series_pixel(&mut board, Point::from_xy(10.0, 0.0), 0.0, false)
        .unwrap();

    let Placement::Merged(merge) = placer
        .place_series_pixel(&mut board, Point::from_xy(10.0, 0.4), 0.0, false)
        .unwrap()
    else {
        panic!("expected a merge");
    };
    assert_eq!(merge.reference, "D2");
    assert!(merge.reanchored > 0);

    // Every link and stub that touched D2 now touches its moved pads.
    let d1 = board.footprint_by_reference("D1").unwrap();
    let d2 = board.footprint_by_reference("D2").unwrap();
    for (from, to) in [("1", "3"), ("6", "4")] {
        let start = d1.pad(from).unwrap().position;
        let end = d2.pad(to).unwrap().position;
        assert!(board.tracks().iter().any(|t| {
            t.start.distance_to(start) < COORD_TOLERANCE && t.end.distance_to(end) < COORD_TOLERANCE
        }));
    }
    let ground = d2.pad("2").unwrap().position;
    assert!(board
        .tracks()
        .iter()
        .any(|t| t.start.distance_to(ground) < COORD_TOLERANCE));
}

#[test]
fn next_pixel_links_from_the_moved_position() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    placer
        .place_series_pixel(&mut board, Point::ORIGIN, 0.0, false)
        .unwrap();
    placer
        .place_series_pixel(&mut board, Point::from_xy(0.0, 0.5), 0.0, false)
        .unwrap();
    placer
        .place_series_pixel(&mut board, Point::from_xy(10.0, 0.0), 0.0, false)
        .unwrap();

    let d1 = board.footprint_by_reference("D1").unwrap();
    let d2 = board.footprint_by_reference("D2").unwrap();
    assert!(approx_eq(d1.position.y, 100.25, COORD_TOLERANCE));

    let start = d1.pad("1").unwrap().position;
    let end = d2.pad("3").unwrap().position;
    assert!(board
        .tracks()
        .iter()
        .any(|t| t.start == start && t.end == end));
}

#[test]
fn blended_orientation_on_merge() {
    let config = Config::default();
    let mut placer = SeriesPlacer::new(&config, PixelSource::Prototype(sk9822()));
    let mut board = Board::new();

    placer
        .place_series_pixel(&mut board, Point::ORIGIN, 0.0, false)
        .unwrap();
    let Placement::Merged(merge) = placer
        .place_series_pixel(&mut board, Point::from_xy(0.1, 0.0), 0.3, false)
        .unwrap()
    else {
        panic!("expected a merge");
    };

    assert!(approx_eq(merge.orientation, 0.15, 1e-9));
    assert!(approx_eq(blend_orientation(0.0, 0.3), 0.15, 1e-12));

    // A quarter turn is in phase with no rotation.
    assert!(approx_eq(blend_orientation(0.0, FRAC_PI_2), 0.0, 1e-12));
}
