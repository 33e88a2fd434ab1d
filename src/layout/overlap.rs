//! Overlap resolution for series placement.
//!
//! When a placement request lands within the overlap threshold of a
//! footprint already on the board, no new footprint is created. Instead
//! the existing footprint moves to the midpoint of the two positions and
//! its orientation is blended with the requested one, and any track that
//! ended on one of its pads is re-anchored to the pad's new position.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use uuid::Uuid;

use crate::board::Board;
use crate::config::LayoutConfig;
use crate::geometry::Point;

/// Outcome of an overlap check.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlapOutcome {
    /// No footprint lies within the threshold; the request proceeds.
    Clear,
    /// The request was merged into an existing footprint.
    Merged(Merge),
}

/// Details of a merge into an existing footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// Identity of the moved footprint.
    pub footprint: Uuid,
    /// Reference of the moved footprint.
    pub reference: String,
    /// New footprint position.
    pub position: Point,
    /// New footprint orientation in radians.
    pub orientation: f64,
    /// Number of track endpoints rewritten to follow the pads.
    pub reanchored: usize,
}

/// Detects and merges overlapping placement requests.
#[derive(Debug, Clone, Copy)]
pub struct OverlapResolver {
    threshold: f64,
    reanchor_threshold: f64,
}

impl OverlapResolver {
    /// Creates a resolver.
    ///
    /// `threshold` is the merge distance; `reanchor_threshold` is how close a
    /// track endpoint must be to a pad's old position to follow it.
    #[must_use]
    pub const fn new(threshold: f64, reanchor_threshold: f64) -> Self {
        Self {
            threshold,
            reanchor_threshold,
        }
    }

    /// Creates a resolver from layout settings.
    #[must_use]
    pub const fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.overlap_threshold, config.reanchor_threshold)
    }

    /// Returns the first footprint, in board order, closer than the threshold.
    #[must_use]
    pub fn find_overlap(&self, board: &Board, position: Point) -> Option<Uuid> {
        board
            .footprints()
            .iter()
            .find(|fp| position.distance_to(fp.position) < self.threshold)
            .map(|fp| fp.uuid)
    }

    /// Checks a request at absolute `position` with `orientation` (radians)
    /// and merges it into the first overlapping footprint, if any.
    ///
    /// Only the first overlapping footprint is considered.
    pub fn resolve(&self, board: &mut Board, position: Point, orientation: f64) -> OverlapOutcome {
        let Some(uuid) = self.find_overlap(board, position) else {
            return OverlapOutcome::Clear;
        };
        let Some(footprint) = board.footprint_mut(uuid) else {
            return OverlapOutcome::Clear;
        };

        let existing_position = footprint.position;
        let existing_orientation = footprint.orientation_radians();
        let merged_position = existing_position.midpoint(position);
        let merged_orientation = blend_orientation(existing_orientation, orientation);
        let reference = footprint.reference.clone();

        tracing::info!(
            reference = %reference,
            existing = %existing_position,
            existing_orientation,
            requested = %position,
            requested_orientation = orientation,
            merged = %merged_position,
            merged_orientation,
            "Placement overlaps existing footprint, merging"
        );

        let moved_pads: Vec<Point> = footprint.pads().map(|pad| pad.position).collect();
        footprint.set_orientation_radians(merged_orientation);
        footprint.position = merged_position;
        let new_pads: Vec<Point> = footprint.pads().map(|pad| pad.position).collect();

        let reanchored = self.reanchor_tracks(board, &moved_pads, &new_pads);

        OverlapOutcome::Merged(Merge {
            footprint: uuid,
            reference,
            position: merged_position,
            orientation: merged_orientation,
            reanchored,
        })
    }

    /// Moves track endpoints that sat on a pad's old position to its new one.
    ///
    /// For each pad, a track's start is tested first; its end is tested only
    /// when the start did not match.
    fn reanchor_tracks(&self, board: &mut Board, old: &[Point], new: &[Point]) -> usize {
        let mut count = 0;
        for (&old_pad, &new_pad) in old.iter().zip(new) {
            for track in board.tracks_mut() {
                if track.start.distance_to(old_pad) < self.reanchor_threshold {
                    track.start = new_pad;
                    count += 1;
                } else if track.end.distance_to(old_pad) < self.reanchor_threshold {
                    track.end = new_pad;
                    count += 1;
                }
            }
        }
        tracing::debug!(count, "Re-anchored track endpoints");
        count
    }
}

/// Blends an existing orientation with a requested one (radians).
///
/// With `Δ = (existing mod π/2) − (requested mod π/2)`, the result is
/// `existing + Δ/2` when `|Δ| > π/4` and `existing − Δ/2` otherwise.
#[must_use]
pub fn blend_orientation(existing: f64, requested: f64) -> f64 {
    let delta = existing.rem_euclid(FRAC_PI_2) - requested.rem_euclid(FRAC_PI_2);
    let sign = if delta.abs() > FRAC_PI_4 { 1.0 } else { -1.0 };
    existing + delta / 2.0 * sign
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Footprint, Layer, NetCode, Pad, Track};

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn board_with_footprint(position: Point) -> (Board, Uuid) {
        let mut proto = Footprint::new("PIXEL");
        proto.add_pad(Pad::new("1", Point::from_xy(-0.5, 0.0), Point::from_xy(0.3, 0.3)));
        proto.add_pad(Pad::new("2", Point::from_xy(0.5, 0.0), Point::from_xy(0.3, 0.3)));
        let mut fp = proto.instantiate("D1");
        fp.position = position;

        let mut board = Board::new();
        let uuid = board.add_footprint(fp);
        (board, uuid)
    }

    #[test]
    fn blend_nudges_away_when_in_phase() {
        // Δ = 0 − 0.5 = −0.5, |Δ| ≤ π/4 → existing − Δ/2
        assert!(approx_eq(blend_orientation(0.0, 0.5), 0.25, 1e-12));
        assert!(approx_eq(blend_orientation(0.0, 0.0), 0.0, 1e-12));
    }

    #[test]
    fn blend_nudges_toward_when_out_of_phase() {
        // Δ = 0 − 1.0 = −1.0, |Δ| > π/4 → existing + Δ/2
        assert!(approx_eq(blend_orientation(0.0, 1.0), -0.5, 1e-12));
    }

    #[test]
    fn blend_uses_quarter_turn_phase() {
        // A request a full quarter turn away is in phase.
        assert!(approx_eq(blend_orientation(0.2, 0.2 + FRAC_PI_2), 0.2, 1e-12));
        // Negative angles wrap into [0, π/2).
        let blended = blend_orientation(-0.1, 0.0);
        let delta = (-0.1_f64).rem_euclid(FRAC_PI_2);
        assert!(approx_eq(blended, -0.1 + delta / 2.0, 1e-12));
    }

    #[test]
    fn far_request_is_clear_and_mutates_nothing() {
        let (mut board, _) = board_with_footprint(Point::from_xy(100.0, 100.0));
        let before = board.footprints().to_vec();

        let resolver = OverlapResolver::new(0.8, 0.1);
        let outcome = resolver.resolve(&mut board, Point::from_xy(100.9, 100.0), 0.0);

        assert_eq!(outcome, OverlapOutcome::Clear);
        assert_eq!(board.footprints(), before.as_slice());
    }

    #[test]
    fn near_request_moves_footprint_to_midpoint() {
        let (mut board, uuid) = board_with_footprint(Point::from_xy(100.0, 100.0));
        let resolver = OverlapResolver::new(0.8, 0.1);

        let outcome = resolver.resolve(&mut board, Point::from_xy(100.3, 100.0), 0.0);

        let OverlapOutcome::Merged(merge) = outcome else {
            panic!("expected merge");
        };
        assert_eq!(merge.footprint, uuid);
        assert_eq!(merge.reference, "D1");
        assert_eq!(board.footprints().len(), 1);
        let fp = board.footprint(uuid).unwrap();
        assert!(approx_eq(fp.position.x, 100.15, 1e-9));
        assert!(approx_eq(fp.position.y, 100.0, 1e-9));
        assert!(approx_eq(fp.orientation, 0.0, 1e-9));
    }

    #[test]
    fn tracks_on_moved_pads_follow() {
        let (mut board, uuid) = board_with_footprint(Point::from_xy(100.0, 100.0));
        let pad1 = Point::from_xy(99.5, 100.0);
        let pad2 = Point::from_xy(100.5, 100.0);
        let far = Point::from_xy(90.0, 90.0);
        let track = |start, end| Track::new(start, end, Layer::FrontCopper, 0.25, NetCode(1));

        board.add_track(track(pad1, far));
        board.add_track(track(far, pad2));
        board.add_track(track(far, Point::from_xy(80.0, 80.0)));
        // within the re-anchor threshold but not exact
        board.add_track(track(Point::from_xy(99.55, 100.0), far));

        let resolver = OverlapResolver::new(0.8, 0.1);
        let OverlapOutcome::Merged(merge) =
            resolver.resolve(&mut board, Point::from_xy(100.0, 100.4), 0.0)
        else {
            panic!("expected merge");
        };
        assert_eq!(merge.reanchored, 3);

        let fp = board.footprint(uuid).unwrap();
        let new1 = fp.pad("1").unwrap().position;
        let new2 = fp.pad("2").unwrap().position;
        let tracks = board.tracks();
        assert_eq!(tracks[0].start, new1);
        assert_eq!(tracks[0].end, far);
        assert_eq!(tracks[1].start, far);
        assert_eq!(tracks[1].end, new2);
        assert_eq!(tracks[2].start, far);
        assert_eq!(tracks[3].start, new1);
    }

    #[test]
    fn only_first_overlap_is_merged() {
        let (mut board, first) = board_with_footprint(Point::from_xy(0.0, 0.0));
        let mut second = board.footprint(first).unwrap().instantiate("D2");
        second.position = Point::from_xy(0.6, 0.0);
        let second = board.add_footprint(second);

        let resolver = OverlapResolver::new(0.8, 0.1);
        let outcome = resolver.resolve(&mut board, Point::from_xy(0.3, 0.0), 0.0);

        let OverlapOutcome::Merged(merge) = outcome else {
            panic!("expected merge");
        };
        assert_eq!(merge.footprint, first);
        assert_eq!(
            board.footprint(second).unwrap().position,
            Point::from_xy(0.6, 0.0)
        );
    }
}
