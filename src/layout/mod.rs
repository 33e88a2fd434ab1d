//! Pixel chain layout.
//!
//! This module places chains of addressable LED footprints on a board and
//! routes their power, ground and data connections.
//!
//! # Architecture
//!
//! - [`series`]: ordered placement of pixels, reference numbering, chain state
//! - [`overlap`]: merging of requests that land on an existing footprint
//! - [`router`]: fixed-topology tracks and vias between consecutive pixels
//! - [`plan`]: JSON placement plans (pixels, lines, arcs, discontinuities)
//! - [`drawing`]: polygon outlines and board clean-up
//!
//! [`LayoutRun`] ties these together in the order a command-line run
//! applies them.

pub mod drawing;
pub mod error;
pub mod overlap;
pub mod plan;
pub mod router;
pub mod series;

pub use drawing::{CircleSpec, PolygonSpec};
pub use error::{LayoutError, LayoutResult};
pub use overlap::{blend_orientation, Merge, OverlapOutcome, OverlapResolver};
pub use plan::{ChainCommand, LayoutPlan, PlacementRequest, PlanStep};
pub use router::{ChainRouter, RouteSummary};
pub use series::{ChainState, PixelSource, Placement, SeriesPlacer};

use crate::board::Board;
use crate::config::Config;

/// Steps requested for one run, applied in field order.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Delete every track and via.
    pub delete_all_traces: bool,
    /// Delete every graphic drawing.
    pub delete_all_drawings: bool,
    /// Delete short traces (always refused).
    pub delete_short_traces: bool,
    /// Draw a regular polygon around the chain origin.
    pub polygon: Option<PolygonSpec>,
    /// Draw a circle around the chain origin.
    pub circle: Option<CircleSpec>,
    /// Run a full layout.
    pub layout: Option<LayoutJob>,
    /// Hide the references of all pixel footprints.
    pub hide_pixel_labels: bool,
}

/// A layout pass: the plan to place and the footprint to place it with.
#[derive(Debug, Clone)]
pub struct LayoutJob {
    /// Placement requests.
    pub plan: LayoutPlan,
    /// Pixel footprint prototype.
    pub source: PixelSource,
}

/// What a layout pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Pixels committed to the board.
    pub placed: usize,
    /// Requests merged into existing footprints.
    pub merged: usize,
    /// Requests drawn as preview lines only.
    pub previewed: usize,
    /// Chain discontinuities applied.
    pub discontinuities: usize,
    /// Tracks emitted by the router.
    pub tracks: usize,
    /// Vias emitted by the router.
    pub vias: usize,
}

/// What a whole run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tracks and vias removed by trace deletion.
    pub deleted_traces: usize,
    /// Drawings removed by drawing deletion.
    pub deleted_drawings: usize,
    /// Polygon edges drawn.
    pub polygon_edges: usize,
    /// Whether a circle was drawn.
    pub circle_drawn: bool,
    /// Layout pass results, when a layout ran.
    pub layout: Option<LayoutSummary>,
    /// Labels hidden.
    pub hidden_labels: usize,
}

/// A configured layout run against one board.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRun<'a> {
    config: &'a Config,
}

impl<'a> LayoutRun<'a> {
    /// Creates a run with the given settings.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Applies the requested steps to `board`.
    ///
    /// Steps run in this order: delete traces, delete drawings, delete
    /// short traces, draw polygon, draw circle, layout, hide labels. The first failing
    /// step aborts the run; earlier steps stay applied to the in-memory
    /// board.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any step.
    pub fn execute(&self, board: &mut Board, options: &RunOptions) -> LayoutResult<RunReport> {
        let mut report = RunReport::default();

        if options.delete_all_traces {
            report.deleted_traces = drawing::delete_all_traces(board);
        }
        if options.delete_all_drawings {
            report.deleted_drawings = drawing::delete_all_drawings(board);
        }
        if options.delete_short_traces {
            drawing::delete_short_traces(board)?;
        }
        if let Some(spec) = &options.polygon {
            report.polygon_edges = drawing::draw_polygon(
                board,
                self.config.layout.origin,
                spec,
                self.config.drawing.line_width,
            )?;
        }
        if let Some(circle) = &options.circle {
            drawing::draw_circle(
                board,
                self.config.layout.origin,
                circle.radius,
                circle.layer,
                self.config.drawing.line_width,
            );
            report.circle_drawn = true;
        }
        if let Some(job) = &options.layout {
            report.layout = Some(self.do_layout(board, &job.plan, job.source.clone())?);
        }
        if options.hide_pixel_labels {
            let pixels = drawing::pixel_reference_pattern(&self.config.layout.reference_prefix)?;
            report.hidden_labels = drawing::hide_pixel_labels(board, &pixels);
        }

        Ok(report)
    }

    /// Replaces any previous pixel layout with the one described by `plan`,
    /// placing copies of the footprint from `source`.
    ///
    /// Silkscreen and edge-cut drawings, generated pixel footprints, and all
    /// tracks and vias are removed before placement starts. The plan is
    /// validated first, so an invalid plan leaves the board untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is invalid, the pixel footprint cannot be
    /// loaded, or routing fails.
    pub fn do_layout(
        &self,
        board: &mut Board,
        plan: &LayoutPlan,
        source: PixelSource,
    ) -> LayoutResult<LayoutSummary> {
        let commands = plan.commands()?;
        let pixels = drawing::pixel_reference_pattern(&self.config.layout.reference_prefix)?;

        drawing::clear_outline_layers(board);
        drawing::reset_pixels(board, &pixels);

        let mut placer = SeriesPlacer::new(self.config, source);
        let mut summary = LayoutSummary::default();

        for command in commands {
            match command {
                ChainCommand::Place(request) => {
                    match placer.place_series_pixel(
                        board,
                        request.point,
                        request.orientation,
                        request.allow_overlaps,
                    )? {
                        Placement::Placed { route, .. } => {
                            summary.placed += 1;
                            if let Some(route) = route {
                                summary.tracks += route.tracks();
                                summary.vias += route.vias;
                            }
                        }
                        Placement::Merged(_) => summary.merged += 1,
                        Placement::Previewed { .. } => summary.previewed += 1,
                    }
                }
                ChainCommand::Discontinuity => {
                    placer.series_discontinuity();
                    summary.discontinuities += 1;
                }
            }
        }

        tracing::info!(
            placed = summary.placed,
            merged = summary.merged,
            previewed = summary.previewed,
            tracks = summary.tracks,
            vias = summary.vias,
            "Layout complete"
        );
        Ok(summary)
    }
}
