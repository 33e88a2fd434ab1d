//! Series placement of chained pixels.
//!
//! [`SeriesPlacer`] processes placement requests strictly in order. Each
//! request either merges into an overlapping footprint (when overlaps are
//! not allowed) or commits a new pixel footprint, labels it `D<n>`, and
//! routes it to the previous pixel in the chain.
//!
//! ```text
//!            place (committed)               place (committed)
//!   ┌──────┐ ─────────────────▶ ┌──────────┐ ◀──────────────┐
//!   │ idle │                    │ chaining │                │
//!   └──────┘ ◀───────────────── └──────────┘ ───────────────┘
//!               discontinuity
//! ```
//!
//! A merged request leaves the chain state untouched.
//!
//! With `layout.preview_lines_only` set, no footprints are added. Each
//! request instead draws a line from the previous pixel position, which
//! gives a quick outline of the chain path.

use uuid::Uuid;

use super::drawing::draw_segment;
use super::error::LayoutResult;
use super::overlap::{Merge, OverlapOutcome, OverlapResolver};
use super::router::{ChainRouter, RouteSummary};
use crate::board::{Board, BoardResult, Footprint, FootprintLibrary, Layer};
use crate::config::Config;
use crate::geometry::Point;

/// Where the pixel footprint prototype comes from.
#[derive(Debug, Clone)]
pub enum PixelSource {
    /// Load the named footprint from a library on first use.
    Library {
        /// Library to load from.
        library: FootprintLibrary,
        /// Footprint name.
        name: String,
    },
    /// Use an in-memory prototype.
    Prototype(Footprint),
}

impl PixelSource {
    fn load(&self) -> BoardResult<Footprint> {
        match self {
            Self::Library { library, name } => {
                tracing::info!(footprint = %name, "Loading pixel footprint");
                library.load(name)
            }
            Self::Prototype(footprint) => Ok(footprint.clone()),
        }
    }
}

/// Cursor over the chain being placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    previous: Option<Uuid>,
    sequence: u32,
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    /// Creates an idle chain whose first pixel will be number 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: None,
            sequence: 1,
        }
    }

    /// The previously committed pixel, or `None` at the start of a chain.
    #[must_use]
    pub const fn previous(&self) -> Option<Uuid> {
        self.previous
    }

    /// Number the next committed pixel will receive.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns true while a chain is in progress.
    #[must_use]
    pub const fn is_chaining(&self) -> bool {
        self.previous.is_some()
    }

    /// Breaks the chain without resetting the numbering.
    pub fn discontinuity(&mut self) {
        self.previous = None;
    }

    fn commit(&mut self, footprint: Uuid) {
        self.previous = Some(footprint);
        self.sequence += 1;
    }

    fn skip(&mut self) {
        self.sequence += 1;
    }
}

/// Result of one placement request.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// A new pixel was committed.
    Placed {
        /// Identity of the new footprint.
        footprint: Uuid,
        /// Reference assigned to it.
        reference: String,
        /// Routing emitted for it, if routing is enabled.
        route: Option<RouteSummary>,
    },
    /// The request merged into an existing footprint.
    Merged(Merge),
    /// Preview mode: only a line from the previous position was drawn.
    Previewed {
        /// Reference the pixel would have received.
        reference: String,
        /// True if a line was drawn (false at the start of a chain).
        line: bool,
    },
}

/// Places a chain of pixels onto a board.
#[derive(Debug)]
pub struct SeriesPlacer<'a> {
    config: &'a Config,
    source: PixelSource,
    prototype: Option<Footprint>,
    chain: ChainState,
    preview_previous: Option<Point>,
}

impl<'a> SeriesPlacer<'a> {
    /// Creates a placer for one layout run.
    #[must_use]
    pub const fn new(config: &'a Config, source: PixelSource) -> Self {
        Self {
            config,
            source,
            prototype: None,
            chain: ChainState::new(),
            preview_previous: None,
        }
    }

    /// Current chain state.
    #[must_use]
    pub const fn chain(&self) -> &ChainState {
        &self.chain
    }

    /// Places one pixel at `point` (relative to the chain origin) with
    /// `orientation` in radians.
    ///
    /// With `allow_overlaps` false, a request within the overlap threshold
    /// of any footprint already on the board is merged into that footprint
    /// and nothing new is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the prototype cannot be loaded or routing fails.
    pub fn place_series_pixel(
        &mut self,
        board: &mut Board,
        point: Point,
        orientation: f64,
        allow_overlaps: bool,
    ) -> LayoutResult<Placement> {
        let config = self.config;
        let layout = &config.layout;
        let pixel = &config.pixel;
        let position = layout.origin + point;

        if !allow_overlaps {
            let resolver = OverlapResolver::from_config(layout);
            if let OverlapOutcome::Merged(merge) = resolver.resolve(board, position, orientation) {
                return Ok(Placement::Merged(merge));
            }
        }

        let reference = format!("{}{}", layout.reference_prefix, self.chain.sequence());
        if layout.preview_lines_only {
            return Ok(self.preview(board, reference, position));
        }
        let mut footprint = self.prototype()?.instantiate(&reference);

        tracing::info!(
            reference = %reference,
            point = %point,
            position = %position,
            orientation,
            "Placing pixel"
        );

        footprint.position = position;
        footprint.set_orientation_radians(orientation);
        footprint.reference_visible = !layout.hide_references;

        let ground = board.ensure_net(&pixel.ground_net);
        footprint.set_pad_net(&pixel.ground_pad, ground);
        let power = board.ensure_net(&pixel.power_net);
        footprint.set_pad_net(&pixel.power_pad, power);

        let uuid = board.add_footprint(footprint);
        let previous = self.chain.previous();
        self.chain.commit(uuid);

        let route = if config.routing.enabled {
            let router = ChainRouter::new(pixel, &config.routing);
            Some(router.route(board, uuid, previous)?)
        } else {
            None
        };

        Ok(Placement::Placed {
            footprint: uuid,
            reference,
            route,
        })
    }

    /// Breaks the chain: the next pixel is not connected to the previous one.
    pub fn series_discontinuity(&mut self) {
        tracing::debug!(next = self.chain.sequence(), "Series discontinuity");
        self.chain.discontinuity();
        self.preview_previous = None;
    }

    fn preview(&mut self, board: &mut Board, reference: String, position: Point) -> Placement {
        let drawing = &self.config.drawing;
        let line = match self.preview_previous.replace(position) {
            Some(previous) => {
                draw_segment(
                    board,
                    previous,
                    position,
                    drawing.preview_layer,
                    drawing.preview_line_width,
                );
                true
            }
            None => false,
        };
        tracing::info!(reference = %reference, position = %position, "Previewing pixel");
        self.chain.skip();
        Placement::Previewed { reference, line }
    }

    fn prototype(&mut self) -> BoardResult<&Footprint> {
        let prototype = match self.prototype.take() {
            Some(prototype) => prototype,
            None => {
                let mut prototype = self.source.load()?;
                prototype.layer = Layer::FrontCopper;
                prototype
            }
        };
        Ok(self.prototype.insert(prototype))
    }
}
