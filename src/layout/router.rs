//! Fixed-topology routing between consecutive pixels of a chain.
//!
//! Each newly placed pixel gets:
//!
//! - a ground stub from its ground pad, pointing along `−π/2 − θ` and
//!   ending in a via;
//! - a +5V stub from its +5V pad, pointing along `π/2 − θ`;
//!
//! and, when a previous pixel exists:
//!
//! - a +5V carry-forward track from the previous stub end to the new one;
//! - one direct track per chain-link pad pair (previous pad → mapped pad).

use std::f64::consts::FRAC_PI_2;

use uuid::Uuid;

use super::error::{LayoutError, LayoutResult};
use crate::board::{Board, BoardError, Footprint, NetCode, Track, Via};
use crate::config::{PixelConfig, RoutingConfig};
use crate::geometry::Point;

/// Counts of items emitted for one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteSummary {
    /// Ground and +5V stubs.
    pub stubs: usize,
    /// Ground vias.
    pub vias: usize,
    /// +5V carry-forward tracks.
    pub carry_forward: usize,
    /// Chain-link tracks.
    pub links: usize,
}

impl RouteSummary {
    /// Total number of tracks emitted.
    #[must_use]
    pub const fn tracks(&self) -> usize {
        self.stubs + self.carry_forward + self.links
    }
}

/// Emits the chain's power, ground and data tracks.
#[derive(Debug, Clone, Copy)]
pub struct ChainRouter<'a> {
    pixel: &'a PixelConfig,
    routing: &'a RoutingConfig,
}

enum Item {
    Track(Track),
    Via(Via),
}

impl<'a> ChainRouter<'a> {
    /// Creates a router for the configured pad roles and copper settings.
    #[must_use]
    pub const fn new(pixel: &'a PixelConfig, routing: &'a RoutingConfig) -> Self {
        Self { pixel, routing }
    }

    /// End of the ground stub for a pad at `pad` on a footprint rotated `orientation` radians.
    #[must_use]
    pub fn ground_stub_end(&self, pad: Point, orientation: f64) -> Point {
        pad.polar_translated(self.routing.ground_stub_length, -FRAC_PI_2 - orientation)
    }

    /// End of the +5V stub for a pad at `pad` on a footprint rotated `orientation` radians.
    #[must_use]
    pub fn power_stub_end(&self, pad: Point, orientation: f64) -> Point {
        pad.polar_translated(self.routing.power_stub_length, FRAC_PI_2 - orientation)
    }

    /// Routes the footprint `current`, connecting it to `previous` when given.
    ///
    /// No duplicate detection is done: routing the same footprint twice
    /// emits its tracks twice.
    ///
    /// # Errors
    ///
    /// Returns an error if either footprint is not on the board, or if a
    /// footprint lacks its ground or +5V pad.
    pub fn route(
        &self,
        board: &mut Board,
        current: Uuid,
        previous: Option<Uuid>,
    ) -> LayoutResult<RouteSummary> {
        let footprint = board
            .footprint(current)
            .ok_or_else(|| BoardError::unknown_footprint(current))?;
        let previous = previous
            .map(|uuid| {
                board
                    .footprint(uuid)
                    .ok_or_else(|| BoardError::unknown_footprint(uuid))
            })
            .transpose()?;

        let mut summary = RouteSummary::default();
        let items = self.plan(footprint, previous, &mut summary)?;

        for item in items {
            match item {
                Item::Track(track) => {
                    board.add_track(track);
                }
                Item::Via(via) => {
                    board.add_via(via);
                }
            }
        }

        Ok(summary)
    }

    fn plan(
        &self,
        footprint: &Footprint,
        previous: Option<&Footprint>,
        summary: &mut RouteSummary,
    ) -> LayoutResult<Vec<Item>> {
        for role in [&self.pixel.ground_pad, &self.pixel.power_pad] {
            if footprint.pad(role).is_none() {
                return Err(LayoutError::missing_pad(&footprint.reference, role.as_str()));
            }
        }

        let orientation = footprint.orientation_radians();
        let previous_power_end = previous
            .map(|prev| {
                prev.pad(&self.pixel.power_pad)
                    .map(|pad| self.power_stub_end(pad.position, prev.orientation_radians()))
                    .ok_or_else(|| {
                        LayoutError::missing_pad(&prev.reference, self.pixel.power_pad.as_str())
                    })
            })
            .transpose()?;

        let mut items = Vec::new();

        for pad in footprint.pads() {
            if pad.name == self.pixel.ground_pad {
                let end = self.ground_stub_end(pad.position, orientation);
                items.push(Item::Track(self.track(pad.position, end, pad.net)));
                items.push(Item::Via(Via::with_layers(
                    end,
                    self.routing.via_drill,
                    self.routing.via_diameter,
                    self.routing.via_layers,
                    pad.net,
                )));
                summary.stubs += 1;
                summary.vias += 1;
            } else if pad.name == self.pixel.power_pad {
                let end = self.power_stub_end(pad.position, orientation);
                items.push(Item::Track(self.track(pad.position, end, pad.net)));
                summary.stubs += 1;
                if let Some(prev_end) = previous_power_end {
                    items.push(Item::Track(self.track(prev_end, end, pad.net)));
                    summary.carry_forward += 1;
                }
            }
        }

        if let Some(prev) = previous {
            for prev_pad in prev.pads() {
                let Some(target) = self.pixel.chain_links.get(prev_pad.name) else {
                    continue;
                };
                let mut linked = false;
                for pad in footprint.pads().filter(|p| p.name == target) {
                    tracing::debug!(
                        from = %prev.reference,
                        from_pad = prev_pad.name,
                        to = %footprint.reference,
                        to_pad = pad.name,
                        "Linking chain pads"
                    );
                    items.push(Item::Track(self.track(prev_pad.position, pad.position, pad.net)));
                    summary.links += 1;
                    linked = true;
                }
                if !linked {
                    tracing::warn!(
                        reference = %footprint.reference,
                        pad = %target,
                        "Chain-link target pad missing, link skipped"
                    );
                }
            }
        }

        Ok(items)
    }

    fn track(&self, start: Point, end: Point, net: NetCode) -> Track {
        Track::new(
            start,
            end,
            self.routing.trace_layer,
            self.routing.trace_width,
            net,
        )
    }
}
