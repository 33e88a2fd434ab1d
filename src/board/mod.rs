//! Board document model.
//!
//! A [`Board`] holds the subset of a PCB design the layout engine works
//! with: nets, footprints (with pads), copper tracks, vias and graphic
//! drawings. Boards are stored as JSON documents.
//!
//! # Document Structure
//!
//! ```text
//! {
//!   "generator": "pixel-layout",
//!   "saved_at": "2026-01-01T00:00:00+00:00",
//!   "nets":       [{ "code": 0, "name": "" }, ...],
//!   "footprints": [{ "uuid", "reference", "footprint", "position", "orientation", "pads": [...] }],
//!   "tracks":     [{ "uuid", "start", "end", "layer", "width", "net" }],
//!   "vias":       [{ "uuid", "position", "drill", "diameter", "layers", "net" }],
//!   "drawings":   [{ "kind": "segment", ... }]
//! }
//! ```
//!
//! Orientation is stored in tenths of a degree. All lengths are in mm.
//!
//! # Saving
//!
//! [`Board::save`] renames the existing document to a `.layoutbak` sibling
//! (replacing any previous backup) before writing the new one.

pub mod error;
pub mod footprint;
pub mod library;
pub mod primitives;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::{BoardError, BoardResult};
pub use footprint::{Footprint, Pad, PlacedPad};
pub use library::FootprintLibrary;
pub use primitives::{Drawing, Layer, Net, NetCode, Track, Via};

/// Extension appended to a board path to form its backup path.
pub const BACKUP_EXTENSION: &str = "layoutbak";

/// An in-memory board document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Tool that last wrote the document.
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Timestamp of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,

    #[serde(default)]
    nets: Vec<Net>,

    #[serde(default)]
    footprints: Vec<Footprint>,

    #[serde(default)]
    tracks: Vec<Track>,

    #[serde(default)]
    vias: Vec<Via>,

    #[serde(default)]
    drawings: Vec<Drawing>,
}

fn default_generator() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board containing only the unconnected net.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self {
            generator: default_generator(),
            saved_at: None,
            nets: Vec::new(),
            footprints: Vec::new(),
            tracks: Vec::new(),
            vias: Vec::new(),
            drawings: Vec::new(),
        };
        board.ensure_unconnected_net();
        board
    }

    /// Reads a board document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> BoardResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| BoardError::file_read(path, e))?;
        let mut board: Self =
            serde_json::from_str(&contents).map_err(|e| BoardError::parse(path, e))?;
        board.ensure_unconnected_net();

        tracing::info!(
            path = %path.display(),
            footprints = board.footprints.len(),
            tracks = board.tracks.len(),
            vias = board.vias.len(),
            "Read board"
        );

        Ok(board)
    }

    /// Writes the board to `path`, backing up any existing document first.
    ///
    /// The existing file is renamed to `<path>.layoutbak` (an older backup is
    /// removed). If writing the new document fails the backup is moved back
    /// into place before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation, the backup rename, or the write fails.
    pub fn save(&mut self, path: impl AsRef<Path>) -> BoardResult<()> {
        self.save_with(path.as_ref(), |path, json| std::fs::write(path, json))
    }

    /// Saves through `write`, which puts the serialised document at its path.
    fn save_with(
        &mut self,
        path: &Path,
        write: impl FnOnce(&Path, &str) -> std::io::Result<()>,
    ) -> BoardResult<()> {
        self.generator = default_generator();
        self.saved_at = Some(chrono::Utc::now().to_rfc3339());
        let json =
            serde_json::to_string_pretty(self).map_err(|source| BoardError::Serialize { source })?;

        let backup = backup_path(path);
        let backup_error = |source| BoardError::Backup {
            path: path.to_path_buf(),
            backup: backup.clone(),
            source,
        };

        let backed_up = path.exists();
        if backed_up {
            if backup.exists() {
                std::fs::remove_file(&backup).map_err(backup_error)?;
            }
            std::fs::rename(path, &backup).map_err(backup_error)?;
            tracing::info!(
                path = %path.display(),
                backup = %backup.display(),
                "Backed up board"
            );
        }

        if let Err(e) = write(path, json.as_str()) {
            if backed_up {
                if let Err(restore) = std::fs::rename(&backup, path) {
                    tracing::error!(
                        backup = %backup.display(),
                        error = %restore,
                        "Failed to restore board from backup"
                    );
                }
            }
            return Err(BoardError::file_write(path, e));
        }

        tracing::info!(path = %path.display(), "Saved board");
        Ok(())
    }

    fn ensure_unconnected_net(&mut self) {
        if !self.nets.iter().any(|n| n.code.is_unconnected()) {
            self.nets.insert(
                0,
                Net {
                    code: NetCode::UNCONNECTED,
                    name: String::new(),
                },
            );
        }
    }

    // Nets

    /// Returns all nets.
    #[must_use]
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Looks up a net by name.
    #[must_use]
    pub fn net_by_name(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }

    /// Returns the name of the net with `code`, or an empty string.
    #[must_use]
    pub fn net_name(&self, code: NetCode) -> &str {
        self.nets
            .iter()
            .find(|n| n.code == code)
            .map_or("", |n| n.name.as_str())
    }

    /// Returns the code of the net called `name`, creating it if needed.
    pub fn ensure_net(&mut self, name: &str) -> NetCode {
        if let Some(net) = self.net_by_name(name) {
            return net.code;
        }
        let code = NetCode(self.nets.iter().map(|n| n.code.0).max().unwrap_or(0) + 1);
        self.nets.push(Net {
            code,
            name: name.to_string(),
        });
        tracing::debug!(net = name, code = code.0, "Created net");
        code
    }

    // Footprints

    /// Returns all footprints in board order.
    #[must_use]
    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    /// Returns all footprints mutably.
    pub fn footprints_mut(&mut self) -> impl Iterator<Item = &mut Footprint> {
        self.footprints.iter_mut()
    }

    /// Finds a footprint by identity.
    #[must_use]
    pub fn footprint(&self, uuid: Uuid) -> Option<&Footprint> {
        self.footprints.iter().find(|f| f.uuid == uuid)
    }

    /// Finds a footprint by identity, mutably.
    pub fn footprint_mut(&mut self, uuid: Uuid) -> Option<&mut Footprint> {
        self.footprints.iter_mut().find(|f| f.uuid == uuid)
    }

    /// Finds a footprint by reference designator.
    #[must_use]
    pub fn footprint_by_reference(&self, reference: &str) -> Option<&Footprint> {
        self.footprints.iter().find(|f| f.reference == reference)
    }

    /// Adds a footprint and returns its identity.
    pub fn add_footprint(&mut self, footprint: Footprint) -> Uuid {
        let uuid = footprint.uuid;
        self.footprints.push(footprint);
        uuid
    }

    /// Removes every footprint whose reference matches `pattern`.
    pub fn remove_footprints_matching(&mut self, pattern: &Regex) -> Vec<Footprint> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.footprints)
            .into_iter()
            .partition(|f| pattern.is_match(&f.reference));
        self.footprints = kept;
        removed
    }

    // Tracks and vias

    /// Returns all copper tracks.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Returns all copper tracks mutably.
    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    /// Adds a track and returns its identity.
    pub fn add_track(&mut self, track: Track) -> Uuid {
        tracing::debug!(
            start = %track.start,
            end = %track.end,
            net = self.net_name(track.net),
            "Adding track"
        );
        let uuid = track.uuid;
        self.tracks.push(track);
        uuid
    }

    /// Returns all vias.
    #[must_use]
    pub fn vias(&self) -> &[Via] {
        &self.vias
    }

    /// Adds a via and returns its identity.
    pub fn add_via(&mut self, via: Via) -> Uuid {
        tracing::debug!(
            position = %via.position,
            net = self.net_name(via.net),
            "Adding via"
        );
        let uuid = via.uuid;
        self.vias.push(via);
        uuid
    }

    /// Deletes every track and via, returning how many items were removed.
    pub fn delete_all_tracks(&mut self) -> usize {
        let count = self.tracks.len() + self.vias.len();
        self.tracks.clear();
        self.vias.clear();
        count
    }

    // Drawings

    /// Returns all graphic drawings.
    #[must_use]
    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    /// Adds a graphic drawing.
    pub fn add_drawing(&mut self, drawing: Drawing) {
        self.drawings.push(drawing);
    }

    /// Deletes drawings on `layer`, or all drawings when `layer` is `None`.
    pub fn delete_drawings(&mut self, layer: Option<Layer>) -> usize {
        let before = self.drawings.len();
        self.drawings
            .retain(|d| layer.is_some_and(|layer| d.layer() != layer));
        before - self.drawings.len()
    }
}

/// Returns the backup path used when saving `path`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    path.with_file_name(name)
}

/// Compiles a footprint reference pattern.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn reference_pattern(pattern: &str) -> BoardResult<Regex> {
    Regex::new(pattern).map_err(|source| BoardError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
