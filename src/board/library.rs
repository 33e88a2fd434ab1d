//! Footprint library access.
//!
//! A library is a directory holding one JSON prototype per footprint,
//! named `<footprint>.json`:
//!
//! ```text
//! kicad_footprints.pretty/
//! ├── LED-SK9822-EC20.json
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use super::error::{BoardError, BoardResult};
use super::footprint::Footprint;

/// A directory of footprint prototypes.
#[derive(Debug, Clone)]
pub struct FootprintLibrary {
    path: PathBuf,
}

impl FootprintLibrary {
    /// Opens a library directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn open(path: impl Into<PathBuf>) -> BoardResult<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(BoardError::LibraryNotFound { path });
        }
        Ok(Self { path })
    }

    /// Library directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists the footprint names in the library, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let dir = glob::Pattern::escape(&self.path.to_string_lossy());
        let pattern = format!("{dir}/*.json");

        let Ok(entries) = glob::glob(&pattern) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }

    /// Loads the footprint prototype called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the footprint is missing or cannot be parsed.
    pub fn load(&self, name: &str) -> BoardResult<Footprint> {
        let file = self.path.join(format!("{name}.json"));
        if !file.is_file() {
            return Err(BoardError::footprint_not_found(
                name,
                &self.path,
                self.names(),
            ));
        }

        let contents =
            std::fs::read_to_string(&file).map_err(|e| BoardError::file_read(&file, e))?;
        let footprint: Footprint =
            serde_json::from_str(&contents).map_err(|e| BoardError::parse(&file, e))?;

        tracing::info!(
            footprint = name,
            pads = footprint.pads.len(),
            library = %self.path.display(),
            "Loaded footprint prototype"
        );

        Ok(footprint)
    }
}
