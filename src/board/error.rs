//! Error types for board document and footprint library operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur while loading, editing, or saving a board.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Failed to open or read a file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A document could not be parsed.
    #[error("Failed to parse {path}")]
    Parse {
        /// Path to the document.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The board could not be serialised.
    #[error("Failed to serialise board document")]
    Serialize {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The pre-save backup rename failed; the original document is untouched.
    #[error("Failed to back up {path} to {backup}")]
    Backup {
        /// Document being saved.
        path: PathBuf,
        /// Backup destination.
        backup: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Footprint library directory does not exist.
    #[error("Footprint library not found: {path}")]
    LibraryNotFound {
        /// Library directory.
        path: PathBuf,
    },

    /// Named footprint is not present in the library.
    #[error(
        "Footprint '{name}' not found in library {library} (available: {})",
        available.join(", ")
    )]
    FootprintNotFound {
        /// Footprint name.
        name: String,
        /// Library directory.
        library: PathBuf,
        /// Footprints the library does hold.
        available: Vec<String>,
    },

    /// No footprint on the board has the given identity.
    #[error("Unknown footprint: {id}")]
    UnknownFootprint {
        /// Footprint identity.
        id: String,
    },

    /// A reference pattern failed to compile.
    #[error("Invalid reference pattern '{pattern}'")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl BoardError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Creates a footprint-not-found error.
    pub fn footprint_not_found(
        name: impl Into<String>,
        library: impl Into<PathBuf>,
        available: Vec<String>,
    ) -> Self {
        Self::FootprintNotFound {
            name: name.into(),
            library: library.into(),
            available,
        }
    }

    /// Creates an unknown footprint error.
    pub fn unknown_footprint(id: impl ToString) -> Self {
        Self::UnknownFootprint { id: id.to_string() }
    }
}
