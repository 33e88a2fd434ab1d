//! Error types for layout runs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::board::BoardError;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that abort a layout run.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The board model rejected an operation.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A polygon drawing request was malformed.
    #[error("Invalid polygon '{spec}': {message}")]
    InvalidPolygon {
        /// The polygon specification as given.
        spec: String,
        /// Description of what's wrong.
        message: String,
    },

    /// A circle drawing request was malformed.
    #[error("Invalid circle '{spec}': {message}")]
    InvalidCircle {
        /// The circle specification as given.
        spec: String,
        /// Description of what's wrong.
        message: String,
    },

    /// A placement plan step is unusable.
    #[error("Invalid plan step {step}: {message}")]
    InvalidPlan {
        /// Zero-based index of the step.
        step: usize,
        /// Description of what's wrong.
        message: String,
    },

    /// The placement plan file could not be read.
    #[error("Failed to read plan: {path}")]
    PlanRead {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The placement plan file could not be parsed.
    #[error("Failed to parse plan: {path}")]
    PlanParse {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A committed footprint lacks a pad the router needs.
    #[error("Footprint {reference} has no pad named '{pad}'")]
    MissingPad {
        /// Reference of the footprint.
        reference: String,
        /// Pad name that was expected.
        pad: String,
    },

    /// Short-trace deletion removes vias along with the traces, so it is refused.
    #[error("Short trace deletion is disabled: it also removes vias")]
    ShortTraceDeletionDisabled,
}

impl LayoutError {
    /// Creates an invalid polygon error.
    pub fn invalid_polygon(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPolygon {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid circle error.
    pub fn invalid_circle(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCircle {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid plan error.
    pub fn invalid_plan(step: usize, message: impl Into<String>) -> Self {
        Self::InvalidPlan {
            step,
            message: message.into(),
        }
    }

    /// Creates a missing pad error.
    pub fn missing_pad(reference: impl Into<String>, pad: impl Into<String>) -> Self {
        Self::MissingPad {
            reference: reference.into(),
            pad: pad.into(),
        }
    }
}
