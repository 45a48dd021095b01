//! Error taxonomy for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Per-stage pipeline error.
///
/// Every variant is a per-unit failure: the batch loop records it in the
/// unit's report and moves on to the next icon. All failures here are
/// deterministic for a given input, so there is no retry policy.
#[derive(Debug, Error)]
pub enum StageError {
    /// Source raster or mask unreadable or absent.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Zero-area crop after clamping, or a size/channel mismatch that
    /// cannot be normalized.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Output raster could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageError::Load { .. } => ErrorKind::Load,
            StageError::Dimension(_) => ErrorKind::Dimension,
            StageError::Write { .. } => ErrorKind::Write,
        }
    }
}

/// Machine-readable error class carried in per-icon reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Load,
    Dimension,
    Write,
}
