//! Error types for the course binder library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the course binder library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Single-file conversion failure. Callers skip the file and continue.
    #[error("conversion failed for {}: {}", .path.display(), .reason)]
    Conversion { path: PathBuf, reason: String },

    /// Single-artifact normalization failure. Callers keep the original artifact.
    #[error("normalization failed for {}: {}", .path.display(), .reason)]
    Normalization { path: PathBuf, reason: String },

    /// Merge failure. Fatal only once both the batched and direct paths have failed.
    #[error("merge failed: {0}")]
    Merge(String),

    /// Outline attachment failure. The merged document is still a valid deliverable.
    #[error("bookmark error: {0}")]
    Bookmark(String),

    /// The course has no downloads directory to read from
    #[error("downloads directory not found: {}", .0.display())]
    MissingDownloads(PathBuf),

    /// Nothing under the downloads directory produced a content artifact
    #[error("no content files found under {}", .0.display())]
    NoContent(PathBuf),

    /// File not found
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Date parsing error
    #[error("invalid date expression: {0}")]
    InvalidDate(String),

    /// General error
    #[error("{0}")]
    General(String),
}
