//! Run reporting for skipped files and degraded stages
//!
//! The pipeline never aborts on a single bad source file, and several stages
//! fall back to a cruder path instead of failing. Both kinds of degradation are
//! recorded here so callers (and tests) can see exactly what the final document
//! is missing.

use std::path::{Path, PathBuf};

/// A source file that was dropped from the final document.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Collects every skipped file and every fallback taken during one generation run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub skipped: Vec<SkippedFile>,
    pub fallbacks: Vec<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file that will not appear in the final document.
    pub fn record_skipped(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("skipping {}: {}", path.display(), reason);
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Record a stage that degraded to a fallback path.
    pub fn record_fallback(&mut self, stage: impl Into<String>) {
        let stage = stage.into();
        log::warn!("fallback: {}", stage);
        self.fallbacks.push(stage);
    }

    /// True when nothing was skipped and no fallback was taken.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.fallbacks.is_empty()
    }
}
