use crate::diagnostics::{Diagnostics, Stage};
use crate::extract::raw_table::RawTable;
use std::{fmt, path::Path, time::Duration};
use thiserror::Error;

/// How a backend should look for table regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionMode {
    /// Visible ruling lines delimit the cells.
    Lattice,
    /// Cells are separated by whitespace gaps.
    Stream,
    /// The backend picks its own heuristic.
    Guess,
}

impl DetectionMode {
    pub fn as_str(&self) -> &str {
        match self {
            DetectionMode::Lattice => "lattice",
            DetectionMode::Stream => "stream",
            DetectionMode::Guess => "guess",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures inside a backend. These never leave the detection layer.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("{backend} failed to parse the document: {message}")]
    ParseFailure { backend: String, message: String },

    #[error("{backend} did not finish within {timeout:?}")]
    TimedOut { backend: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A table-detection engine.
///
/// `detect` is one blocking, uninterruptible call over the whole document.
pub trait TableDetector {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<RawTable>, BackendError>;
}

/// Run one detector and report what it found.
///
/// Unavailability and backend failures are downgraded to "no tables" with a
/// diagnostic; empty regions are dropped before returning.
pub fn detect(
    detector: &dyn TableDetector,
    path: &Path,
    mode: DetectionMode,
    diag: &mut Diagnostics,
) -> Vec<RawTable> {
    if !detector.is_available() {
        diag.debug(
            Stage::Detection,
            format!("{} is not available; skipping {} detection", detector.name(), mode),
        );
        return Vec::new();
    }

    diag.info(
        Stage::Detection,
        format!(
            "extracting tables with {} ({}) from {}",
            detector.name(),
            mode,
            path.display()
        ),
    );
    match detector.detect(path, mode) {
        Ok(tables) => {
            let found = tables.len();
            let kept: Vec<RawTable> = tables.into_iter().filter(|t| !t.is_empty()).collect();
            if kept.len() < found {
                diag.debug(
                    Stage::Detection,
                    format!(
                        "{} ({}) dropped {} empty table(s)",
                        detector.name(),
                        mode,
                        found - kept.len()
                    ),
                );
            }
            kept
        }
        Err(BackendError::Unavailable(what)) => {
            diag.debug(
                Stage::Detection,
                format!("{} ({}) unavailable: {}", detector.name(), mode, what),
            );
            Vec::new()
        }
        Err(e) => {
            diag.warn(
                Stage::Detection,
                format!("{} ({}) extraction failed: {}", detector.name(), mode, e),
            );
            Vec::new()
        }
    }
}
