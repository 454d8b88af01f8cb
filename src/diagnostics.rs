use std::fmt;
use tracing::{debug, error, info, warn};

/// Pipeline stage that emitted a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Detection,
    Cascade,
    Headers,
    Repair,
    Coercion,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Detection => "detection",
            Stage::Cascade => "cascade",
            Stage::Headers => "headers",
            Stage::Repair => "repair",
            Stage::Coercion => "coercion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub stage: Stage,
    pub message: String,
}

/// Sink for the non-fatal problems each stage runs into.
///
/// Every recorded entry is kept for later inspection and also forwarded to
/// `tracing` with a `stage` field, so a run is observable both through the
/// process log and through the returned entries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: Level, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Debug => debug!(stage = %stage, "{}", message),
            Level::Info => info!(stage = %stage, "{}", message),
            Level::Warn => warn!(stage = %stage, "{}", message),
            Level::Error => error!(stage = %stage, "{}", message),
        }
        self.entries.push(Diagnostic {
            level,
            stage,
            message,
        });
    }

    pub fn debug(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Level::Debug, stage, message);
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Level::Info, stage, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Level::Warn, stage, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Level::Error, stage, message);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn at_stage(&self, stage: Stage) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.stage == stage)
    }

    /// True if any entry from `stage` mentions `needle`.
    pub fn contains(&self, stage: Stage, needle: &str) -> bool {
        self.at_stage(stage).any(|d| d.message.contains(needle))
    }
}
