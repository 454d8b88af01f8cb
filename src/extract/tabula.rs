//! tabula-java backend, used as the last resort of the cascade.

use crate::extract::backend::{BackendError, DetectionMode, TableDetector};
use crate::extract::command::{check_binary, run_tool};
use crate::extract::raw_table::RawTable;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

pub struct TabulaDetector {
    java: String,
    jar: PathBuf,
    timeout: Option<Duration>,
}

impl TabulaDetector {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            jar: jar.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TableDetector for TabulaDetector {
    fn name(&self) -> &str {
        "tabula"
    }

    fn is_available(&self) -> bool {
        self.jar.is_file() && check_binary(&self.java)
    }

    fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<RawTable>, BackendError> {
        if !self.jar.is_file() {
            return Err(BackendError::Unavailable(format!(
                "tabula jar {} not found",
                self.jar.display()
            )));
        }
        let scratch = TempDir::new()?;
        let out = scratch.path().join("tables.json");

        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar")
            .arg(&self.jar)
            .args(["--pages", "all", "--format", "JSON", "--outfile"])
            .arg(&out);
        match mode {
            DetectionMode::Lattice => cmd.arg("--lattice"),
            DetectionMode::Stream => cmd.arg("--stream"),
            DetectionMode::Guess => cmd.arg("--guess"),
        };
        cmd.arg(path);
        run_tool("tabula", cmd, scratch.path(), self.timeout)?;

        let json = std::fs::read_to_string(&out)?;
        parse_json(&json).map_err(|e| BackendError::ParseFailure {
            backend: "tabula".to_string(),
            message: format!("unreadable JSON output: {}", e),
        })
    }
}

/// Convert tabula's JSON export into raw tables, one per detected region.
pub(crate) fn parse_json(json: &str) -> Result<Vec<RawTable>, serde_json::Error> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tables: Vec<TabulaTable> = serde_json::from_str(json)?;
    Ok(tables
        .into_iter()
        .map(|t| {
            let grid = t
                .data
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.text).collect())
                .collect();
            RawTable::from_grid(grid, t.page_number)
        })
        .collect())
}
