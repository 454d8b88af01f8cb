//! Camelot CLI backend: `lattice` for ruled tables, `stream` for
//! whitespace-aligned ones.

use crate::extract::backend::{BackendError, DetectionMode, TableDetector};
use crate::extract::command::{check_binary, run_tool};
use crate::extract::raw_table::RawTable;
use anyhow::Context;
use csv::ReaderBuilder;
use glob::glob;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};
use tempfile::TempDir;
use tracing::debug;

/// Camelot names its exports `<root>-page-<p>-table-<n>.csv`.
static EXPORT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-page-(\d+)-table-(\d+)\.csv$").expect("valid regex"));

pub struct CamelotDetector {
    binary: String,
    timeout: Option<Duration>,
}

impl CamelotDetector {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn flavor(mode: DetectionMode) -> &'static str {
        match mode {
            DetectionMode::Lattice => "lattice",
            // camelot has no guessing mode; stream is its permissive one
            DetectionMode::Stream | DetectionMode::Guess => "stream",
        }
    }
}

impl TableDetector for CamelotDetector {
    fn name(&self) -> &str {
        "camelot"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }

    fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<RawTable>, BackendError> {
        let scratch = TempDir::new()?;
        let out_root = scratch.path().join("tables.csv");

        let mut cmd = Command::new(&self.binary);
        cmd.args(["--pages", "all", "--format", "csv", "--output"])
            .arg(&out_root)
            .arg(Self::flavor(mode))
            .arg(path);
        run_tool("camelot", cmd, scratch.path(), self.timeout)?;

        read_exports(scratch.path()).map_err(|e| BackendError::ParseFailure {
            backend: "camelot".to_string(),
            message: format!("{:#}", e),
        })
    }
}

/// Collect every exported CSV in `dir`, ordered by page then table number.
fn read_exports(dir: &Path) -> anyhow::Result<Vec<RawTable>> {
    let pattern = format!("{}/*.csv", dir.display());
    let mut exports: Vec<(u32, u32, PathBuf)> = Vec::new();
    for entry in glob(&pattern).context("invalid glob pattern for camelot exports")? {
        let path = entry?;
        let name = path.file_name().and_then(|f| f.to_str()).unwrap_or_default();
        let Some(caps) = EXPORT_NAME.captures(name) else {
            debug!(file = %path.display(), "ignoring unexpected camelot output");
            continue;
        };
        let page: u32 = caps[1].parse()?;
        let order: u32 = caps[2].parse()?;
        exports.push((page, order, path));
    }
    exports.sort();

    exports
        .into_iter()
        .map(|(page, _, path)| {
            let data = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_csv(&data, Some(page))
                .with_context(|| format!("CSV parse error in {}", path.display()))
        })
        .collect()
}

/// Camelot writes its frames headerless with every cell quoted.
pub(crate) fn parse_csv(data: &[u8], page: Option<u32>) -> anyhow::Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut grid = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("bad record {}", idx))?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::from_grid(grid, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[test]
    fn test_parse_csv_keeps_embedded_newlines() -> Result<()> {
        let data = b"\"row_number\",\"as_of_date\",\"customer_code\"\n\"1\",\"20250630\",\"10023\"\n\"2\",\"\",\"Acme\nHoldings\"\n";
        let table = parse_csv(data, Some(1))?;

        assert_eq!(table.width(), 3);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2][1], None);
        assert_eq!(table.rows[2][2].as_deref(), Some("Acme\nHoldings"));
        Ok(())
    }

    #[test]
    fn test_read_exports_orders_by_page_and_table() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("tables-page-10-table-1.csv"), "\"c\"\n")?;
        fs::write(dir.path().join("tables-page-2-table-2.csv"), "\"b\"\n")?;
        fs::write(dir.path().join("tables-page-2-table-1.csv"), "\"a\"\n")?;
        fs::write(dir.path().join("notes.csv"), "\"zzz\"\n")?;

        let tables = read_exports(dir.path())?;

        let firsts: Vec<_> = tables
            .iter()
            .map(|t| (t.page, t.rows[0][0].clone().unwrap_or_default()))
            .collect();
        assert_eq!(
            firsts,
            vec![
                (Some(2), "a".to_string()),
                (Some(2), "b".to_string()),
                (Some(10), "c".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_flavor_mapping() {
        assert_eq!(CamelotDetector::flavor(DetectionMode::Lattice), "lattice");
        assert_eq!(CamelotDetector::flavor(DetectionMode::Stream), "stream");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let det = CamelotDetector::new("no-such-camelot-binary-91c2");
        assert!(!det.is_available());
        let err = det
            .detect(Path::new("in.pdf"), DetectionMode::Lattice)
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }
}
