// src/extract/mod.rs
pub mod backend;
pub mod camelot;
pub mod command;
pub mod merge;
pub mod raw_table;
pub mod tabula;

use crate::config::DetectionConfig;
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::PipelineError;
use std::{collections::BTreeSet, path::Path};
use tracing::instrument;

pub use backend::{detect, BackendError, DetectionMode, TableDetector};
pub use camelot::CamelotDetector;
pub use merge::merge_tables;
pub use raw_table::{ColumnLabel, MergedTable, RawTable, Row};
pub use tabula::TabulaDetector;

/// One step of the cascade: a detector and the mode to run it in.
pub struct Strategy {
    pub detector: Box<dyn TableDetector>,
    pub mode: DetectionMode,
}

/// Ordered detection strategies, tried until one finds a table.
#[derive(Default)]
pub struct Cascade {
    strategies: Vec<Strategy>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, detector: Box<dyn TableDetector>, mode: DetectionMode) -> Self {
        self.strategies.push(Strategy { detector, mode });
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Camelot lattice, then Camelot stream, then tabula. Backends that are
    /// not installed are left out of the cascade entirely.
    pub fn from_config(config: &DetectionConfig, diag: &mut Diagnostics) -> Self {
        let mut cascade = Cascade::new();

        let camelot = CamelotDetector::new(&config.camelot_bin).with_timeout(config.timeout);
        if camelot.is_available() {
            cascade = cascade
                .push(
                    Box::new(
                        CamelotDetector::new(&config.camelot_bin).with_timeout(config.timeout),
                    ),
                    DetectionMode::Lattice,
                )
                .push(Box::new(camelot), DetectionMode::Stream);
        } else {
            diag.debug(
                Stage::Detection,
                format!("camelot ({}) not found; not registered", config.camelot_bin),
            );
        }

        match &config.tabula_jar {
            Some(jar) => {
                let tabula = TabulaDetector::new(&config.java_bin, jar).with_timeout(config.timeout);
                if tabula.is_available() {
                    cascade = cascade.push(Box::new(tabula), DetectionMode::Guess);
                } else {
                    diag.debug(
                        Stage::Detection,
                        format!(
                            "tabula ({} -jar {}) not runnable; not registered",
                            config.java_bin,
                            jar.display()
                        ),
                    );
                }
            }
            None => diag.debug(Stage::Detection, "TABULA_JAR not set; tabula not registered"),
        }

        if cascade.is_empty() {
            diag.warn(Stage::Detection, "no table-detection backend is installed");
        }
        cascade
    }

    /// Run strategies in order and merge the first non-empty result.
    ///
    /// Later strategies are never invoked once one has found a table.
    #[instrument(level = "info", skip(self, path, diag), fields(path = %path.display()))]
    pub fn extract_tables(
        &self,
        path: &Path,
        diag: &mut Diagnostics,
    ) -> Result<MergedTable, PipelineError> {
        for (idx, strategy) in self.strategies.iter().enumerate() {
            let tables = detect(strategy.detector.as_ref(), path, strategy.mode, diag);
            if tables.is_empty() {
                continue;
            }

            let count = tables.len();
            let pages = pages_covered(&tables);
            let merged = merge_tables(tables);
            diag.info(
                Stage::Cascade,
                format!(
                    "extracted {} rows across {} tables on {} with {} ({}), strategy {} of {}",
                    merged.num_rows(),
                    count,
                    pages,
                    strategy.detector.name(),
                    strategy.mode,
                    idx + 1,
                    self.strategies.len()
                ),
            );
            return Ok(merged);
        }

        diag.error(
            Stage::Cascade,
            format!(
                "all {} strategies found no tables in {}",
                self.strategies.len(),
                path.display()
            ),
        );
        Err(PipelineError::NoTablesFound {
            path: path.to_path_buf(),
        })
    }
}

/// "pages 1, 2" for the distinct pages the tables came from.
fn pages_covered(tables: &[RawTable]) -> String {
    let pages: BTreeSet<u32> = tables.iter().filter_map(|t| t.page).collect();
    if pages.is_empty() {
        return "unknown pages".to_string();
    }
    let list: Vec<String> = pages.iter().map(u32::to_string).collect();
    format!("{} {}", if pages.len() == 1 { "page" } else { "pages" }, list.join(", "))
}

#[cfg(test)]
mod tests {
    use super::backend::testing::{grid, FakeDetector};
    use super::*;
    use std::rc::Rc;

    /// Shares a fake between the cascade and the test so calls can be inspected.
    struct Shared(Rc<FakeDetector>);

    impl TableDetector for Shared {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn is_available(&self) -> bool {
            self.0.is_available()
        }
        fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<RawTable>, BackendError> {
            self.0.detect(path, mode)
        }
    }

    fn table(rows: usize) -> RawTable {
        let owned: Vec<Vec<String>> = (0..rows)
            .map(|i| vec![i.to_string(), "20250630".into(), "9001".into()])
            .collect();
        RawTable::from_grid(owned, Some(1))
    }

    #[test]
    fn test_lattice_hit_short_circuits() {
        let camelot = Rc::new(
            FakeDetector::new("camelot")
                .returning(DetectionMode::Lattice, vec![table(10), table(10)])
                .returning(DetectionMode::Stream, vec![table(50)]),
        );
        let tabula = Rc::new(FakeDetector::new("tabula").returning(DetectionMode::Guess, vec![table(99)]));
        let cascade = Cascade::new()
            .push(Box::new(Shared(camelot.clone())), DetectionMode::Lattice)
            .push(Box::new(Shared(camelot.clone())), DetectionMode::Stream)
            .push(Box::new(Shared(tabula.clone())), DetectionMode::Guess);
        let mut diag = Diagnostics::new();

        let merged = cascade.extract_tables(Path::new("two_pages.pdf"), &mut diag).unwrap();

        assert_eq!(merged.num_rows(), 20);
        assert_eq!(merged.num_columns(), 3);
        assert_eq!(camelot.calls(), vec![DetectionMode::Lattice]);
        assert!(tabula.calls().is_empty());
    }

    #[test]
    fn test_falls_through_failures_to_next_strategy() {
        let camelot = Rc::new(
            FakeDetector::new("camelot")
                .failing(DetectionMode::Lattice, "ghostscript missing")
                .returning(DetectionMode::Stream, vec![grid(&[&["", ""]])]),
        );
        let tabula = Rc::new(
            FakeDetector::new("tabula").returning(DetectionMode::Guess, vec![table(4), table(1)]),
        );
        let cascade = Cascade::new()
            .push(Box::new(Shared(camelot.clone())), DetectionMode::Lattice)
            .push(Box::new(Shared(camelot.clone())), DetectionMode::Stream)
            .push(Box::new(Shared(tabula.clone())), DetectionMode::Guess);
        let mut diag = Diagnostics::new();

        let merged = cascade.extract_tables(Path::new("in.pdf"), &mut diag).unwrap();

        assert_eq!(merged.num_rows(), 5);
        assert_eq!(
            camelot.calls(),
            vec![DetectionMode::Lattice, DetectionMode::Stream]
        );
        assert_eq!(tabula.calls(), vec![DetectionMode::Guess]);
        assert!(diag.contains(Stage::Detection, "ghostscript missing"));
    }

    #[test]
    fn test_success_reports_pages_covered() {
        let mut first = table(2);
        let mut second = table(3);
        let mut third = table(1);
        first.page = Some(4);
        second.page = Some(2);
        third.page = Some(4);
        let cascade = Cascade::new().push(
            Box::new(
                FakeDetector::new("camelot")
                    .returning(DetectionMode::Lattice, vec![first, second, third]),
            ),
            DetectionMode::Lattice,
        );
        let mut diag = Diagnostics::new();

        cascade.extract_tables(Path::new("in.pdf"), &mut diag).unwrap();

        assert!(diag.contains(Stage::Cascade, "6 rows across 3 tables on pages 2, 4"));
    }

    #[test]
    fn test_pages_covered_without_page_numbers() {
        let mut t = table(1);
        t.page = None;
        assert_eq!(pages_covered(&[t]), "unknown pages");
        assert_eq!(pages_covered(&[table(1)]), "page 1");
    }

    #[test]
    fn test_nothing_found_is_fatal() {
        let cascade = Cascade::new()
            .push(Box::new(FakeDetector::new("camelot")), DetectionMode::Lattice)
            .push(Box::new(FakeDetector::new("camelot")), DetectionMode::Stream)
            .push(Box::new(FakeDetector::new("tabula").unavailable()), DetectionMode::Guess);
        let mut diag = Diagnostics::new();

        let err = cascade
            .extract_tables(Path::new("scanned.pdf"), &mut diag)
            .unwrap_err();

        match err {
            PipelineError::NoTablesFound { path } => assert_eq!(path, Path::new("scanned.pdf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_cascade_finds_nothing() {
        let mut diag = Diagnostics::new();
        let err = Cascade::new()
            .extract_tables(Path::new("in.pdf"), &mut diag)
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoTablesFound { .. }));
    }

    #[test]
    fn test_from_config_skips_missing_backends() {
        let config = DetectionConfig {
            camelot_bin: "no-such-camelot-binary-91c2".into(),
            java_bin: "java".into(),
            tabula_jar: None,
            timeout: None,
        };
        let mut diag = Diagnostics::new();

        let cascade = Cascade::from_config(&config, &mut diag);

        assert!(cascade.is_empty());
        assert!(diag.contains(Stage::Detection, "not registered"));
    }
}
