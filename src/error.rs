use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "no tables could be extracted from {}; ensure the PDF has structured tables and that a detection backend is installed",
        .path.display()
    )]
    NoTablesFound { path: PathBuf },

    #[error("failed to build the typed table: {0}")]
    Table(#[from] arrow::error::ArrowError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load data into the store: {0:#}")]
    Persistence(anyhow::Error),
}

/// Problems with the environment-provided configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set (example: duckdb:///var/lib/pdf2db/store.duckdb)")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported store {0:?}; expected duckdb://<path> or the path of an existing DuckDB file")]
    UnsupportedStore(String),
}
