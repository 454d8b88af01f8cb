// src/load/mod.rs
pub mod duck;
pub mod snapshot;

use crate::config::StoreConfig;
use crate::error::PipelineError;
use crate::transform::CleanTable;
use anyhow::Result;
use tracing::{instrument, warn};

pub use duck::DuckDbSink;
pub use snapshot::write_parquet;

/// Somewhere a clean table can be appended to.
///
/// The target must already exist with a compatible schema. A write either
/// lands completely or not at all.
pub trait TableSink {
    /// Append every row of `table`, returning the number of rows written.
    fn append(&mut self, table: &CleanTable, table_name: &str) -> Result<u64>;
}

/// Append `table` to the store named by `config`.
///
/// The store connection lives only for the duration of this call.
#[instrument(level = "info", skip_all, fields(table = %config.table_name, rows = table.num_rows()))]
pub fn load_clean_table(table: &CleanTable, config: &StoreConfig) -> Result<u64, PipelineError> {
    if table.is_empty() {
        warn!("received empty table; nothing to load");
        return Ok(0);
    }
    let mut sink =
        DuckDbSink::open(&config.store_path, config.batch_size).map_err(PipelineError::Persistence)?;
    append_to(&mut sink, table, &config.table_name)
}

/// Run one append against any sink, folding its failure into [`PipelineError`].
pub fn append_to(
    sink: &mut dyn TableSink,
    table: &CleanTable,
    table_name: &str,
) -> Result<u64, PipelineError> {
    sink.append(table, table_name)
        .map_err(PipelineError::Persistence)
}
