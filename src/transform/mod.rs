// src/transform/mod.rs
pub mod convert;
pub mod date_parser;
pub mod headers;
pub mod repair;
pub mod utils;

use crate::diagnostics::{Diagnostics, Stage};
use crate::extract::MergedTable;
use arrow::{error::ArrowError, record_batch::RecordBatch, util::pretty::pretty_format_batches};
use tracing::instrument;

pub use headers::{canonical_name, normalize_headers};

/// Business columns the target table expects, in load order.
pub const EXPECTED_COLUMNS: [&str; 4] = [
    "row_number",
    "as_of_date",
    "customer_code",
    "date_of_restructure",
];

/// The typed table handed to persistence.
#[derive(Clone, Debug)]
pub struct CleanTable {
    pub batch: RecordBatch,
    /// Expected business columns that were not found.
    pub missing_columns: Vec<String>,
}

impl CleanTable {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// First `n` rows as an ASCII table.
    pub fn preview(&self, n: usize) -> Result<String, ArrowError> {
        let head = self.batch.slice(0, n.min(self.batch.num_rows()));
        Ok(pretty_format_batches(&[head])?.to_string())
    }
}

/// Split compound fields and coerce the business columns.
///
/// Conversion problems only ever produce nulls plus diagnostics.
pub fn repair_and_coerce(
    table: MergedTable,
    diag: &mut Diagnostics,
) -> Result<CleanTable, ArrowError> {
    let table = repair::split_row_number_from_date(table, diag);

    let missing_columns: Vec<String> = EXPECTED_COLUMNS
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing_columns.is_empty() {
        diag.warn(
            Stage::Coercion,
            format!("missing expected columns: {}", missing_columns.join(", ")),
        );
    }

    let batch = convert::convert_to_final_types(&table, diag)?;
    Ok(CleanTable {
        batch,
        missing_columns,
    })
}

/// Header normalization followed by field repair and coercion.
#[instrument(level = "info", skip_all, fields(rows = table.num_rows(), columns = table.num_columns()))]
pub fn transform_table(
    table: MergedTable,
    diag: &mut Diagnostics,
) -> Result<CleanTable, ArrowError> {
    let table = normalize_headers(table, diag);
    let clean = repair_and_coerce(table, diag)?;
    diag.info(
        Stage::Coercion,
        format!(
            "transformed table with {} rows and {} columns",
            clean.num_rows(),
            clean.batch.num_columns()
        ),
    );
    Ok(clean)
}
