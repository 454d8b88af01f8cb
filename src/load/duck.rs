use crate::load::TableSink;
use crate::transform::CleanTable;
use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Date32Array, Int32Array, Int64Array, StringArray},
    datatypes::DataType,
    util::display::array_value_to_string,
};
use duckdb::{params, params_from_iter, types::Value, Connection};
use std::{collections::HashSet, path::Path, time::Instant};
use tracing::{debug, info};

/// Open the DuckDB store file at `path`.
///
/// DuckDB creates missing files, so [`DuckDbSink::open`] checks the file
/// exists before calling this.
pub fn open_disk_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    Ok(conn)
}

/// Scratch database for exercising the sink against throwaway tables.
#[cfg(test)]
pub(crate) fn open_mem_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    Ok(conn)
}

/// Appends clean tables to an existing DuckDB table.
pub struct DuckDbSink {
    conn: Connection,
    batch_size: usize,
}

impl DuckDbSink {
    pub fn new(conn: Connection, batch_size: usize) -> Self {
        Self {
            conn,
            batch_size: batch_size.max(1),
        }
    }

    /// Connect to an existing store; a missing file is an error, never a new database.
    pub fn open(path: &Path, batch_size: usize) -> Result<Self> {
        if !path.is_file() {
            bail!("DuckDB store {} does not exist", path.display());
        }
        let conn =
            open_disk_db(path).with_context(|| format!("opening DuckDB store {}", path.display()))?;
        Ok(Self::new(conn, batch_size))
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableSink for DuckDbSink {
    /// All rows land in one transaction; any failing batch rolls back the lot.
    fn append(&mut self, table: &CleanTable, table_name: &str) -> Result<u64> {
        let start = Instant::now();
        let columns = table.column_names();
        let tx = self.conn.transaction()?;

        let existing = target_columns(&tx, table_name)?;
        if existing.is_empty() {
            bail!("target table '{}' does not exist", table_name);
        }
        let unknown: Vec<&String> = columns
            .iter()
            .filter(|c| !existing.contains(&c.to_lowercase()))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "target table '{}' has no column(s) {:?}",
                table_name,
                unknown
            );
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        let mut written = 0u64;
        let total = table.num_rows();
        let mut offset = 0;
        while offset < total {
            let len = self.batch_size.min(total - offset);
            let chunk = table.batch.slice(offset, len);
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_ident(table_name),
                column_list,
                vec![row_placeholders.as_str(); len].join(", ")
            );
            let values = batch_values(chunk.columns(), len)?;
            let n = tx
                .execute(&sql, params_from_iter(values))
                .with_context(|| format!("inserting rows {}..{}", offset, offset + len))?;
            debug!(table = %table_name, offset, rows = n, "inserted batch");
            written += n as u64;
            offset += len;
        }

        tx.commit().context("committing load transaction")?;
        info!(
            table = %table_name,
            rows = written,
            elapsed = ?start.elapsed(),
            "load completed"
        );
        Ok(written)
    }
}

/// Lowercased column names of `table_name`; empty when the table is absent.
fn target_columns(conn: &Connection, table_name: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT column_name FROM information_schema.columns WHERE lower(table_name) = lower(?)",
    )?;
    let names = stmt
        .query_map(params![table_name], |row| row.get::<_, String>(0))?
        .map(|r| r.map(|name| name.to_lowercase()))
        .collect::<duckdb::Result<HashSet<String>>>()?;
    Ok(names)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Row-major parameter list for one multi-row INSERT.
fn batch_values(columns: &[ArrayRef], rows: usize) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(rows * columns.len());
    for row in 0..rows {
        for col in columns {
            values.push(cell_value(col, row)?);
        }
    }
    Ok(values)
}

fn cell_value(array: &ArrayRef, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }
    let downcast_err = || anyhow!("unexpected array type {:?}", array.data_type());
    let value = match array.data_type() {
        DataType::Int32 => Value::Int(
            array
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(downcast_err)?
                .value(row),
        ),
        DataType::Int64 => Value::BigInt(
            array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(downcast_err)?
                .value(row),
        ),
        DataType::Date32 => Value::Date32(
            array
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(downcast_err)?
                .value(row),
        ),
        DataType::Utf8 => Value::Text(
            array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(downcast_err)?
                .value(row)
                .to_string(),
        ),
        _ => Value::Text(array_value_to_string(array, row)?),
    };
    Ok(value)
}
