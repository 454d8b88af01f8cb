use crate::transform::CleanTable;
use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression};
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Snapshot the clean table as a single Parquet file.
///
/// Written to a `.tmp` sibling first and renamed into place once closed.
pub fn write_parquet(table: &CleanTable, out_path: &Path) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .set_dictionary_enabled(true)
        .build();

    let temp_path = out_path.with_extension("tmp");
    let file = File::create(&temp_path)
        .with_context(|| format!("creating {}", temp_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, table.batch.schema(), Some(props))
        .context("opening parquet writer")?;
    writer.write(&table.batch).context("writing parquet rows")?;
    writer.close().context("closing parquet writer")?;

    fs::rename(&temp_path, out_path).with_context(|| {
        format!(
            "renaming {} to {}",
            temp_path.display(),
            out_path.display()
        )
    })?;
    info!(path = %out_path.display(), rows = table.num_rows(), "wrote parquet snapshot");
    Ok(())
}
