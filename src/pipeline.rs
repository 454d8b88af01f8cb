use crate::diagnostics::Diagnostics;
use crate::error::PipelineError;
use crate::extract::{Cascade, MergedTable};
use crate::transform::{transform_table, CleanTable};
use std::path::Path;
use tracing::instrument;

/// Both intermediate artifacts of a run, for callers that want to show them.
pub struct Extraction {
    pub raw: MergedTable,
    pub clean: CleanTable,
}

/// Extract every table from `pdf_path` and turn it into a typed table.
#[instrument(level = "info", skip(cascade, pdf_path, diag), fields(path = %pdf_path.display()))]
pub fn run(
    cascade: &Cascade,
    pdf_path: &Path,
    diag: &mut Diagnostics,
) -> Result<Extraction, PipelineError> {
    let raw = cascade.extract_tables(pdf_path, diag)?;
    let clean = transform_table(raw.clone(), diag)?;
    Ok(Extraction { raw, clean })
}
