use crate::{
    config::{DetectionConfig, StoreConfig},
    diagnostics::Diagnostics,
    extract::Cascade,
    load::{load_clean_table, write_parquet},
    pipeline,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Extract tables from a PDF and append them to an existing database table
#[derive(Parser, Debug)]
#[command(name = "pdf2db")]
pub struct Args {
    /// Path to the input PDF file
    #[arg(long)]
    pub pdf: PathBuf,

    /// Extract and transform only; skip the database load
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the clean table to this Parquet file
    #[arg(long)]
    pub parquet_out: Option<PathBuf>,
}

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MISSING_INPUT: u8 = 2;

const PREVIEW_ROWS: usize = 10;

/// Run one invocation and map the outcome to a process exit code.
///
/// Settings come from `lookup`; `build_cascade` turns the detection settings
/// into the strategies to try.
pub fn run_cli<F, B>(args: &Args, lookup: F, build_cascade: B) -> u8
where
    F: Fn(&str) -> Option<String>,
    B: FnOnce(&DetectionConfig, &mut Diagnostics) -> Cascade,
{
    if !args.pdf.is_file() {
        error!("PDF path does not exist: {}", args.pdf.display());
        return EXIT_MISSING_INPUT;
    }

    match run(args, lookup, build_cascade) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("pipeline failed: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn run<F, B>(args: &Args, lookup: F, build_cascade: B) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    B: FnOnce(&DetectionConfig, &mut Diagnostics) -> Cascade,
{
    // store settings first so a bad DATABASE_URL fails before extraction
    let store = if args.dry_run {
        None
    } else {
        Some(StoreConfig::from_lookup(&lookup)?)
    };
    let detection = DetectionConfig::from_lookup(&lookup)?;
    let mut diag = Diagnostics::new();

    let cascade = build_cascade(&detection, &mut diag);
    info!("{} detection strategies registered", cascade.len());
    let out = pipeline::run(&cascade, &args.pdf, &mut diag)?;

    println!("Extracted table:");
    println!("{}", out.raw.preview(PREVIEW_ROWS));
    println!("Transformed table:");
    println!("{}", out.clean.preview(PREVIEW_ROWS)?);

    if let Some(path) = &args.parquet_out {
        write_parquet(&out.clean, path)
            .with_context(|| format!("writing parquet snapshot {}", path.display()))?;
    }

    match store {
        Some(config) => {
            let rows = load_clean_table(&out.clean, &config)?;
            info!(table = %config.table_name, rows, "done");
        }
        None => info!("dry run; skipping load"),
    }
    Ok(())
}
