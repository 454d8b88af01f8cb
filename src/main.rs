use clap::Parser;
use pdf2db::{
    cli::{run_cli, Args},
    extract::Cascade,
};
use std::{env, process::ExitCode};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    // ─── 2) run ──────────────────────────────────────────────────────
    let args = Args::parse();
    let code = run_cli(&args, |key| env::var(key).ok(), Cascade::from_config);
    ExitCode::from(code)
}
