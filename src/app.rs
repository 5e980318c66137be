//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested pipeline steps
//! - prints the quality and load reports

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, GlobalArgs, LoadArgs, RunArgs};
use crate::config::{PipelineConfig, resolve_base_dir, resolve_db_path};
use crate::error::AppError;
use crate::store::{Backend, SqliteStore};

pub mod pipeline;

/// Entry point for the `wcpi` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; real env vars and flags still apply.
    let _ = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.global.verbose);

    let config = config_from_args(&cli.global);
    info!(
        raw_dir = %config.paths.raw_dir.display(),
        db = %config.paths.db_path.display(),
        "configuration resolved"
    );

    match cli.command {
        Command::Fetch => handle_fetch(&config),
        Command::Load(args) => handle_load(&config, &args),
        Command::Export => handle_export(&config),
        Command::Run(args) => handle_run(&config, &args),
    }
}

pub fn config_from_args(args: &GlobalArgs) -> PipelineConfig {
    PipelineConfig::new(
        resolve_base_dir(args.data_dir.as_deref()),
        resolve_db_path(args.db.as_deref()),
    )
}

fn handle_fetch(config: &PipelineConfig) -> Result<(), AppError> {
    for (series, rows) in pipeline::fetch_raw(config)? {
        println!("{series}: {rows} rows -> {}", config.paths.raw_file(series).display());
    }
    Ok(())
}

fn handle_load(config: &PipelineConfig, args: &LoadArgs) -> Result<(), AppError> {
    let output = pipeline::clean_raw(config, Utc::now())?;
    println!("{}", crate::report::format_clean_summary(&output.quality, &config.window));

    let mut store = pipeline::open_store(args.backend, config)?;
    let report = pipeline::load(store.as_mut(), &output)?;
    println!("{}", crate::report::format_load_report(&report));

    if args.backend == Backend::Memory {
        println!("(memory backend: nothing was persisted)");
    }
    Ok(())
}

fn handle_export(config: &PipelineConfig) -> Result<(), AppError> {
    let store = SqliteStore::open(&config.paths.db_path)?;
    let rows = pipeline::export_merged(&store, config)?;
    println!("{rows} merged rows -> {}", config.paths.merged_export().display());
    Ok(())
}

fn handle_run(config: &PipelineConfig, args: &RunArgs) -> Result<(), AppError> {
    if args.skip_fetch {
        info!("skipping fetch; using existing raw files");
    } else {
        handle_fetch(config)?;
    }

    let output = pipeline::clean_raw(config, Utc::now())?;
    println!("{}", crate::report::format_clean_summary(&output.quality, &config.window));

    // Export reads the same store the load wrote to, so `--backend memory` works end to end.
    let mut store = pipeline::open_store(args.load.backend, config)?;
    let report = pipeline::load(store.as_mut(), &output)?;
    println!("{}", crate::report::format_load_report(&report));

    let rows = pipeline::export_merged(store.as_ref(), config)?;
    println!("{rows} merged rows -> {}", config.paths.merged_export().display());
    Ok(())
}
