//! Shared pipeline steps used by every subcommand.
//!
//! fetch -> clean + quality -> load (one transaction) -> post-load report -> export
//!
//! The CLI handlers only choose which steps to run and print the reports.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::clean::SeriesCleaner;
use crate::config::PipelineConfig;
use crate::data::PxClient;
use crate::domain::{CleanBatch, RawObservation, Series};
use crate::error::AppError;
use crate::io::{RawDefaults, read_raw_table, write_clean_csv, write_merged_csv, write_raw_csv};
use crate::quality::{LoadReport, SeriesQuality, check_clean_pair, post_load_report};
use crate::store::{Backend, MemoryStore, SqliteStore, Store, StoreError};

/// Raw rows and the clean batch of one series.
#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub raw: Vec<RawObservation>,
    pub clean: CleanBatch,
}

/// Both series after cleaning and the post-clean quality checks.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub wage: SeriesRun,
    pub cpi: SeriesRun,
    pub quality: [SeriesQuality; 2],
}

impl CleanOutput {
    pub fn series(&self, series: Series) -> &SeriesRun {
        match series {
            Series::Wage => &self.wage,
            Series::Cpi => &self.cpi,
        }
    }
}

/// Download both tables and write `data/raw/*_raw.csv`. Returns rows per series.
pub fn fetch_raw(config: &PipelineConfig) -> Result<Vec<(Series, usize)>, AppError> {
    let client = PxClient::new(&config.http)?;

    let mut written = Vec::with_capacity(Series::ALL.len());
    for series in Series::ALL {
        let fetched = client.fetch_series(config.source(series))?;
        let path = config.paths.raw_file(series);
        write_raw_csv(&path, &fetched.month_header, &fetched.rows)?;
        info!(series = %series, rows = fetched.rows.len(), path = %path.display(), "raw file written");
        written.push((series, fetched.rows.len()));
    }

    Ok(written)
}

/// Read the raw files, clean them and run the post-clean checks.
///
/// Clean CSVs are written only after both series pass the checks.
/// `loaded_at` stands in for missing `fetched_at` cells.
pub fn clean_raw(config: &PipelineConfig, loaded_at: DateTime<Utc>) -> Result<CleanOutput, AppError> {
    let cleaner = SeriesCleaner::new(config.window);

    let clean_one = |series: Series| -> Result<SeriesRun, AppError> {
        let source = config.source(series);
        let table = read_raw_table(&config.paths.raw_file(series))?;
        let defaults = RawDefaults {
            source: source.px_url.clone(),
            fetched_at: loaded_at,
        };
        let raw = table.observations(series, &source.columns, &defaults)?;
        let clean = cleaner.clean(series, &raw)?;
        Ok(SeriesRun { raw, clean })
    };

    let wage = clean_one(Series::Wage)?;
    let cpi = clean_one(Series::Cpi)?;
    let quality = check_clean_pair(&wage.clean, &cpi.clean)?;

    for run in [&wage, &cpi] {
        let path = config.paths.clean_file(run.clean.series);
        write_clean_csv(&path, &run.clean)?;
        info!(series = %run.clean.series, rows = run.clean.len(), path = %path.display(), "clean file written");
    }

    Ok(CleanOutput { wage, cpi, quality })
}

/// Open the store for `backend`; SQLite uses the configured database file.
pub fn open_store(backend: Backend, config: &PipelineConfig) -> Result<Box<dyn Store>, AppError> {
    Ok(match backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&config.paths.db_path)?),
        Backend::Memory => Box::new(MemoryStore::new()),
    })
}

/// Load raw and clean rows and rebuild the merged view in one transaction.
///
/// On any failure the transaction is rolled back and the previous contents stay.
pub fn load(store: &mut dyn Store, output: &CleanOutput) -> Result<LoadReport, AppError> {
    store.begin()?;
    if let Err(err) = write_all(store, output) {
        if let Err(rollback_err) = store.rollback() {
            warn!(error = %rollback_err, "rollback failed");
        }
        return Err(err.into());
    }
    store.commit()?;
    info!(backend = store.backend(), "load committed");

    Ok(post_load_report(store)?)
}

fn write_all(store: &mut dyn Store, output: &CleanOutput) -> Result<(), StoreError> {
    store.create_schema()?;
    for series in Series::ALL {
        let run = output.series(series);
        let raw_rows = store.bulk_insert_raw(series, &run.raw)?;
        let clean_rows = store.bulk_insert_clean(&run.clean)?;
        info!(series = %series, raw_rows, clean_rows, "rows inserted");
    }
    store.create_views()
}

/// Write the merged view to `data/processed/wage_cpi_merged_from_sql.csv`.
pub fn export_merged(store: &dyn Store, config: &PipelineConfig) -> Result<usize, AppError> {
    let rows = store.merged()?;
    let path = config.paths.merged_export();
    write_merged_csv(&path, &rows)?;
    info!(rows = rows.len(), path = %path.display(), "merged view exported");
    Ok(rows.len())
}
