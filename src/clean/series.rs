//! Per-series cleaning: raw rows → sorted, windowed, typed observations.
//!
//! Steps, in order:
//! 1. resolve columns (only for [`SeriesCleaner::clean_table`])
//! 2. parse every month code (the first malformed code fails the batch)
//! 3. coerce values leniently
//! 4. stable sort by month
//! 5. keep months inside the configured window
//! 6. drop rows whose value is null
//!
//! Duplicate months are passed through untouched; they are rejected by
//! `quality::check_clean` before anything is loaded.

use tracing::debug;

use crate::clean::columns::ColumnMapping;
use crate::clean::month::parse_month_code;
use crate::clean::numeric::{Coercion, coerce_token};
use crate::domain::{CleanBatch, CleanObservation, CleanStats, Month, MonthWindow, RawObservation, Series};
use crate::error::PipelineError;
use crate::io::raw::{RawDefaults, RawTable};

#[derive(Debug, Clone, Copy)]
pub struct SeriesCleaner {
    window: MonthWindow,
}

impl SeriesCleaner {
    pub fn new(window: MonthWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> MonthWindow {
        self.window
    }

    /// Resolve `mapping` against the table header, then clean its rows.
    pub fn clean_table(
        &self,
        series: Series,
        table: &RawTable,
        mapping: &ColumnMapping,
        defaults: &RawDefaults,
    ) -> Result<CleanBatch, PipelineError> {
        let raw = table.observations(series, mapping, defaults)?;
        self.clean(series, &raw)
    }

    pub fn clean(&self, series: Series, raw: &[RawObservation]) -> Result<CleanBatch, PipelineError> {
        let mut rows: Vec<(Month, Coercion)> = Vec::with_capacity(raw.len());
        for obs in raw {
            let month = parse_month_code(&obs.month_code).map_err(|e| PipelineError::Format {
                series,
                code: e.0,
            })?;
            rows.push((month, coerce_token(obs.value_text.as_deref())));
        }

        rows.sort_by_key(|(month, _)| *month);

        let mut stats = CleanStats {
            rows_read: raw.len(),
            ..CleanStats::default()
        };
        let mut observations = Vec::with_capacity(rows.len());
        for (month, coerced) in rows {
            if !self.window.contains(month) {
                stats.outside_window += 1;
                continue;
            }
            match coerced {
                Coercion::Number(value) => observations.push(CleanObservation { month, value }),
                Coercion::Missing => stats.null_values += 1,
                Coercion::Unparseable => {
                    stats.null_values += 1;
                    stats.coercion_failures += 1;
                }
            }
        }
        stats.rows_kept = observations.len();

        debug!(
            series = %series,
            rows_read = stats.rows_read,
            outside_window = stats.outside_window,
            dropped_nulls = stats.null_values,
            kept = stats.rows_kept,
            "cleaned series"
        );

        Ok(CleanBatch {
            series,
            observations,
            stats,
        })
    }
}
