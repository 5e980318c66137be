//! Quality checks.
//!
//! - post-clean: month uniqueness is fatal; null counts and means are reported
//! - post-load: row counts and aggregates per relation, for operator visibility

use std::collections::HashSet;

use tracing::info;

use crate::domain::{CleanBatch, Series};
use crate::error::PipelineError;
use crate::store::{Relation, SeriesSummary, Store, StoreError};

/// Observational summary of one clean series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesQuality {
    pub series: Series,
    pub rows: usize,
    pub null_values: usize,
    pub coercion_failures: usize,
    pub outside_window: usize,
    /// Mean of the kept values; `None` for an empty series.
    pub mean: Option<f64>,
}

/// Post-load visibility report.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub backend: &'static str,
    pub row_counts: Vec<(Relation, u64)>,
    pub summaries: Vec<(Series, SeriesSummary)>,
}

/// Fail on repeated months, otherwise summarize the batch.
pub fn check_clean(batch: &CleanBatch) -> Result<SeriesQuality, PipelineError> {
    let mut seen = HashSet::with_capacity(batch.len());
    for obs in &batch.observations {
        if !seen.insert(obs.month) {
            return Err(PipelineError::DuplicateMonth {
                series: batch.series,
                month: obs.month,
            });
        }
    }

    let mean = if batch.is_empty() {
        None
    } else {
        Some(batch.observations.iter().map(|o| o.value).sum::<f64>() / batch.len() as f64)
    };

    let quality = SeriesQuality {
        series: batch.series,
        rows: batch.len(),
        null_values: batch.stats.null_values,
        coercion_failures: batch.stats.coercion_failures,
        outside_window: batch.stats.outside_window,
        mean,
    };

    info!(
        series = %quality.series,
        rows = quality.rows,
        nulls = quality.null_values,
        coercion_failures = quality.coercion_failures,
        mean = ?quality.mean,
        "post-clean quality"
    );

    Ok(quality)
}

/// Check both series before anything is written; wage first.
pub fn check_clean_pair(wage: &CleanBatch, cpi: &CleanBatch) -> Result<[SeriesQuality; 2], PipelineError> {
    Ok([check_clean(wage)?, check_clean(cpi)?])
}

/// Row counts for every relation plus avg/min/max per clean series.
pub fn post_load_report(store: &dyn Store) -> Result<LoadReport, StoreError> {
    let mut row_counts = Vec::with_capacity(Relation::ALL.len());
    for relation in Relation::ALL {
        let n = store.row_count(relation)?;
        info!(relation = relation.name(), rows = n, "post-load row count");
        row_counts.push((relation, n));
    }

    let mut summaries = Vec::with_capacity(Series::ALL.len());
    for series in Series::ALL {
        let summary = store.series_summary(series)?;
        info!(
            table = series.clean_table(),
            avg = ?summary.avg,
            min = ?summary.min,
            max = ?summary.max,
            "post-load aggregate"
        );
        summaries.push((series, summary));
    }

    Ok(LoadReport {
        backend: store.backend(),
        row_counts,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CleanObservation, CleanStats};
    use crate::store::MemoryStore;

    fn batch(series: Series, rows: &[(&str, f64)]) -> CleanBatch {
        CleanBatch {
            series,
            observations: rows
                .iter()
                .map(|(m, v)| CleanObservation {
                    month: m.parse().unwrap(),
                    value: *v,
                })
                .collect(),
            stats: CleanStats {
                null_values: 2,
                coercion_failures: 1,
                ..CleanStats::default()
            },
        }
    }

    #[test]
    fn duplicate_month_is_fatal() {
        let dup = batch(Series::Wage, &[("2010-04", 1.0), ("2010-05", 2.0), ("2010-05", 3.0)]);
        let err = check_clean(&dup).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DuplicateMonth {
                series: Series::Wage,
                month: "2010-05".parse().unwrap(),
            }
        );
    }

    #[test]
    fn reports_nulls_and_mean() {
        let q = check_clean(&batch(Series::Cpi, &[("2010-01", 2.0), ("2010-02", 4.0)])).unwrap();
        assert_eq!(q.rows, 2);
        assert_eq!(q.null_values, 2);
        assert_eq!(q.coercion_failures, 1);
        assert_eq!(q.mean, Some(3.0));
    }

    #[test]
    fn empty_series_has_no_mean() {
        assert_eq!(check_clean(&batch(Series::Cpi, &[])).unwrap().mean, None);
    }

    #[test]
    fn pair_check_names_the_failing_series() {
        let wage = batch(Series::Wage, &[("2010-01", 1.0)]);
        let cpi = batch(Series::Cpi, &[("2010-05", 1.0), ("2010-05", 1.0)]);
        let err = check_clean_pair(&wage, &cpi).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateMonth { series: Series::Cpi, .. }));
    }

    #[test]
    fn post_load_report_covers_every_relation() {
        let mut store = MemoryStore::new();
        store.create_schema().unwrap();
        store
            .bulk_insert_clean(&batch(Series::Wage, &[("2010-01", 10.0), ("2010-02", 20.0)]))
            .unwrap();
        store.bulk_insert_clean(&batch(Series::Cpi, &[("2010-02", 5.0)])).unwrap();
        store.create_views().unwrap();

        let report = post_load_report(&store).unwrap();
        assert_eq!(report.backend, "memory");
        assert_eq!(
            report.row_counts,
            vec![
                (Relation::Raw(Series::Wage), 0),
                (Relation::Raw(Series::Cpi), 0),
                (Relation::Clean(Series::Wage), 2),
                (Relation::Clean(Series::Cpi), 1),
                (Relation::MergedView, 1),
            ]
        );
        assert_eq!(report.summaries[0].1.avg, Some(15.0));
        assert_eq!(report.summaries[1].1.max, Some(5.0));
    }
}
