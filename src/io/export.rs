//! CSV exports for downstream analysis.
//!
//! - clean series (`data/processed/{wage,cpi}_clean.csv`), for inspection
//! - the merged view (`data/processed/wage_cpi_merged_from_sql.csv`), ordered by month

use std::fs;
use std::path::Path;

use crate::domain::{CleanBatch, MergedRecord};
use crate::error::AppError;

/// Write a clean series as `month,<value column>`.
pub fn write_clean_csv(path: &Path, batch: &CleanBatch) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write clean CSV '{}': {e}", path.display()));

    writer
        .write_record(["month", batch.series.value_column()])
        .map_err(write_err)?;
    for obs in &batch.observations {
        writer
            .write_record([obs.month.to_string(), obs.value.to_string()])
            .map_err(write_err)?;
    }
    finish(writer, path)
}

/// Write the merged view with its seven columns.
pub fn write_merged_csv(path: &Path, rows: &[MergedRecord]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    if rows.is_empty() {
        writer
            .write_record(["month", "year", "month_num", "season", "wage_index", "cpi", "wage_to_cpi_ratio"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    finish(writer, path)
}

fn create_writer(path: &Path) -> Result<csv::Writer<fs::File>, AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn finish(mut writer: csv::Writer<fs::File>, path: &Path) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CleanObservation, CleanStats, Series};
    use crate::merge::merged_record;

    #[test]
    fn merged_export_has_the_view_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("merged.csv");
        let rows = vec![merged_record("2020-06".parse().unwrap(), 410.3, 210.1)];

        write_merged_csv(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("month,year,month_num,season,wage_index,cpi,wage_to_cpi_ratio")
        );
        let expected = format!("2020-06,2020,6,Summer,410.3,210.1,{}", 410.3 / 210.1);
        assert_eq!(lines.next(), Some(expected.as_str()));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_merged_export_still_has_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        write_merged_csv(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "month,year,month_num,season,wage_index,cpi,wage_to_cpi_ratio\n"
        );
    }

    #[test]
    fn clean_export_uses_series_value_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpi_clean.csv");
        let batch = CleanBatch {
            series: Series::Cpi,
            observations: vec![CleanObservation {
                month: "2001-02".parse().unwrap(),
                value: 215.5,
            }],
            stats: CleanStats::default(),
        };
        write_clean_csv(&path, &batch).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "month,cpi\n2001-02,215.5\n");
    }
}
