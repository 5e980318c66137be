//! Raw series CSV files (`data/raw/*_raw.csv`).
//!
//! Raw files are written exactly as the statistics API describes the data: the
//! first column is named after the table's time dimension (e.g. `Mánuður`),
//! followed by `value`, `source` and `fetched_at`. Reading is the ingestion
//! boundary where the explicit `ColumnMapping` is resolved.

use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clean::columns::ColumnMapping;
use crate::domain::{RawObservation, Series};
use crate::error::{AppError, PipelineError};

/// A header row plus string cells; empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Values used when a raw file lacks `source` / `fetched_at` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDefaults {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl RawTable {
    /// Turn rows into `RawObservation`s using the mapping resolved against `headers`.
    pub fn observations(
        &self,
        series: Series,
        mapping: &ColumnMapping,
        defaults: &RawDefaults,
    ) -> Result<Vec<RawObservation>, PipelineError> {
        let cols = mapping.resolve(series, &self.headers)?;
        let mut unparsed_timestamps = 0usize;

        let observations = self
            .rows
            .iter()
            .map(|row| {
                let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|c| c.clone());

                let fetched_at = match cell(cols.fetched_at) {
                    Some(text) => match DateTime::parse_from_rfc3339(&text) {
                        Ok(ts) => ts.with_timezone(&Utc),
                        Err(_) => {
                            unparsed_timestamps += 1;
                            defaults.fetched_at
                        }
                    },
                    None => defaults.fetched_at,
                };

                RawObservation {
                    month_code: cell(Some(cols.month_code)).unwrap_or_default(),
                    value_text: cell(Some(cols.value)),
                    source: cell(cols.source).unwrap_or_else(|| defaults.source.clone()),
                    fetched_at,
                }
            })
            .collect();

        if unparsed_timestamps > 0 {
            warn!(
                series = %series,
                rows = unparsed_timestamps,
                "fetched_at is not RFC 3339; using the load time instead"
            );
        }

        Ok(observations)
    }
}

/// Read a raw CSV file.
pub fn read_raw_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Missing raw file '{}': {e}. Run `wcpi fetch` first.", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::new(2, format!("CSV parse error in '{}' line {}: {e}", path.display(), idx + 2))
        })?;
        rows.push(
            record
                .iter()
                .map(|cell| if cell.is_empty() { None } else { Some(cell.to_string()) })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

/// Write fetched observations to a raw CSV file, creating parent directories.
pub fn write_raw_csv(path: &Path, month_header: &str, rows: &[RawObservation]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create raw CSV '{}': {e}", path.display())))?;

    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write raw CSV '{}': {e}", path.display()));

    writer
        .write_record([month_header, "value", "source", "fetched_at"])
        .map_err(write_err)?;
    for row in rows {
        let fetched_at = row.fetched_at.to_rfc3339();
        writer
            .write_record([
                row.month_code.as_str(),
                row.value_text.as_deref().unwrap_or(""),
                row.source.as_str(),
                fetched_at.as_str(),
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush raw CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn defaults() -> RawDefaults {
        RawDefaults {
            source: "test://source".to_string(),
            fetched_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn raw_csv_round_trips_with_locale_month_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw").join("wage_raw.csv");
        let fetched_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let rows = vec![
            RawObservation {
                month_code: "2020M06".to_string(),
                value_text: Some("410.3".to_string()),
                source: "https://px.example/LAU04000.px".to_string(),
                fetched_at,
            },
            RawObservation {
                month_code: "2020M07".to_string(),
                value_text: None,
                source: "https://px.example/LAU04000.px".to_string(),
                fetched_at,
            },
        ];

        write_raw_csv(&path, "Mánuður", &rows).unwrap();
        let table = read_raw_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Mánuður", "value", "source", "fetched_at"]);

        let back = table
            .observations(Series::Wage, &ColumnMapping::default(), &defaults())
            .unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn missing_optional_cells_fall_back_to_defaults() {
        let table = RawTable {
            headers: vec!["month_code".to_string(), "value_text".to_string(), "fetched_at".to_string()],
            rows: vec![vec![Some("2010M01".to_string()), Some("1.5".to_string()), Some("yesterday".to_string())]],
        };
        let obs = table
            .observations(Series::Cpi, &ColumnMapping::default(), &defaults())
            .unwrap();
        assert_eq!(obs[0].source, "test://source");
        assert_eq!(obs[0].fetched_at, defaults().fetched_at);
    }

    #[test]
    fn missing_raw_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raw_table(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
