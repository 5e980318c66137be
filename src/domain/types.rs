//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - produced by the fetcher and the cleaner
//! - bulk-inserted by any storage adapter
//! - exported to CSV for downstream analysis

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two monthly series handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Wage,
    Cpi,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::Wage, Series::Cpi];

    /// Upper-case label used in operator-facing messages (`WAGE`, `CPI`).
    pub fn label(self) -> &'static str {
        match self {
            Series::Wage => "WAGE",
            Series::Cpi => "CPI",
        }
    }

    /// Append-only table holding the rows exactly as fetched.
    pub fn raw_table(self) -> &'static str {
        match self {
            Series::Wage => "wage_index_raw",
            Series::Cpi => "cpi_raw",
        }
    }

    /// Clean table keyed by `month`.
    pub fn clean_table(self) -> &'static str {
        match self {
            Series::Wage => "wage_index_clean",
            Series::Cpi => "cpi_clean",
        }
    }

    /// Name of the value column in the clean table (and in exports).
    pub fn value_column(self) -> &'static str {
        match self {
            Series::Wage => "wage_index",
            Series::Cpi => "cpi",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A text value could not be read as a canonical `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{0}' (expected YYYY-MM)")]
pub struct InvalidMonth(pub String);

/// A calendar month.
///
/// The canonical text form is zero-padded `YYYY-MM`. The derived ordering
/// (year, then month) matches the lexical ordering of that text form, so
/// sorting `Month`s and sorting their strings give the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month, rejecting years outside `0..=9999` and months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Month number, `1..=12`.
    pub fn month_num(self) -> u32 {
        self.month
    }

    pub fn season(self) -> Season {
        Season::from_month_num(self.month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonth(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Month {
    type Error = InvalidMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// Meteorological season of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Fixed mapping: 12,1,2 → Winter; 3,4,5 → Spring; 6,7,8 → Summer; otherwise Autumn.
    pub fn from_month_num(month_num: u32) -> Season {
        match month_num {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Winter" => Ok(Season::Winter),
            "Spring" => Ok(Season::Spring),
            "Summer" => Ok(Season::Summer),
            "Autumn" => Ok(Season::Autumn),
            other => Err(format!("unknown season '{other}'")),
        }
    }
}

/// Inclusive range of months accepted into the clean tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: Month,
    pub end: Month,
}

impl MonthWindow {
    pub fn contains(&self, month: Month) -> bool {
        self.start <= month && month <= self.end
    }
}

impl Default for MonthWindow {
    /// `2000-01` ..= `2025-12`.
    fn default() -> Self {
        Self {
            start: Month { year: 2000, month: 1 },
            end: Month { year: 2025, month: 12 },
        }
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// One reported period of one series, exactly as fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub month_code: String,
    pub value_text: Option<String>,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

/// A cleaned monthly value, keyed by `month`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanObservation {
    pub month: Month,
    pub value: f64,
}

/// Counters collected while cleaning one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_read: usize,
    /// Rows whose value coerced to null (sentinels and unparseable tokens).
    pub null_values: usize,
    /// Subset of `null_values` that were present but not numeric.
    pub coercion_failures: usize,
    pub outside_window: usize,
    pub rows_kept: usize,
}

/// Cleaned observations of one series, sorted by month, ready for bulk insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanBatch {
    pub series: Series,
    pub observations: Vec<CleanObservation>,
    pub stats: CleanStats,
}

impl CleanBatch {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// One row of the merged wage/CPI view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub month: Month,
    pub year: i32,
    pub month_num: u32,
    pub season: Season,
    pub wage_index: f64,
    pub cpi: f64,
    pub wage_to_cpi_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_display_is_zero_padded() {
        let m = Month::new(2010, 5).unwrap();
        assert_eq!(m.to_string(), "2010-05");
        assert_eq!("2010-05".parse::<Month>().unwrap(), m);
    }

    #[test]
    fn month_rejects_non_canonical_text() {
        for bad in ["2010-5", "2010-13", "2010-00", "201005", "2010M05", " 2010-05", "20x0-05"] {
            assert!(bad.parse::<Month>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn month_ordering_matches_text_ordering() {
        let mut months = vec![
            Month::new(2010, 11).unwrap(),
            Month::new(2009, 12).unwrap(),
            Month::new(2010, 2).unwrap(),
        ];
        let mut texts: Vec<String> = months.iter().map(ToString::to_string).collect();
        months.sort();
        texts.sort();
        let sorted: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, texts);
    }

    #[test]
    fn season_mapping_is_fixed() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (8, Season::Summer),
            (9, Season::Autumn),
            (11, Season::Autumn),
            (12, Season::Winter),
        ];
        for (m, season) in expected {
            assert_eq!(Season::from_month_num(m), season, "month {m}");
        }
    }

    #[test]
    fn default_window_bounds_are_inclusive() {
        let w = MonthWindow::default();
        assert!(w.contains(Month::new(2000, 1).unwrap()));
        assert!(w.contains(Month::new(2025, 12).unwrap()));
        assert!(!w.contains(Month::new(1999, 12).unwrap()));
        assert!(!w.contains(Month::new(2026, 1).unwrap()));
    }
}
