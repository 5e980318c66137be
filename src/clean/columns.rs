//! Column resolution for raw series files.
//!
//! The PX export names its time column after the Icelandic label "Mánuður",
//! and depending on the tool chain the `ð` (eth) arrives either as `ð` or as
//! the look-alike `đ` (d with stroke). Neither letter decomposes under NFKD,
//! so they are substituted explicitly before accents are stripped.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::domain::Series;
use crate::error::PipelineError;

/// ASCII transliteration of "Mánuður" ("month").
const LOCALE_MONTH: &str = "manudur";

/// Fold a column name to lowercase ASCII-ish text for comparison.
pub fn normalize_column_name(name: &str) -> String {
    let substituted: String = name
        .chars()
        .map(|c| match c {
            'ð' | 'Ð' | 'đ' | 'Đ' => 'd',
            other => other,
        })
        .collect();
    substituted
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Whether `name` is the locale month column, whatever its encoding or case.
pub fn is_month_column(name: &str) -> bool {
    normalize_column_name(name) == LOCALE_MONTH
}

/// Explicit column contract for one raw source.
///
/// Candidates are tried in order. Exact names are compared after trimming,
/// stripping a UTF-8 BOM and lowercasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub month_code: Vec<String>,
    /// Also accept the Icelandic month label (see [`is_month_column`]).
    pub locale_month_label: bool,
    pub value: Vec<String>,
    pub source: Vec<String>,
    pub fetched_at: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            month_code: vec!["month_code".to_string()],
            locale_month_label: true,
            value: vec!["value_text".to_string(), "value".to_string()],
            source: vec!["source".to_string()],
            fetched_at: vec!["fetched_at".to_string()],
        }
    }
}

/// Column indexes resolved against a concrete header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub month_code: usize,
    pub value: usize,
    pub source: Option<usize>,
    pub fetched_at: Option<usize>,
}

impl ColumnMapping {
    /// Resolve the mapping once per file. Fails with `Schema` when the month code
    /// or value column cannot be found.
    pub fn resolve(&self, series: Series, headers: &[String]) -> Result<ResolvedColumns, PipelineError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header_name(h)).collect();

        let month_code = find_exact(&normalized, &self.month_code).or_else(|| {
            if self.locale_month_label {
                headers.iter().position(|h| is_month_column(h.trim_start_matches('\u{feff}')))
            } else {
                None
            }
        });
        let value = find_exact(&normalized, &self.value);

        let (month_code, value) = match (month_code, value) {
            (Some(m), Some(v)) => (m, v),
            (m, v) => {
                let mut missing = Vec::new();
                if m.is_none() {
                    missing.push("month_code".to_string());
                }
                if v.is_none() {
                    missing.push("value_text".to_string());
                }
                return Err(PipelineError::Schema { series, missing });
            }
        };

        Ok(ResolvedColumns {
            month_code,
            value,
            source: find_exact(&normalized, &self.source),
            fetched_at: find_exact(&normalized, &self.fetched_at),
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

fn find_exact(normalized_headers: &[String], candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.to_lowercase();
        normalized_headers.iter().position(|h| *h == candidate)
    })
}
