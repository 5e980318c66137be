//! Formatted terminal output.
//!
//! Formatting lives here so the cleaning and storage code stay free of
//! presentation concerns; every function returns a `String` the caller prints.

use crate::domain::MonthWindow;
use crate::quality::{LoadReport, SeriesQuality};

/// Post-clean quality summary for both series.
pub fn format_clean_summary(qualities: &[SeriesQuality], window: &MonthWindow) -> String {
    let mut out = String::new();

    out.push_str("=== wcpi - clean ===\n");
    out.push_str(&format!("Window: {window}\n"));
    out.push_str(&format!(
        "{:<6} {:>6} {:>6} {:>8} {:>10} {:>12}\n",
        "series", "rows", "nulls", "invalid", "outside", "mean"
    ));
    out.push_str(&format!(
        "{:-<6} {:-<6} {:-<6} {:-<8} {:-<10} {:-<12}\n",
        "", "", "", "", "", ""
    ));
    for q in qualities {
        out.push_str(&format!(
            "{:<6} {:>6} {:>6} {:>8} {:>10} {:>12}\n",
            q.series.label(),
            q.rows,
            q.null_values,
            q.coercion_failures,
            q.outside_window,
            fmt_opt(q.mean),
        ));
    }

    out
}

/// Post-load row counts and aggregates.
pub fn format_load_report(report: &LoadReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== wcpi - load ({}) ===\n", report.backend));
    for (relation, rows) in &report.row_counts {
        out.push_str(&format!("rows {:<20} {rows:>8}\n", relation.name()));
    }
    for (series, summary) in &report.summaries {
        out.push_str(&format!(
            "{:<25} avg/min/max: {} / {} / {}\n",
            series.clean_table(),
            fmt_opt(summary.avg),
            fmt_opt(summary.min),
            fmt_opt(summary.max),
        ));
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}
