//! Normalization of raw series into clean monthly observations.
//!
//! - PX month codes (`month`)
//! - lenient value coercion (`numeric`)
//! - column name folding and the per-source column contract (`columns`)
//! - the per-series cleaning pass (`series`)

pub mod columns;
pub mod month;
pub mod numeric;
pub mod series;

pub use columns::{ColumnMapping, ResolvedColumns, is_month_column, normalize_column_name};
pub use month::{InvalidMonthCode, parse_month_code};
pub use numeric::{Coerced, Coercion, coerce_token, coerce_values, coerce_with_report};
pub use series::SeriesCleaner;
