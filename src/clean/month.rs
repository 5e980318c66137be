//! PX month codes (`1989M01`) → canonical months (`1989-01`).
//!
//! Parsing is strict: a code that does not match `YYYYMnn` means the upstream
//! table changed shape, so callers must fail the batch instead of skipping rows.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::Month;

static MONTH_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})M([0-9]{2})$").expect("month code pattern is valid"));

/// A month code that is not `YYYYMnn` (or names a month outside 1..=12).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected month format: '{0}'")]
pub struct InvalidMonthCode(pub String);

/// Parse a PX month code such as `"2024M12"`; surrounding whitespace is ignored.
pub fn parse_month_code(code: &str) -> Result<Month, InvalidMonthCode> {
    let invalid = || InvalidMonthCode(code.to_string());
    let caps = MONTH_CODE.captures(code.trim()).ok_or_else(invalid)?;
    let year: i32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    Month::new(year, month).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_px_codes_to_canonical_months() {
        assert_eq!(parse_month_code("1989M01").unwrap().to_string(), "1989-01");
        assert_eq!(parse_month_code("2024M12").unwrap().to_string(), "2024-12");
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        assert_eq!(parse_month_code("  2010M05\t").unwrap().to_string(), "2010-05");
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in ["89M1", "2024-01", "2024M1", "2024m01", "2024M013", "", "M2024", "2024M13", "2024M00"] {
            let err = parse_month_code(bad).unwrap_err();
            assert_eq!(err, InvalidMonthCode(bad.to_string()));
        }
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(parse_month_code("٢٠٢٤M01").is_err());
    }
}
