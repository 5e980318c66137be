//! Lenient numeric coercion of observation values.
//!
//! Values are data, not structure: anything that is not a finite number becomes
//! `None` and is counted, never raised.

/// Tokens the statistics API uses for "no value".
///
/// `…` also shows up as `â€¦` when a UTF-8 export is decoded as Windows-1252.
const MISSING_TOKENS: [&str; 3] = ["..", "\u{2026}", "\u{e2}\u{20ac}\u{a6}"];

/// Result of coercing one column of tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub values: Vec<Option<f64>>,
    /// Tokens that were present, not a known missing marker, and still not numeric.
    pub failures: usize,
}

/// Coerce tokens to optional floats. The output has the same length as the input.
pub fn coerce_values<'a, I>(tokens: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    coerce_with_report(tokens).values
}

/// Like [`coerce_values`], but also counts tokens that failed to parse.
pub fn coerce_with_report<'a, I>(tokens: I) -> Coerced
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut failures = 0usize;
    let values = tokens
        .into_iter()
        .map(|token| {
            let coerced = coerce_token(token);
            if coerced == Coercion::Unparseable {
                failures += 1;
            }
            coerced.value()
        })
        .collect();
    Coerced { values, failures }
}

/// Outcome of coercing a single token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion {
    Missing,
    Number(f64),
    Unparseable,
}

impl Coercion {
    pub fn value(self) -> Option<f64> {
        match self {
            Coercion::Number(v) => Some(v),
            Coercion::Missing | Coercion::Unparseable => None,
        }
    }
}

pub fn coerce_token(token: Option<&str>) -> Coercion {
    let Some(raw) = token else { return Coercion::Missing };
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
        return Coercion::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Coercion::Number(v),
        _ => Coercion::Unparseable,
    }
}
