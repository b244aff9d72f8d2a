//! Numeric coercion for stat cells and year labels.
//!
//! Source tables mix plain numbers, percentage strings (`"55%"`) and
//! comma-grouped numbers (`"1,234.5"`). Coercion never fails: anything that
//! does not parse to a finite number is a missing value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How percentage cells are scaled once the `%` sign is stripped.
///
/// The published win-rate coefficients were fitted on the 0-100 scale, so
/// [`PercentScale::AsIs`] is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentScale {
    /// `"55%"` loads as `55.0`
    #[default]
    AsIs,
    /// `"55%"` loads as `0.55`
    Fraction,
}

impl PercentScale {
    /// Name used on the command line and in coefficient files.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AsIs => "as-is",
            Self::Fraction => "fraction",
        }
    }
}

impl fmt::Display for PercentScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PercentScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "as-is" | "asis" | "percent" => Ok(Self::AsIs),
            "fraction" => Ok(Self::Fraction),
            other => Err(format!(
                "unknown percent scale '{other}' (expected 'as-is' or 'fraction')"
            )),
        }
    }
}

/// Parse a plain numeric cell. Empty, non-numeric and non-finite cells are `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a stat cell to a number: strip `%` and `,`, then parse.
///
/// # Examples
///
/// ```
/// use gridiron_data::{PercentScale, coerce_numeric};
///
/// assert_eq!(coerce_numeric("1,234.5", PercentScale::AsIs), Some(1234.5));
/// assert_eq!(coerce_numeric("55%", PercentScale::AsIs), Some(55.0));
/// assert_eq!(coerce_numeric("55%", PercentScale::Fraction), Some(0.55));
/// assert_eq!(coerce_numeric("n/a", PercentScale::AsIs), None);
/// ```
pub fn coerce_numeric(raw: &str, scale: PercentScale) -> Option<f64> {
    let is_percent = raw.contains('%');
    let cleaned: String = raw.chars().filter(|c| *c != '%' && *c != ',').collect();
    let value = parse_number(&cleaned)?;

    match scale {
        PercentScale::Fraction if is_percent => Some(value / 100.0),
        _ => Some(value),
    }
}

/// Parse a season label such as `"2024"` or `"2024.0"`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }

    parse_number(trimmed)
        .filter(|v| v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v as i32)
}
