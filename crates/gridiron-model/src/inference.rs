//! Coefficient significance tests.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided p-value of a t statistic with `df` degrees of freedom.
///
/// An infinite statistic (zero standard error, nonzero coefficient) has
/// p-value 0. Returns `None` for a NaN statistic or `df <= 0`.
pub fn two_sided_p_value(t: f64, df: f64) -> Option<f64> {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return None;
    }
    if t.is_infinite() {
        return Some(0.0);
    }

    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}
