//! Tolerance scaling from the relative threshold r.
//!
//! The matching tolerance is `r_abs = r * sqrt(variance)` where the variance
//! is the population variance (division by n). Downstream pair counts are
//! defined against this convention; do not substitute the sample variance.

use crate::error::{Result, SampenError};

/// Mean of a slice.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(SampenError::EmptySeries);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance: sum of squared deviations divided by n.
///
/// Defined for any non-empty slice; a single observation or a constant
/// series has variance zero.
pub fn population_variance(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Ok(sum_sq / values.len() as f64)
}

/// Absolute matching tolerance for a relative threshold `r`.
///
/// A zero variance is not an error: it yields `r_abs = 0`, under which
/// template matching degenerates to exact equality.
pub fn scale(values: &[f64], r: f64) -> Result<f64> {
    Ok(r * population_variance(values)?.sqrt())
}
