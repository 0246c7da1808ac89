//! Estimation results and the error model against the exact baseline.

use crate::core::config::Method;
use crate::error::{Result, SampenError};

/// Guard added to the exact entropy before dividing, so relative error stays
/// finite when the exact value is near zero.
pub const RELATIVE_ERROR_EPSILON: f64 = 1e-8;

/// Sample entropy from pair counts: `-ln(a / b)`.
///
/// Returns `None` when either count is zero: the entropy is undefined
/// there, not zero and not infinite.
pub fn sampen_from_counts(a: f64, b: f64) -> Option<f64> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    Some(-(a / b).ln())
}

/// Outcome of one entropy computation.
///
/// Produced once per [`ExperimentConfig`](crate::core::ExperimentConfig) and
/// immutable afterwards; the result store owns persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub method: Method,
    pub m: usize,
    /// Relative tolerance the run was configured with.
    pub r: f64,
    /// Series length.
    pub n: usize,
    pub sample_size: Option<usize>,
    pub sample_num: Option<usize>,
    /// `-ln(A/B)`; `None` when either count was zero.
    pub sample_entropy: Option<f64>,
    /// Pair count at template length m + 1 (rescaled for sampling methods).
    pub a: f64,
    /// Pair count at template length m.
    pub b: f64,
    /// Wall-clock duration of the computation, in seconds. Reported, never
    /// used for control flow.
    pub computation_time: f64,
}

impl EstimationResult {
    /// The entropy value, or `UndefinedEntropy` when a count was zero.
    pub fn entropy(&self) -> Result<f64> {
        self.sample_entropy.ok_or(SampenError::UndefinedEntropy)
    }

    /// Denominator for normalized counts: the sample size for sampling
    /// methods, the series length for the exact method.
    fn normalization(&self) -> f64 {
        let size = match self.sample_size {
            Some(size) if self.method.is_sampling() => size,
            _ => self.n,
        };
        (size * size) as f64
    }

    /// `a` divided by the squared size of the space it was counted over.
    pub fn a_normalized(&self) -> f64 {
        self.a / self.normalization()
    }

    pub fn b_normalized(&self) -> f64 {
        self.b / self.normalization()
    }
}

/// Error of an estimate relative to the exact baseline.
///
/// Only constructible when both entropies are defined; callers that lack an
/// exact baseline must omit these fields rather than defaulting them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
    /// estimate − exact.
    pub absolute: f64,
    /// absolute / (exact + ε).
    pub relative: f64,
    /// Difference of normalized A counts.
    pub a_error: f64,
    /// Difference of normalized B counts.
    pub b_error: f64,
}

impl ErrorMetrics {
    /// Compare an estimate against the exact baseline.
    ///
    /// Returns `None` when either entropy is undefined; error metrics are
    /// meaningless without both values.
    pub fn against(estimate: &EstimationResult, exact: &EstimationResult) -> Option<Self> {
        let est = estimate.sample_entropy?;
        let reference = exact.sample_entropy?;
        let absolute = est - reference;
        Some(Self {
            absolute,
            relative: absolute / (reference + RELATIVE_ERROR_EPSILON),
            a_error: estimate.a_normalized() - exact.a_normalized(),
            b_error: estimate.b_normalized() - exact.b_normalized(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(method: Method, entropy: Option<f64>, a: f64, b: f64) -> EstimationResult {
        EstimationResult {
            method,
            m: 2,
            r: 0.2,
            n: 100,
            sample_size: method.is_sampling().then_some(10),
            sample_num: method.is_sampling().then_some(1),
            sample_entropy: entropy,
            a,
            b,
            computation_time: 0.0,
        }
    }

    #[test]
    fn entropy_from_counts() {
        assert_relative_eq!(
            sampen_from_counts(3.0, 6.0).unwrap(),
            2.0_f64.ln(),
            epsilon = 1e-12
        );
        assert_eq!(sampen_from_counts(0.0, 6.0), None);
        assert_eq!(sampen_from_counts(3.0, 0.0), None);
    }

    #[test]
    fn strict_accessor_surfaces_undefined() {
        let undefined = result(Method::Exact, None, 0.0, 6.0);
        assert_eq!(undefined.entropy(), Err(SampenError::UndefinedEntropy));
        let defined = result(Method::Exact, Some(0.5), 3.0, 6.0);
        assert_relative_eq!(defined.entropy().unwrap(), 0.5);
    }

    #[test]
    fn normalization_uses_sample_size_for_sampling_methods() {
        let exact = result(Method::Exact, Some(0.5), 300.0, 600.0);
        assert_relative_eq!(exact.a_normalized(), 300.0 / 10_000.0);

        let sampled = result(Method::UniformRandom, Some(0.5), 3.0, 6.0);
        assert_relative_eq!(sampled.a_normalized(), 3.0 / 100.0);
    }

    #[test]
    fn error_metrics_match_hand_computation() {
        let exact = result(Method::Exact, Some(0.5), 300.0, 600.0);
        let estimate = result(Method::QuasiRandom, Some(0.6), 3.0, 6.0);
        let err = ErrorMetrics::against(&estimate, &exact).unwrap();
        assert_relative_eq!(err.absolute, 0.1, epsilon = 1e-12);
        assert_relative_eq!(err.relative, 0.1 / (0.5 + 1e-8), epsilon = 1e-12);
        assert_relative_eq!(err.a_error, 0.03 - 0.03, epsilon = 1e-12);
        assert_relative_eq!(err.b_error, 0.06 - 0.06, epsilon = 1e-12);
    }

    #[test]
    fn error_metrics_omitted_when_a_value_is_undefined() {
        let exact = result(Method::Exact, Some(0.5), 300.0, 600.0);
        let undefined = result(Method::QuasiRandom, None, 0.0, 6.0);
        assert_eq!(ErrorMetrics::against(&undefined, &exact), None);
        assert_eq!(ErrorMetrics::against(&exact, &undefined), None);
    }
}
