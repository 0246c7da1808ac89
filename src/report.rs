//! Textual reporting and error-curve assembly.
//!
//! Renders the per-method summary block (result source, timing, entropy,
//! raw and normalized counts, and error lines against the exact baseline)
//! and collects relative-error-vs-sample-size curves for external log-log
//! plotting. Rendering is plain text; no plotting happens here.

use std::fmt::Write as _;

use crate::core::{ErrorMetrics, EstimationResult, Method};
use crate::store::ResultSource;

const RULE_WIDTH: usize = 76;

/// Header block describing the experiment one report covers.
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    pub record_name: String,
    pub n: usize,
    pub m: usize,
    pub r: f64,
    pub r_abs: f64,
    pub variance: f64,
    pub sample_size: Option<usize>,
    pub sample_num: Option<usize>,
}

impl ExperimentSummary {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out, "{:<16}: {}", "record name", self.record_name);
        let _ = writeln!(out, "{:<16}: {}", "data length", self.n);
        let _ = writeln!(out, "{:<16}: {}", "template length", self.m);
        let _ = writeln!(out, "{:<16}: {}", "threshold (r)", self.r);
        let _ = writeln!(out, "{:<16}: {:.6}", "threshold (abs)", self.r_abs);
        if let Some(size) = self.sample_size {
            let _ = writeln!(out, "{:<16}: {}", "sample size", size);
        }
        if let Some(num) = self.sample_num {
            let _ = writeln!(out, "{:<16}: {}", "sample num", num);
        }
        let _ = writeln!(out, "{:<16}: {:.4}", "variance", self.variance);
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        out
    }
}

/// One method's contribution to the report.
#[derive(Debug, Clone)]
pub struct MethodReport {
    pub result: EstimationResult,
    pub source: ResultSource,
    /// Comparison against the exact baseline; omitted when no baseline (or
    /// no defined entropy) is available.
    pub errors: Option<ErrorMetrics>,
}

impl MethodReport {
    /// Build a report line item, deriving the error block from the baseline
    /// when one is supplied.
    pub fn new(
        result: EstimationResult,
        source: ResultSource,
        exact: Option<&EstimationResult>,
    ) -> Self {
        let errors = exact.and_then(|exact| ErrorMetrics::against(&result, exact));
        Self {
            result,
            source,
            errors,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let r = &self.result;
        let _ = writeln!(out, "method: {}", r.method);
        let _ = writeln!(out, "\t{:<30}: {}", "result source", self.source.label());
        let _ = writeln!(out, "\t{:<30}: {:.4}", "time", r.computation_time);
        match r.sample_entropy {
            Some(entropy) => {
                let _ = writeln!(out, "\t{:<30}: {:.6}", "sample entropy", entropy);
            }
            None => {
                let _ = writeln!(out, "\t{:<30}: undefined", "sample entropy");
            }
        }
        if let Some(err) = &self.errors {
            let _ = writeln!(out, "\t{:<30}: {:.2e}", "absolute error", err.absolute);
            let _ = writeln!(out, "\t{:<30}: {:.2e}", "relative error", err.relative);
        }
        let _ = writeln!(out, "\t{:<30}: {:.2e} ({:.2e})", "a", r.a, r.a_normalized());
        let _ = writeln!(out, "\t{:<30}: {:.2e} ({:.2e})", "b", r.b, r.b_normalized());
        if let Some(err) = &self.errors {
            let _ = writeln!(out, "\t{:<30}: {:.2e}", "error of a", err.a_error);
            let _ = writeln!(out, "\t{:<30}: {:.2e}", "error of b", err.b_error);
        }
        out
    }
}

/// Render the full experiment report: header plus one block per method.
pub fn render_report(summary: &ExperimentSummary, methods: &[MethodReport]) -> String {
    let mut out = summary.render();
    for method in methods {
        out.push_str(&method.render());
    }
    out
}

/// Relative error as a function of sample size for one (method, m) pair.
///
/// The data behind a log-log error plot. Sample sizes where the entropy was
/// undefined keep a `None` gap rather than a fabricated zero, matching how
/// consumers must treat missing points.
#[derive(Debug, Clone)]
pub struct ErrorCurve {
    pub method: Method,
    pub m: usize,
    sample_sizes: Vec<usize>,
    relative_errors: Vec<Option<f64>>,
}

impl ErrorCurve {
    pub fn new(method: Method, m: usize) -> Self {
        Self {
            method,
            m,
            sample_sizes: Vec::new(),
            relative_errors: Vec::new(),
        }
    }

    /// Record one observation, comparing an estimate to the exact baseline.
    pub fn push(&mut self, sample_size: usize, estimate: &EstimationResult, exact: &EstimationResult) {
        let relative = ErrorMetrics::against(estimate, exact).map(|err| err.relative);
        self.sample_sizes.push(sample_size);
        self.relative_errors.push(relative);
    }

    pub fn len(&self) -> usize {
        self.sample_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_sizes.is_empty()
    }

    /// Defined (sample_size, |relative error|) points, gaps skipped.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.sample_sizes
            .iter()
            .zip(&self.relative_errors)
            .filter_map(|(&size, err)| err.map(|e| (size, e.abs())))
    }

    /// Raw observations, including gaps.
    pub fn observations(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.sample_sizes
            .iter()
            .zip(&self.relative_errors)
            .map(|(&size, &err)| (size, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(method: Method, entropy: Option<f64>) -> EstimationResult {
        EstimationResult {
            method,
            m: 2,
            r: 0.2,
            n: 100,
            sample_size: method.is_sampling().then_some(50),
            sample_num: method.is_sampling().then_some(4),
            sample_entropy: entropy,
            a: 10.0,
            b: 20.0,
            computation_time: 0.5,
        }
    }

    fn summary() -> ExperimentSummary {
        ExperimentSummary {
            record_name: "rec (1)".to_string(),
            n: 100,
            m: 2,
            r: 0.2,
            r_abs: 1.5,
            variance: 56.25,
            sample_size: Some(50),
            sample_num: Some(4),
        }
    }

    #[test]
    fn report_contains_every_field() {
        let exact = result(Method::Exact, Some(0.7));
        let estimate = result(Method::SpatialIndex, Some(0.75));
        let report = render_report(
            &summary(),
            &[
                MethodReport::new(exact.clone(), ResultSource::Computed, None),
                MethodReport::new(estimate, ResultSource::Cache, Some(&exact)),
            ],
        );
        assert!(report.contains("record name     : rec (1)"));
        assert!(report.contains("method: exact"));
        assert!(report.contains("method: spatial-index"));
        assert!(report.contains("result source"));
        assert!(report.contains("cache"));
        assert!(report.contains("computation"));
        assert!(report.contains("relative error"));
        assert!(report.contains("error of a"));
    }

    #[test]
    fn error_lines_are_omitted_without_a_baseline() {
        let estimate = result(Method::QuasiRandom, Some(0.75));
        let rendered = MethodReport::new(estimate, ResultSource::Computed, None).render();
        assert!(!rendered.contains("absolute error"));
        assert!(!rendered.contains("error of a"));
    }

    #[test]
    fn undefined_entropy_renders_as_undefined() {
        let estimate = result(Method::UniformRandom, None);
        let exact = result(Method::Exact, Some(0.7));
        let report = MethodReport::new(estimate, ResultSource::Computed, Some(&exact));
        assert!(report.errors.is_none());
        assert!(report.render().contains(": undefined"));
    }

    #[test]
    fn error_curve_keeps_gaps_but_skips_them_in_points() {
        let exact = result(Method::Exact, Some(0.7));
        let good = result(Method::QuasiRandom, Some(0.75));
        let undefined = result(Method::QuasiRandom, None);

        let mut curve = ErrorCurve::new(Method::QuasiRandom, 2);
        curve.push(10, &undefined, &exact);
        curve.push(100, &good, &exact);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.observations().next().unwrap(), (10, None));
        let points: Vec<_> = curve.points().collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, 100);
        assert!(points[0].1 > 0.0);
    }
}
