//! Count estimators: the exact matcher and the sampling strategies.
//!
//! All approximations implement [`CountSampler`], the shared seam for
//! estimating a single pair count from a reduced candidate set. The exact
//! matcher in [`exact`] is the reference oracle the sampled estimates are
//! judged against.

pub mod exact;
pub mod kdtree;
pub mod quasi;
pub mod uniform;

pub use exact::ExactMatcher;
pub use kdtree::SpatialIndexSampler;
pub use quasi::QuasiRandomSampler;
pub use uniform::UniformRandomSampler;

use rayon::prelude::*;

use crate::core::TemplateSet;

/// Context for one independent sampling trial.
///
/// Each trial owns its seed; samplers must not share RNG state across
/// trials. Deterministic samplers ignore the seed unless explicitly
/// configured to re-parameterize per trial.
#[derive(Debug, Clone, Copy)]
pub struct Trial {
    /// Zero-based trial index within the configured `sample_num`.
    pub index: usize,
    /// Seed derived for this trial by the aggregator.
    pub seed: u64,
}

/// Strategy interface for estimating one pair count.
///
/// `estimate` returns the sampled raw count rescaled to a population
/// equivalent: an estimate of the number of unordered template pairs within
/// the tolerance, comparable to the exact matcher's count at the same
/// template length.
pub trait CountSampler: Send + Sync {
    /// Estimated population pair count for the given template set.
    fn estimate(
        &self,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trial: Trial,
    ) -> f64;

    /// Whether repeated trials with a fixed configuration produce identical
    /// estimates.
    fn deterministic(&self) -> bool {
        false
    }

    /// Run a batch of independent trials.
    ///
    /// Trials never share mutable state, so the parallel path is a plain
    /// rayon map; implementations with a shared read-only structure (the
    /// kd-tree) override this to build it once for the whole batch.
    fn estimate_trials(
        &self,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trials: &[Trial],
        parallel: bool,
    ) -> Vec<f64> {
        if parallel {
            trials
                .par_iter()
                .map(|&t| self.estimate(templates, r_abs, target_size, t))
                .collect()
        } else {
            trials
                .iter()
                .map(|&t| self.estimate(templates, r_abs, target_size, t))
                .collect()
        }
    }
}

/// The space of unordered template pairs (i, j), i < j, over N templates.
///
/// Pair-based samplers draw linear indices in `[0, len)` and decode them via
/// the row-offset bijection; `index_of` is its inverse.
#[derive(Debug, Clone, Copy)]
pub struct PairSpace {
    templates: u64,
}

impl PairSpace {
    pub fn new(template_count: usize) -> Self {
        Self {
            templates: template_count as u64,
        }
    }

    /// Total number of unordered pairs: N * (N - 1) / 2.
    pub fn len(&self) -> u64 {
        self.templates * self.templates.saturating_sub(1) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs whose first index is below `i`.
    #[inline]
    fn offset(&self, i: u64) -> u64 {
        i * (self.templates - 1) - i * i.saturating_sub(1) / 2
    }

    /// Decode a linear pair index into (i, j) with i < j.
    ///
    /// The row is found from the closed-form quadratic and then corrected by
    /// at most a step in each direction, so the decode stays exact even where
    /// the f64 square root is off by an ulp.
    pub fn decode(&self, index: u64) -> (usize, usize) {
        debug_assert!(index < self.len());
        let n = self.templates as f64;
        let discriminant = (2.0 * n - 1.0).powi(2) - 8.0 * index as f64;
        let mut i = ((2.0 * n - 1.0 - discriminant.max(0.0).sqrt()) / 2.0).floor() as u64;
        i = i.min(self.templates - 2);
        while i > 0 && self.offset(i) > index {
            i -= 1;
        }
        while i + 2 < self.templates && self.offset(i + 1) <= index {
            i += 1;
        }
        let j = i + 1 + (index - self.offset(i));
        (i as usize, j as usize)
    }

    /// Linear index of the pair (i, j), i < j.
    pub fn index_of(&self, i: usize, j: usize) -> u64 {
        debug_assert!(i < j && (j as u64) < self.templates);
        self.offset(i as u64) + (j as u64 - i as u64 - 1)
    }
}

/// Rescale a raw sampled count to a population-equivalent estimate:
/// `raw * (space / target_size)`.
#[inline]
pub(crate) fn rescale_pair_count(raw: u64, space: u64, target_size: usize) -> f64 {
    raw as f64 * space as f64 / target_size as f64
}
