//! Uniform random pair sampling.
//!
//! The Monte Carlo baseline: `target_size` independent pair indices drawn
//! uniformly with replacement, re-seeded per trial. Estimator standard error
//! shrinks as O(1/√N); repeated trials with different seeds show non-zero
//! variance where the unshifted quasi-random sampler shows none.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::TemplateSet;
use crate::estimators::{rescale_pair_count, CountSampler, PairSpace, Trial};

/// Independent uniform pair sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandomSampler;

impl UniformRandomSampler {
    pub fn new() -> Self {
        Self
    }
}

impl CountSampler for UniformRandomSampler {
    fn estimate(
        &self,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trial: Trial,
    ) -> f64 {
        let space = PairSpace::new(templates.count());
        if space.is_empty() || target_size == 0 {
            return 0.0;
        }
        // Each trial owns its RNG; no state is shared across trials.
        let mut rng = StdRng::seed_from_u64(trial.seed);

        let mut raw = 0u64;
        for _ in 0..target_size {
            let index = rng.gen_range(0..space.len());
            let (i, j) = space.decode(index);
            if templates.within(i, j, r_abs) {
                raw += 1;
            }
        }
        rescale_pair_count(raw, space.len(), target_size)
    }
}
