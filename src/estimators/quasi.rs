//! Quasi-random (low-discrepancy) pair sampling.
//!
//! Draws pair indices from the base-2 radical-inverse (van der Corput)
//! sequence mapped onto the pair space. Successive draws fill the space far
//! more evenly than independent uniform draws, so the estimator variance
//! shrinks faster than O(1/√N) as the sample grows.
//!
//! The sequence is fully deterministic: a fixed configuration produces
//! bit-identical estimates on every run and every trial, which is what makes
//! exact cache hits possible. Per-trial variation is opt-in only: with
//! [`QuasiRandomSampler::with_shift_per_trial`] each trial applies a
//! Cranley–Patterson rotation (a seed-derived additive shift mod 1), keeping
//! the low-discrepancy structure while decorrelating trials.

use crate::core::TemplateSet;
use crate::estimators::{rescale_pair_count, CountSampler, PairSpace, Trial};

/// Low-discrepancy pair sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuasiRandomSampler {
    shift_per_trial: bool,
}

impl QuasiRandomSampler {
    pub fn new() -> Self {
        Self {
            shift_per_trial: false,
        }
    }

    /// Re-parameterize the sequence per trial with a digital shift.
    ///
    /// Without this, all trials of a configuration are identical by design.
    pub fn with_shift_per_trial(mut self, shift: bool) -> Self {
        self.shift_per_trial = shift;
        self
    }
}

impl CountSampler for QuasiRandomSampler {
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
        let shift = if self.shift_per_trial {
            unit_fraction(trial.seed)
        } else {
            0.0
        };

        let mut raw = 0u64;
        for draw in 1..=target_size as u64 {
            let mut x = radical_inverse_base2(draw) + shift;
            if x >= 1.0 {
                x -= 1.0;
            }
            let index = ((x * space.len() as f64) as u64).min(space.len() - 1);
            let (i, j) = space.decode(index);
            if templates.within(i, j, r_abs) {
                raw += 1;
            }
        }
        rescale_pair_count(raw, space.len(), target_size)
    }

    fn deterministic(&self) -> bool {
        !self.shift_per_trial
    }
}

/// Base-2 radical inverse of `i`: the bit-reversed fraction in [0, 1).
#[inline]
fn radical_inverse_base2(i: u64) -> f64 {
    (i.reverse_bits() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Map a seed to a fraction in [0, 1) through a 64-bit finalizer, so nearby
/// seeds land on unrelated shifts.
#[inline]
fn unit_fraction(seed: u64) -> f64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
