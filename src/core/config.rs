//! Estimation methods and the experiment cache key.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, SampenError};

/// Estimation method.
///
/// A closed set: the exact matcher plus the three sampling strategies. Each
/// sampling variant is a genuinely distinct strategy behind the shared
/// count-estimator interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Exhaustive pairwise comparison; the reference oracle.
    Exact,
    /// Low-discrepancy pair sampling (deterministic).
    QuasiRandom,
    /// Independent uniform pair sampling with replacement.
    UniformRandom,
    /// kd-tree anchor counting with exact per-anchor range queries.
    SpatialIndex,
}

impl Method {
    /// Whether this method draws a reduced candidate set and therefore
    /// requires `sample_size` and `sample_num`.
    pub fn is_sampling(&self) -> bool {
        !matches!(self, Method::Exact)
    }

    /// All methods, exact first.
    pub fn all() -> [Method; 4] {
        [
            Method::Exact,
            Method::QuasiRandom,
            Method::UniformRandom,
            Method::SpatialIndex,
        ]
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Exact => "exact",
            Method::QuasiRandom => "quasi-random",
            Method::UniformRandom => "uniform-random",
            Method::SpatialIndex => "spatial-index",
        };
        f.write_str(name)
    }
}

/// The tuple identifying one computation.
///
/// Used as the result-store key: two configs compare equal only when every
/// field matches, including the optional sampling fields. `r` participates in
/// equality and hashing through its bit pattern.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Record identity (opaque to the estimation core).
    pub record_name: String,
    /// Template length m (>= 1).
    pub m: usize,
    /// Relative tolerance r (> 0).
    pub r: f64,
    /// Series length the computation ran on.
    pub length: usize,
    pub method: Method,
    /// Number of draws per trial; sampling methods only.
    pub sample_size: Option<usize>,
    /// Number of independent trials; sampling methods only.
    pub sample_num: Option<usize>,
    /// Whether the computation may use worker threads.
    pub parallel: bool,
}

impl ExperimentConfig {
    /// Key for the exact method.
    pub fn exact(record_name: impl Into<String>, m: usize, r: f64, length: usize) -> Self {
        Self {
            record_name: record_name.into(),
            m,
            r,
            length,
            method: Method::Exact,
            sample_size: None,
            sample_num: None,
            parallel: true,
        }
    }

    /// Key for a sampling method.
    pub fn sampled(
        record_name: impl Into<String>,
        m: usize,
        r: f64,
        length: usize,
        method: Method,
        sample_size: usize,
        sample_num: usize,
    ) -> Self {
        Self {
            record_name: record_name.into(),
            m,
            r,
            length,
            method,
            sample_size: Some(sample_size),
            sample_num: Some(sample_num),
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check internal consistency of the key.
    ///
    /// Sampling fields are required for sampling methods and rejected for the
    /// exact method, so equality over the full tuple stays meaningful.
    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(SampenError::InvalidParameter(
                "template length m must be at least 1".to_string(),
            ));
        }
        if !(self.r > 0.0) {
            return Err(SampenError::InvalidParameter(format!(
                "relative tolerance r must be positive, got {}",
                self.r
            )));
        }
        if self.length == 0 {
            return Err(SampenError::EmptySeries);
        }
        match (
            self.method.is_sampling(),
            self.sample_size.is_some() && self.sample_num.is_some(),
        ) {
            (true, false) => Err(SampenError::InvalidParameter(format!(
                "method {} requires sample_size and sample_num",
                self.method
            ))),
            (false, _) if self.sample_size.is_some() || self.sample_num.is_some() => {
                Err(SampenError::InvalidParameter(
                    "exact method takes no sampling parameters".to_string(),
                ))
            }
            _ => {
                if let Some(size) = self.sample_size {
                    if size == 0 {
                        return Err(SampenError::InvalidParameter(
                            "sample_size must be at least 1".to_string(),
                        ));
                    }
                }
                if let Some(num) = self.sample_num {
                    if num == 0 {
                        return Err(SampenError::InvalidParameter(
                            "sample_num must be at least 1".to_string(),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for ExperimentConfig {
    fn eq(&self, other: &Self) -> bool {
        self.record_name == other.record_name
            && self.m == other.m
            && self.r.to_bits() == other.r.to_bits()
            && self.length == other.length
            && self.method == other.method
            && self.sample_size == other.sample_size
            && self.sample_num == other.sample_num
            && self.parallel == other.parallel
    }
}

impl Eq for ExperimentConfig {}

impl Hash for ExperimentConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_name.hash(state);
        self.m.hash(state);
        self.r.to_bits().hash(state);
        self.length.hash(state);
        self.method.hash(state);
        self.sample_size.hash(state);
        self.sample_num.hash(state);
        self.parallel.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(config: &ExperimentConfig) -> u64 {
        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_covers_every_field() {
        let a = ExperimentConfig::sampled("rec", 2, 0.2, 1000, Method::QuasiRandom, 100, 10);
        let mut b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        b.sample_size = Some(200);
        assert_ne!(a, b);

        let mut c = a.clone();
        c.r = 0.3;
        assert_ne!(a, c);

        let d = a.clone().with_parallel(false);
        assert_ne!(a, d);
    }

    #[test]
    fn validate_rejects_mismatched_sampling_fields() {
        let mut exact = ExperimentConfig::exact("rec", 2, 0.2, 1000);
        assert!(exact.validate().is_ok());
        exact.sample_size = Some(10);
        assert!(exact.validate().is_err());

        let mut sampled = ExperimentConfig::sampled("rec", 2, 0.2, 1000, Method::SpatialIndex, 64, 5);
        assert!(sampled.validate().is_ok());
        sampled.sample_num = None;
        assert!(sampled.validate().is_err());
    }

    #[test]
    fn validate_rejects_degenerate_parameters() {
        assert!(ExperimentConfig::exact("rec", 0, 0.2, 100).validate().is_err());
        assert!(ExperimentConfig::exact("rec", 2, 0.0, 100).validate().is_err());
        assert!(ExperimentConfig::exact("rec", 2, -1.0, 100).validate().is_err());
        assert!(ExperimentConfig::exact("rec", 2, 0.2, 0).validate().is_err());
        assert!(
            ExperimentConfig::sampled("rec", 2, 0.2, 100, Method::UniformRandom, 0, 5)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn method_display_names_are_stable() {
        assert_eq!(Method::Exact.to_string(), "exact");
        assert_eq!(Method::QuasiRandom.to_string(), "quasi-random");
        assert_eq!(Method::UniformRandom.to_string(), "uniform-random");
        assert_eq!(Method::SpatialIndex.to_string(), "spatial-index");
    }
}
