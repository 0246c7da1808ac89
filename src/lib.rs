//! # anofox-sampen
//!
//! Sample entropy estimation for long numeric time series.
//!
//! Provides an exact O(n²) template matcher as the reference oracle, three
//! sampling-based estimators that trade accuracy for speed (quasi-random
//! pair sampling, uniform random pair sampling, kd-tree anchor counting),
//! variance-scaled tolerance derivation, trial aggregation with an error
//! model against the exact baseline, series ingestion, a memoizing result
//! store, and textual reporting.
//!
//! # Example
//!
//! ```
//! use anofox_sampen::aggregate::{run_method, EstimateOptions};
//! use anofox_sampen::core::{Method, Series};
//!
//! let values: Vec<f64> = (0..300).map(|i| ((i * 7 + 3) % 23) as f64).collect();
//! let series = Series::new("demo", values).unwrap();
//!
//! let exact = run_method(&series, 2, 0.5, Method::Exact, &EstimateOptions::default()).unwrap();
//! let options = EstimateOptions::new(500, 8);
//! let sampled = run_method(&series, 2, 0.5, Method::QuasiRandom, &options).unwrap();
//!
//! assert!(exact.sample_entropy.is_some());
//! assert!(sampled.sample_entropy.is_some());
//! ```

#![allow(clippy::needless_range_loop)]

pub mod aggregate;
pub mod core;
pub mod error;
pub mod estimators;
pub mod io;
pub mod report;
pub mod store;
pub mod tolerance;

pub use error::{Result, SampenError};

pub mod prelude {
    pub use crate::aggregate::{run_method, EstimateOptions};
    pub use crate::core::{ErrorMetrics, EstimationResult, ExperimentConfig, Method, Series};
    pub use crate::error::{Result, SampenError};
    pub use crate::store::{ResultSource, ResultStore};
}
