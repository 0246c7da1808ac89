//! Core data types: series, templates, configuration keys, results.

pub mod config;
pub mod result;
pub mod series;

pub use config::{ExperimentConfig, Method};
pub use result::{sampen_from_counts, ErrorMetrics, EstimationResult, RELATIVE_ERROR_EPSILON};
pub use series::{Series, TemplateSet};
