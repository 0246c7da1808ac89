//! Method comparison demo.
//!
//! Run with: cargo run --example method_comparison

use anofox_sampen::aggregate::{run_method, EstimateOptions};
use anofox_sampen::core::{ExperimentConfig, Method, Series};
use anofox_sampen::report::{ExperimentSummary, MethodReport};
use anofox_sampen::store::ResultStore;
use anofox_sampen::tolerance;

fn main() {
    println!("=== Sample Entropy Method Comparison ===\n");

    let n = 2000;
    let m = 2;
    let r = 0.2;

    // A mildly irregular signal: two incommensurate tones plus a wobble.
    let values: Vec<f64> = (0..n)
        .map(|i| {
            (i as f64 * 0.1).sin()
                + 0.5 * (i as f64 * 0.37).cos()
                + 0.3 * (i as f64 * 0.73).sin()
        })
        .collect();
    let series = Series::new("two-tone", values).unwrap();

    let store = ResultStore::new();
    let options = EstimateOptions::new(2048, 8).with_seed(42);

    // Exact baseline first; the samplers are judged against it.
    let exact_config = ExperimentConfig::exact(series.name(), m, r, series.len());
    let (exact, exact_source) = store
        .get_or_compute(exact_config, || {
            run_method(&series, m, r, Method::Exact, &EstimateOptions::default())
        })
        .expect("exact estimation");

    let mut reports = vec![MethodReport::new(exact.clone(), exact_source, None)];
    for method in [Method::QuasiRandom, Method::UniformRandom, Method::SpatialIndex] {
        let config = ExperimentConfig::sampled(series.name(), m, r, series.len(), method, 2048, 8);
        let (result, source) = store
            .get_or_compute(config, || run_method(&series, m, r, method, &options))
            .expect("sampled estimation");
        reports.push(MethodReport::new(result, source, Some(&exact)));
    }

    let summary = ExperimentSummary {
        record_name: series.name().to_string(),
        n: series.len(),
        m,
        r,
        r_abs: tolerance::scale(series.values(), r).expect("tolerance"),
        variance: tolerance::population_variance(series.values()).expect("variance"),
        sample_size: Some(2048),
        sample_num: Some(8),
    };
    print!("{}", anofox_sampen::report::render_report(&summary, &reports));
}
