//! Error-curve demo: relative error vs sample size per method.
//!
//! Prints the (sample size, |relative error|) table backing a log-log
//! convergence plot, for each sampling method against the exact baseline.
//!
//! Run with: cargo run --example error_curves

use anofox_sampen::aggregate::{run_method, EstimateOptions};
use anofox_sampen::core::{Method, Series};
use anofox_sampen::report::ErrorCurve;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

fn main() {
    println!("=== Relative Error vs Sample Size ===\n");

    let n = 3000;
    let m = 2;
    let r = 0.15;

    // Gaussian surrogate data, the standard workload for convergence studies.
    let normal = Normal::new(0.0, 1.0).expect("unit normal");
    let mut rng = StdRng::seed_from_u64(2019);
    let values: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
    let series = Series::new("gauss", values).expect("series");

    let exact = run_method(&series, m, r, Method::Exact, &EstimateOptions::default())
        .expect("exact estimation");
    println!(
        "exact: sampen = {:.6}, time = {:.3}s\n",
        exact.sample_entropy.unwrap_or(f64::NAN),
        exact.computation_time
    );

    let sizes = [256usize, 512, 1024, 2048, 4096, 8192];
    for method in [Method::QuasiRandom, Method::UniformRandom, Method::SpatialIndex] {
        let mut curve = ErrorCurve::new(method, m);
        for &size in &sizes {
            let options = EstimateOptions::new(size, 8).with_seed(7);
            let estimate = run_method(&series, m, r, method, &options).expect("estimation");
            curve.push(size, &estimate, &exact);
        }

        println!("--- {method} ---");
        println!("{:>10} {:>16}", "size", "|rel. error|");
        for (size, err) in curve.observations() {
            match err {
                Some(err) => println!("{:>10} {:>16.3e}", size, err.abs()),
                None => println!("{:>10} {:>16}", size, "undefined"),
            }
        }
        println!();
    }
}
