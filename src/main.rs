//! Benchmark runner: every registered kernel on one random N×N problem.

use std::process::ExitCode;

use matmul_kernels::harness::{Bench, Report};
use matmul_kernels::{BenchConfig, Result};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "benchmark aborted");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = BenchConfig::from_env()?;
    println!("=== Matrix Multiplication Benchmark ===\n");
    println!(
        "Matrix: {n}×{n}, seed {seed:#x}, epsilon {eps}\n",
        n = config.n,
        seed = config.seed,
        eps = config.epsilon
    );

    let mut bench = Bench::new(config);
    let reports = bench.run_all()?;
    print_summary_table(&reports);
    Ok(())
}

fn print_summary_table(reports: &[Report]) {
    println!("{}", "=".repeat(70));
    println!(
        "{:<28} {:>12} {:>12} {:>12}",
        "Method", "Time", "GFLOPS", "Speedup"
    );
    println!("{}", "-".repeat(70));

    let Some(baseline) = reports.first() else {
        return;
    };
    for report in reports {
        println!(
            "{:<28} {:>9.2} ms {:>12.2} {:>11.1}×",
            report.kernel,
            report.seconds * 1000.0,
            report.gflops,
            baseline.seconds / report.seconds
        );
    }

    println!("{}", "=".repeat(70));
    println!("\nSpeedup relative to {}. Higher is better.\n", baseline.kernel);
}
