//! Benchmark collaborators: random inputs, validation, timing and the suite
//! driver that runs every registered kernel against one reference.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};

use crate::config::BenchConfig;
use crate::error::{Error, Mismatch, Result};
use crate::matrix::naive::matmul_baseline;
use crate::matrix::Matrix;
use crate::registry::{kernels, Kernel};

/// N×N matrix of uniform samples in `[0, 1)`.
pub fn random_matrix<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    Matrix::from_fn(n, |_, _| rng.random::<f32>())
}

/// Compares `actual` against `expected` element by element.
///
/// Returns the first element (row-major order) whose absolute difference
/// exceeds `epsilon`. A NaN on either side counts as a mismatch.
pub fn check_matrix(actual: &Matrix, expected: &Matrix, epsilon: f32) -> std::result::Result<(), Mismatch> {
    let n = expected.n();
    assert_eq!(actual.n(), n, "compared matrices differ in size");

    for (idx, (&got, &want)) in actual.as_slice().iter().zip(expected.as_slice()).enumerate() {
        let diff = (got - want).abs();
        if !(diff <= epsilon) {
            return Err(Mismatch {
                row: idx / n,
                col: idx % n,
                expected: want,
                actual: got,
                diff,
            });
        }
    }
    Ok(())
}

/// Throughput of one N×N multiplication: 2·N³ flops over `seconds`.
pub fn gflops(n: usize, seconds: f64) -> f64 {
    let n = n as f64;
    2.0 * n * n * n / (seconds * 1e9)
}

/// Timing of one kernel run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kernel: &'static str,
    pub seconds: f64,
    pub gflops: f64,
}

/// Operands, output and reference for one benchmark suite.
pub struct Bench {
    config: BenchConfig,
    a: Matrix,
    b: Matrix,
    c: Matrix,
    reference: Matrix,
}

impl Bench {
    /// Fills A and B from the configured seed and computes the reference
    /// product with the baseline kernel.
    pub fn new(config: BenchConfig) -> Self {
        let n = config.n;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let a = random_matrix(n, &mut rng);
        let b = random_matrix(n, &mut rng);

        let mut reference = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut reference, &config.kernel);

        Self {
            config,
            a,
            b,
            c: Matrix::zeros(n),
            reference,
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn reference(&self) -> &Matrix {
        &self.reference
    }

    /// Runs one kernel, times it and validates the result.
    ///
    /// B is transposed (or transposed back) first if the kernel expects the
    /// other layout. C is zeroed afterwards whether or not validation passed.
    pub fn run(&mut self, kernel: &Kernel) -> Result<Report> {
        if self.b.is_transposed() != kernel.operand.is_transposed() {
            self.b.transpose_in_place();
        }

        let start = Instant::now();
        kernel.run(&self.a, &self.b, &mut self.c, &self.config.kernel)?;
        let seconds = start.elapsed().as_secs_f64();

        let checked = check_matrix(&self.c, &self.reference, self.config.epsilon);
        self.c.fill_zero();

        if let Err(mismatch) = checked {
            error!(kernel = kernel.name, %mismatch, "validation failed");
            return Err(Error::Validation {
                kernel: kernel.name,
                mismatch,
            });
        }

        let report = Report {
            kernel: kernel.name,
            seconds,
            gflops: gflops(self.config.n, seconds),
        };
        info!(
            kernel = report.kernel,
            seconds = report.seconds,
            gflops = report.gflops,
            "kernel done"
        );
        Ok(report)
    }

    /// Runs every registered kernel in order, stopping at the first failure.
    ///
    /// Kernels the CPU cannot execute are skipped. B is left in natural
    /// layout on success.
    pub fn run_all(&mut self) -> Result<Vec<Report>> {
        let mut reports = Vec::with_capacity(kernels().len());
        for kernel in kernels() {
            if !kernel.is_supported() {
                warn!(kernel = kernel.name, "skipped, CPU lacks avx2+fma");
                continue;
            }
            reports.push(self.run(kernel)?);
        }
        if self.b.is_transposed() {
            self.b.transpose_in_place();
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::registry::find;

    fn small_config(n: usize) -> BenchConfig {
        BenchConfig {
            n,
            seed: 42,
            epsilon: 1e-3,
            kernel: KernelConfig::uniform(8),
        }
    }

    #[test]
    fn test_random_matrix_range_and_seed() {
        let m1 = random_matrix(16, &mut StdRng::seed_from_u64(7));
        let m2 = random_matrix(16, &mut StdRng::seed_from_u64(7));
        assert_eq!(m1, m2);
        assert!(m1.as_slice().iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn test_check_matrix_reports_first_mismatch() {
        let expected = Matrix::filled(4, 1.0);
        let mut actual = expected.clone();
        assert_eq!(check_matrix(&actual, &expected, 1e-3), Ok(()));

        actual.set(2, 1, 1.5);
        actual.set(3, 0, 9.0);
        let mismatch = check_matrix(&actual, &expected, 1e-3).unwrap_err();
        assert_eq!((mismatch.row, mismatch.col), (2, 1));
        assert_eq!(mismatch.diff, 0.5);
        assert_eq!(mismatch.actual, 1.5);

        actual.set(2, 1, f32::NAN);
        assert!(check_matrix(&actual, &expected, 1e-3).is_err());
    }

    #[test]
    fn test_gflops() {
        assert_eq!(gflops(1000, 2.0), 1.0);
        assert_eq!(gflops(1024, 1.0), 2.0 * 1024f64.powi(3) / 1e9);
    }

    #[test]
    fn test_run_all_restores_layout_and_zeroes_c() {
        let mut bench = Bench::new(small_config(32));
        let reports = bench.run_all().unwrap();
        let supported = kernels().iter().filter(|k| k.is_supported()).count();
        assert_eq!(reports.len(), supported);
        assert!(!bench.b.is_transposed());
        assert!(bench.c.as_slice().iter().all(|&x| x == 0.0));
        assert!(reports.iter().all(|r| r.gflops > 0.0));
    }

    #[test]
    fn test_run_reports_validation_failure() {
        let mut bench = Bench::new(small_config(16));
        bench.reference.add(0, 3, 1.0);
        let err = bench.run(find("baseline").unwrap()).unwrap_err();
        match err {
            Error::Validation { kernel, mismatch } => {
                assert_eq!(kernel, "baseline");
                assert_eq!((mismatch.row, mismatch.col), (0, 3));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(bench.c.as_slice().iter().all(|&x| x == 0.0));
    }
}
