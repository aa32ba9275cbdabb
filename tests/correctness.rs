use matmul_kernels::harness::{Bench, check_matrix, random_matrix};
use matmul_kernels::registry::Operand;
use matmul_kernels::{
    BenchConfig, ConfigError, Error, Kernel, KernelConfig, Matrix, find, kernels,
    matmul_baseline, multiply,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const EPSILON: f32 = 1e-3;

/// Kernels the running CPU can execute.
fn supported() -> impl Iterator<Item = &'static Kernel> {
    kernels().iter().filter(|k| k.is_supported())
}

/// Copy of `b` in the layout `kernel` expects.
fn oriented(b: &Matrix, kernel: &Kernel) -> Matrix {
    let mut b = b.clone();
    if kernel.operand == Operand::Transposed {
        b.transpose_in_place();
    }
    b
}

fn config_for(n: usize) -> KernelConfig {
    if n >= 32 {
        KernelConfig::default()
    } else {
        KernelConfig::uniform(8)
    }
}

fn run(kernel: &Kernel, a: &Matrix, b: &Matrix, c: &mut Matrix) {
    let b = oriented(b, kernel);
    kernel
        .run(a, &b, c, &config_for(a.n()))
        .unwrap_or_else(|e| panic!("{}: {e}", kernel.name));
}

// ============================================================
// Reference equivalence
// ============================================================

#[test]
fn test_all_kernels_match_reference() {
    for n in [8, 16, 32, 64] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let a = random_matrix(n, &mut rng);
        let b = random_matrix(n, &mut rng);
        let mut expected = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut expected, &KernelConfig::default());

        for kernel in supported() {
            let mut c = Matrix::zeros(n);
            run(kernel, &a, &b, &mut c);
            if let Err(mismatch) = check_matrix(&c, &expected, EPSILON) {
                panic!("{} at N={n}: {mismatch}", kernel.name);
            }
        }
    }
}

#[test]
fn test_identity_times_ones() {
    let n = 16;
    let a = Matrix::identity(n);
    let b = Matrix::filled(n, 1.0);
    for kernel in supported() {
        let mut c = Matrix::zeros(n);
        run(kernel, &a, &b, &mut c);
        assert_eq!(c, Matrix::filled(n, 1.0), "{}", kernel.name);
    }
}

#[test]
fn test_zeros_stay_zero() {
    let n = 8;
    let a = Matrix::zeros(n);
    let b = Matrix::zeros(n);
    for kernel in supported() {
        let mut c = Matrix::zeros(n);
        run(kernel, &a, &b, &mut c);
        assert!(c.as_slice().iter().all(|&x| x == 0.0), "{}", kernel.name);
    }
}

#[test]
fn test_rerun_after_zeroing_is_identical() {
    let n = 32;
    let mut rng = StdRng::seed_from_u64(99);
    let a = random_matrix(n, &mut rng);
    let b = random_matrix(n, &mut rng);

    for kernel in supported() {
        let mut c = Matrix::zeros(n);
        run(kernel, &a, &b, &mut c);
        let first = c.clone();
        c.fill_zero();
        run(kernel, &a, &b, &mut c);
        assert_eq!(c, first, "{}", kernel.name);
    }
}

// ============================================================
// Accumulation and partition
// ============================================================

#[test]
fn test_every_element_written_exactly_once() {
    // C starts at a sentinel; with A = I every element must end at exactly
    // sentinel + B. A dropped tile leaves the sentinel, a doubled one adds B
    // twice.
    let n = 64;
    let sentinel = 1000.0;
    let a = Matrix::identity(n);
    let b = Matrix::from_fn(n, |i, j| (i * n + j + 1) as f32);

    for kernel in supported() {
        let mut c = Matrix::filled(n, sentinel);
        run(kernel, &a, &b, &mut c);
        for i in 0..n {
            for j in 0..n {
                assert_eq!(
                    c.get(i, j),
                    sentinel + b.get(i, j),
                    "{} at ({i}, {j})",
                    kernel.name
                );
            }
        }
    }
}

// ============================================================
// Registry and harness
// ============================================================

#[test]
fn test_registry_errors() {
    assert!(matches!(find("gemm_12x4"), Err(Error::UnknownKernel(_))));

    let n = 40;
    let a = Matrix::identity(n);
    let b = Matrix::filled(n, 1.0);
    let mut c = Matrix::zeros(n);
    let err = find("packed_simd")
        .unwrap()
        .run(&a, &b, &mut c, &KernelConfig::uniform(16))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::NotDivisible { n: 40, width: 16, .. })
    ));

    let err = find("parallel_transposed_simd")
        .unwrap()
        .run(&a, &b, &mut c, &KernelConfig::uniform(8))
        .unwrap_err();
    assert!(matches!(err, Error::OperandLayout { .. }));
    assert_eq!(c, Matrix::zeros(n));
}

#[test]
fn test_bench_suite_small() {
    let config = BenchConfig {
        n: 64,
        seed: 1,
        epsilon: EPSILON,
        ..BenchConfig::default()
    };
    let mut bench = Bench::new(config);
    let reports = bench.run_all().unwrap();
    assert_eq!(reports[0].kernel, "baseline");
    assert_eq!(reports.len(), supported().count());
}

#[test]
fn test_multiply() {
    for n in [12, 64] {
        let a = Matrix::from_fn(n, |i, j| ((i + 2 * j) % 5) as f32);
        let b = Matrix::from_fn(n, |i, j| ((3 * i + j) % 7) as f32);
        let mut expected = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut expected, &KernelConfig::default());

        let mut c = Matrix::zeros(n);
        multiply(&a, &b, &mut c).unwrap();
        assert_eq!(c, expected, "N={n}");
    }
}
