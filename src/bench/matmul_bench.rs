use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use matmul_kernels::harness::random_matrix;
use matmul_kernels::{KernelConfig, Matrix, kernels};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_kernels(c: &mut Criterion) {
    let cfg = KernelConfig::default();

    for n in [128, 256] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let a = random_matrix(n, &mut rng);
        let b = random_matrix(n, &mut rng);
        let mut bt = b.clone();
        bt.transpose_in_place();

        let mut group = c.benchmark_group(format!("matmul_{n}"));
        group.throughput(Throughput::Elements((2 * n * n * n) as u64));
        group.sample_size(10);

        for kernel in kernels().iter().filter(|k| k.is_supported()) {
            let rhs = if kernel.operand.is_transposed() { &bt } else { &b };
            let mut out = Matrix::zeros(n);
            group.bench_with_input(BenchmarkId::from_parameter(kernel.name), &n, |bencher, _| {
                bencher.iter(|| {
                    out.fill_zero();
                    kernel
                        .run(&a, rhs, &mut out, &cfg)
                        .expect("benchmark kernel rejected its inputs");
                });
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_kernels);
criterion_main!(benches);
