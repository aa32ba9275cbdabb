use super::Matrix;
use crate::config::KernelConfig;

/// Cache-tiled scalar multiplication.
///
/// The baseline loop nest wrapped in three block loops of
/// `cfg.block_size`, so each inner step works on three tiles small enough
/// to stay in L1. Arithmetic is identical to the baseline.
///
/// `cfg.block_size` must divide N.
pub fn matmul_tiled(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    let n = a.n();
    let bs = cfg.block_size;
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(bs > 0 && n % bs == 0, "block size {bs} does not divide {n}");
    debug_assert!(!b.is_transposed(), "tiled kernel expects B in natural layout");

    for iblock in (0..n).step_by(bs) {
        for kblock in (0..n).step_by(bs) {
            for jblock in (0..n).step_by(bs) {
                for i in iblock..iblock + bs {
                    let a_row = &a.row(i)[jblock..jblock + bs];
                    let c_row = &mut c.row_mut(i)[kblock..kblock + bs];
                    for (j, &a_ij) in a_row.iter().enumerate() {
                        let b_row = &b.row(jblock + j)[kblock..kblock + bs];
                        for (c_ik, &b_jk) in c_row.iter_mut().zip(b_row) {
                            *c_ik += a_ij * b_jk;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_baseline;

    #[test]
    fn test_tiled_matches_baseline() {
        for (n, bs) in [(8, 8), (16, 4), (32, 8), (32, 16)] {
            let cfg = KernelConfig {
                block_size: bs,
                ..KernelConfig::default()
            };
            let a = Matrix::from_fn(n, |i, j| ((i * 5 + j) % 10) as f32);
            let b = Matrix::from_fn(n, |i, j| ((i + 7 * j) % 10) as f32);

            let mut expected = Matrix::zeros(n);
            matmul_baseline(&a, &b, &mut expected, &cfg);
            let mut c = Matrix::zeros(n);
            matmul_tiled(&a, &b, &mut c, &cfg);

            assert_eq!(c, expected, "n={n} block={bs}");
        }
    }
}
