use super::Matrix;
use crate::config::KernelConfig;

/// Naive matrix multiplication: `C[i][k] += Σ_j A[i][j] · B[j][k]`.
///
/// The textbook triple loop, in i-j-k order: the two outer loops walk A's
/// row and the reduction index, the innermost loop streams across one row
/// of B and one row of C. No layout assumptions beyond square operands.
///
/// This is the trusted reference every other kernel is validated against,
/// not a fast path.
pub fn matmul_baseline(a: &Matrix, b: &Matrix, c: &mut Matrix, _cfg: &KernelConfig) {
    let n = a.n();
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(!b.is_transposed(), "baseline expects B in natural layout");

    for i in 0..n {
        let a_row = a.row(i);
        let c_row = c.row_mut(i);
        for (j, &a_ij) in a_row.iter().enumerate() {
            for (c_ik, &b_jk) in c_row.iter_mut().zip(b.row(j)) {
                *c_ik += a_ij * b_jk;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_2x2() {
        let a = Matrix::from_fn(2, |i, j| (i * 2 + j + 1) as f32);
        let b = Matrix::from_fn(2, |i, j| (i * 2 + j + 5) as f32);
        let mut c = Matrix::zeros(2);

        matmul_baseline(&a, &b, &mut c, &KernelConfig::default());

        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_baseline_accumulates() {
        let a = Matrix::identity(4);
        let b = Matrix::filled(4, 2.0);
        let mut c = Matrix::filled(4, 5.0);

        matmul_baseline(&a, &b, &mut c, &KernelConfig::default());

        assert!(c.as_slice().iter().all(|&x| x == 7.0));
    }
}
