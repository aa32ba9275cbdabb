use super::Matrix;
use crate::config::KernelConfig;

/// Multiplication with a pre-transposed B: `C[i][k] += Σ_j A[i][j] · Bᵀ[k][j]`.
///
/// Same arithmetic as [`matmul_baseline`](super::naive::matmul_baseline),
/// but with B stored as Bᵀ every output element is a dot product of two
/// rows, so both operands are read with stride 1.
///
/// The caller must have run [`Matrix::transpose_in_place`] on `bt`;
/// otherwise the result is silently wrong (checked only in debug builds).
pub fn matmul_transposed(a: &Matrix, bt: &Matrix, c: &mut Matrix, _cfg: &KernelConfig) {
    let n = a.n();
    debug_assert!(bt.n() == n && c.n() == n);
    debug_assert!(bt.is_transposed(), "transposed kernel expects B transposed");

    for i in 0..n {
        let a_row = a.row(i);
        let c_row = c.row_mut(i);
        for (k, c_ik) in c_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (&x, &y) in a_row.iter().zip(bt.row(k)) {
                sum += x * y;
            }
            *c_ik += sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_baseline;

    #[test]
    fn test_transposed_matches_baseline() {
        let n = 24;
        let cfg = KernelConfig::default();
        let a = Matrix::from_fn(n, |i, j| ((i * 7 + j) % 10) as f32);
        let mut b = Matrix::from_fn(n, |i, j| ((i + 3 * j) % 10) as f32);

        let mut expected = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut expected, &cfg);

        b.transpose_in_place();
        let mut c = Matrix::zeros(n);
        matmul_transposed(&a, &b, &mut c, &cfg);

        // Small integers: both orders are exact.
        assert_eq!(c, expected);
    }
}
