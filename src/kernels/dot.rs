//! Vectorized dot-product kernel.

use super::lanes::{Lanes, NativeLanes};
use crate::config::KernelConfig;
use crate::matrix::Matrix;

/// Dot product of two equally long rows, `V::LANES` elements at a time.
///
/// One vector accumulator collects `x * y` with a fused multiply-add per
/// chunk; its lanes are summed once at the end. The summation order differs
/// from a scalar loop, so results agree with it only within a tolerance.
///
/// Both lengths must be a multiple of `V::LANES`.
#[inline]
pub fn dot<V: Lanes>(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    debug_assert!(x.len() % V::LANES == 0, "row length not a multiple of the vector width");

    let mut acc = V::zero();
    for (xs, ys) in x.chunks_exact(V::LANES).zip(y.chunks_exact(V::LANES)) {
        acc = V::load(xs).mul_add(V::load(ys), acc);
    }
    acc.reduce_sum()
}

/// `C[i][k] += dot(A[i], Bᵀ[k])` with the vector width picked by `V`.
///
/// Same precondition as [`matmul_transposed`](crate::matrix::transposed::matmul_transposed):
/// `bt` must already be transposed, and N must be a multiple of `V::LANES`.
pub fn matmul_transposed_simd_with<V: Lanes>(
    a: &Matrix,
    bt: &Matrix,
    c: &mut Matrix,
    _cfg: &KernelConfig,
) {
    let n = a.n();
    debug_assert!(bt.n() == n && c.n() == n);
    debug_assert!(bt.is_transposed(), "vectorized dot kernel expects B transposed");

    for i in 0..n {
        let a_row = a.row(i);
        for (k, c_ik) in c.row_mut(i).iter_mut().enumerate() {
            *c_ik += dot::<V>(a_row, bt.row(k));
        }
    }
}

/// [`matmul_transposed_simd_with`] at the native width.
pub fn matmul_transposed_simd(a: &Matrix, bt: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    matmul_transposed_simd_with::<NativeLanes>(a, bt, c, cfg);
}
