//! AVX2 + FMA intrinsic versions of the dot-product and packed 8×8 kernels.
//!
//! These read matrix rows with aligned 256-bit loads, which is sound
//! because every row of a `Matrix` whose side is a multiple of 8 starts on a
//! 32-byte boundary. The safe entry points check the CPU at run time and
//! fall back to the portable `wide` kernels when AVX2 or FMA is missing.

use crate::blocked::packed::matmul_packed_simd;
use crate::config::{KernelConfig, MAX_PACK_WIDTH};
use crate::kernels::dot::matmul_transposed_simd;
use crate::matrix::Matrix;

/// True when the running CPU has both AVX2 and FMA.
pub fn avx2_fma_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// Vectorized dot-product kernel on a pre-transposed B, written with raw
/// AVX2 intrinsics.
///
/// # Panics
///
/// Panics if N is not a multiple of 8 (the aligned loads depend on it).
pub fn matmul_transposed_simd_avx2(a: &Matrix, bt: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    let n = a.n();
    assert!(bt.n() == n && c.n() == n, "matrix sides differ");
    assert_eq!(n % 8, 0, "N={n} is not a multiple of 8");
    debug_assert!(bt.is_transposed(), "vectorized dot kernel expects B transposed");

    #[cfg(target_arch = "x86_64")]
    if avx2_fma_available() {
        // SAFETY: AVX2 and FMA were detected; N % 8 == 0 keeps every row
        // 32-byte aligned.
        unsafe { x86::transposed_simd(a, bt, c) };
        return;
    }

    matmul_transposed_simd(a, bt, c, cfg);
}

/// Packed 8×8 micro-kernel driver written with raw AVX2 intrinsics.
///
/// # Panics
///
/// Panics if N is not a multiple of 8 or of `cfg.pack_width`, or if the pack
/// width exceeds [`MAX_PACK_WIDTH`].
pub fn matmul_packed_simd_avx2(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    let n = a.n();
    let pw = cfg.pack_width;
    assert!(b.n() == n && c.n() == n, "matrix sides differ");
    assert_eq!(n % 8, 0, "N={n} is not a multiple of 8");
    assert!(
        pw > 0 && pw <= MAX_PACK_WIDTH && n % pw == 0,
        "pack width {pw} does not fit N={n}"
    );
    debug_assert!(!b.is_transposed(), "packed kernel expects B in natural layout");

    #[cfg(target_arch = "x86_64")]
    if avx2_fma_available() {
        // SAFETY: features detected, rows aligned (N % 8 == 0), pack width
        // bounded by the scratch size.
        unsafe { x86::packed_simd(a, b, c, pw) };
        return;
    }

    matmul_packed_simd(a, b, c, cfg);
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    use crate::config::MAX_PACK_WIDTH;
    use crate::matrix::pack::pack;
    use crate::matrix::{Matrix, Tile};

    /// # Safety
    ///
    /// CPU must support AVX2 and FMA; N must be a multiple of 8.
    #[target_feature(enable = "avx2,fma")]
    #[allow(unsafe_op_in_unsafe_fn)]
    pub(super) unsafe fn transposed_simd(a: &Matrix, bt: &Matrix, c: &mut Matrix) {
        let n = a.n();
        for i in 0..n {
            let a_row = a.row(i).as_ptr();
            for k in 0..n {
                let b_row = bt.row(k).as_ptr();
                let mut ans = _mm256_setzero_ps();
                for j in (0..n).step_by(8) {
                    let x = _mm256_load_ps(a_row.add(j));
                    let y = _mm256_load_ps(b_row.add(j));
                    ans = _mm256_fmadd_ps(x, y, ans);
                }
                let mut lanes = [0.0f32; 8];
                _mm256_storeu_ps(lanes.as_mut_ptr(), ans);
                c.add(i, k, lanes.iter().sum());
            }
        }
    }

    /// # Safety
    ///
    /// CPU must support AVX2 and FMA; N must be a multiple of 8 and of
    /// `pack_width`, and `pack_width <= MAX_PACK_WIDTH`.
    #[target_feature(enable = "avx2,fma")]
    #[allow(unsafe_op_in_unsafe_fn)]
    pub(super) unsafe fn packed_simd(a: &Matrix, b: &Matrix, c: &mut Matrix, pack_width: usize) {
        let n = a.n();
        for x in (0..n).step_by(8) {
            for y in (0..n).step_by(8) {
                kernel_8x8(a, b, c, x, y, pack_width);
            }
        }
    }

    /// Computes the 8×8 tile of C at (x, y): C[x.., y..] += A[x.., :] × B[:, y..]
    ///
    /// Eight YMM accumulators, one per output row. For every chunk of
    /// `pack_width` reduction steps, A's 8×pw block is packed row-major and
    /// B's pw×8 block is loaded one register per row; each packed A value is
    /// then broadcast and FMA'd against the matching B row.
    #[target_feature(enable = "avx2,fma")]
    #[allow(unsafe_op_in_unsafe_fn)]
    unsafe fn kernel_8x8(
        a: &Matrix,
        b: &Matrix,
        c: &mut Matrix,
        x: usize,
        y: usize,
        pack_width: usize,
    ) {
        let n = a.n();
        let pw = pack_width;
        let mut ax = [0.0f32; 8 * MAX_PACK_WIDTH];
        let mut bv = [_mm256_setzero_ps(); MAX_PACK_WIDTH];
        let mut cv = [_mm256_setzero_ps(); 8];

        for zz in (0..n).step_by(pw) {
            pack(&mut ax, a, Tile::new(x, zz, 8, pw));
            for (r, v) in bv[..pw].iter_mut().enumerate() {
                *v = _mm256_load_ps(b.row(zz + r).as_ptr().add(y));
            }

            for (i, acc) in cv.iter_mut().enumerate() {
                let a_row = &ax[i * pw..(i + 1) * pw];
                for (alpha, &bvec) in a_row.iter().zip(&bv[..pw]) {
                    *acc = _mm256_fmadd_ps(_mm256_broadcast_ss(alpha), bvec, *acc);
                }
            }
        }

        for (i, &acc) in cv.iter().enumerate() {
            let dst = c.row_mut(x + i).as_mut_ptr().add(y);
            _mm256_store_ps(dst, _mm256_add_ps(_mm256_load_ps(dst), acc));
        }
    }
}
