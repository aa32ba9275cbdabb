//! Packed SIMD micro-kernel and its driver.

use crate::config::{KernelConfig, MAX_PACK_WIDTH};
use crate::kernels::lanes::{Lanes, MAX_LANES, NativeLanes};
use crate::matrix::pack::{add_from_vecs, pack, pack_into_vecs};
use crate::matrix::tile::tiles;
use crate::matrix::{Matrix, Tile};

/// Computes one L×L tile of C at (x, y), L = `V::LANES`:
/// `C[x..x+L, y..y+L] += A[x..x+L, :] × B[:, y..y+L]`.
///
/// Holds L vector accumulators, one per output row. The reduction runs in
/// chunks of `pack_width` (P):
///
/// 1. A's L×P block is packed row-major into stack scratch.
/// 2. B's P×L block is loaded into P vectors, `bv[r]` = row r of the chunk.
/// 3. For each output row i and chunk row r, `packed_a[i][r]` is broadcast
///    and fused-multiply-added with `bv[r]` into `cv[i]`, i.e. a rank-1
///    update of the whole accumulator row.
///
/// After the last chunk every accumulator is added into its row of C.
///
/// Requires N to be a multiple of L and of P, and P <= [`MAX_PACK_WIDTH`].
#[inline]
pub fn kernel_tile<V: Lanes>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    x: usize,
    y: usize,
    pack_width: usize,
) {
    let n = a.n();
    let lanes = V::LANES;
    let pw = pack_width;

    let mut packed_a = [0.0f32; MAX_LANES * MAX_PACK_WIDTH];
    let mut bv = [V::zero(); MAX_PACK_WIDTH];
    let mut cv = [V::zero(); MAX_LANES];

    for zz in (0..n).step_by(pw) {
        pack(&mut packed_a, a, Tile::new(x, zz, lanes, pw));
        pack_into_vecs(&mut bv[..pw], b, zz, y);

        for (i, acc) in cv[..lanes].iter_mut().enumerate() {
            let a_row = &packed_a[i * pw..(i + 1) * pw];
            for (&alpha, &b_row) in a_row.iter().zip(&bv[..pw]) {
                *acc = V::splat(alpha).mul_add(b_row, *acc);
            }
        }
    }

    add_from_vecs(c, &cv[..lanes], x, y);
}

/// Packed SIMD multiplication at the width of `V`.
///
/// Splits C into `V::LANES`-sided tiles and runs [`kernel_tile`] on each,
/// with the reduction chunk `cfg.pack_width`. B in natural layout.
pub fn matmul_packed_simd_with<V: Lanes>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    cfg: &KernelConfig,
) {
    let n = a.n();
    let pw = cfg.pack_width;
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(V::LANES <= MAX_LANES);
    debug_assert!(n % V::LANES == 0, "N={n} is not a multiple of {} lanes", V::LANES);
    debug_assert!(pw > 0 && pw <= MAX_PACK_WIDTH && n % pw == 0);
    debug_assert!(!b.is_transposed(), "packed kernel expects B in natural layout");

    for tile in tiles(n, V::LANES) {
        kernel_tile::<V>(a, b, c, tile.row, tile.col, pw);
    }
}

/// [`matmul_packed_simd_with`] at the native width (8×8 tiles).
pub fn matmul_packed_simd(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    matmul_packed_simd_with::<NativeLanes>(a, b, c, cfg);
}
