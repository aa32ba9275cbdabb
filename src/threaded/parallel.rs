//! Fork-join parallel kernels.

use rayon::prelude::*;

use crate::config::KernelConfig;
use crate::kernels::dot::dot;
use crate::kernels::lanes::{Lanes, NativeLanes};
use crate::matrix::Matrix;

/// Runs `f(row, col)` for every element of C and adds the result into it.
///
/// C is walked in `bs`×`bs` tiles in a fixed order. Inside a tile, the
/// (row, col) pairs form one collapsed parallel loop: the tile's rows are
/// split into disjoint row slices and every element handed to a worker as
/// its own `&mut f32`, so no two workers can write the same cell. The call
/// for a tile returns only after all its elements are done.
fn for_each_element<F>(c: &mut Matrix, bs: usize, f: F)
where
    F: Fn(usize, usize) -> f32 + Sync,
{
    let n = c.n();
    debug_assert!(bs > 0 && n % bs == 0, "block size {bs} does not divide {n}");

    for hblock in (0..n).step_by(bs) {
        for vblock in (0..n).step_by(bs) {
            c.rows_mut(vblock, vblock + bs)
                .par_chunks_mut(n)
                .enumerate()
                .flat_map(move |(r, row)| {
                    row[hblock..hblock + bs]
                        .par_iter_mut()
                        .enumerate()
                        .map(move |(j, cell)| (vblock + r, hblock + j, cell))
                })
                .for_each(|(row, col, cell)| *cell += f(row, col));
        }
    }
}

/// Parallel scalar multiplication on B in natural layout.
///
/// Each element is a plain strided reduction over a column of B; the work
/// split is the same as [`matmul_parallel_transposed_simd`].
pub fn matmul_parallel(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    let n = a.n();
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(!b.is_transposed(), "parallel kernel expects B in natural layout");

    for_each_element(c, cfg.block_size, |row, col| {
        let a_row = a.row(row);
        (0..n).map(|k| a_row[k] * b.get(k, col)).sum::<f32>()
    });
}

/// Parallel vectorized multiplication on a pre-transposed B, at the width
/// of `V`.
///
/// Output tiles of `cfg.block_size` are processed one after another; the
/// elements of each tile are spread over the current rayon pool, each
/// computed with the vectorized [`dot`]. N must be a multiple of the block
/// size and of `V::LANES`.
pub fn matmul_parallel_transposed_simd_with<V: Lanes>(
    a: &Matrix,
    bt: &Matrix,
    c: &mut Matrix,
    cfg: &KernelConfig,
) {
    let n = a.n();
    debug_assert!(bt.n() == n && c.n() == n);
    debug_assert!(bt.is_transposed(), "parallel dot kernel expects B transposed");

    for_each_element(c, cfg.block_size, |row, col| dot::<V>(a.row(row), bt.row(col)));
}

/// [`matmul_parallel_transposed_simd_with`] at the native width.
pub fn matmul_parallel_transposed_simd(
    a: &Matrix,
    bt: &Matrix,
    c: &mut Matrix,
    cfg: &KernelConfig,
) {
    matmul_parallel_transposed_simd_with::<NativeLanes>(a, bt, c, cfg);
}
