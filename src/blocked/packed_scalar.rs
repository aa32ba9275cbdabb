//! Scalar packed kernel: both operand tiles copied into stack scratch.

use crate::config::{KernelConfig, MAX_PACK_WIDTH};
use crate::matrix::pack::{pack, pack_transposed};
use crate::matrix::tile::tiles;
use crate::matrix::{Matrix, Tile};

const SCRATCH: usize = MAX_PACK_WIDTH * MAX_PACK_WIDTH;

/// Packed scalar multiplication with P = `cfg.pack_width`.
///
/// For every P×P output tile, walks the reduction in chunks of P: packs A's
/// tile row-major and B's tile transposed, so each output element of the
/// tile is a dot product of two contiguous P-long runs. Partial sums stay in
/// a stack tile and are added into C once.
///
/// P must divide N and be at most [`MAX_PACK_WIDTH`].
pub fn matmul_packed_scalar(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    let n = a.n();
    let p = cfg.pack_width;
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(p > 0 && p <= MAX_PACK_WIDTH && n % p == 0);
    debug_assert!(!b.is_transposed(), "packed kernel expects B in natural layout");

    for tile in tiles(n, p) {
        kernel(a, b, c, tile, p);
    }
}

fn kernel(a: &Matrix, b: &Matrix, c: &mut Matrix, tile: Tile, p: usize) {
    let n = a.n();
    let mut ax = [0.0f32; SCRATCH];
    let mut bx = [0.0f32; SCRATCH];
    let mut cx = [0.0f32; SCRATCH];

    for zz in (0..n).step_by(p) {
        pack(&mut ax, a, Tile::square(tile.row, zz, p));
        pack_transposed(&mut bx, b, Tile::square(zz, tile.col, p));

        for (i, c_row) in cx[..p * p].chunks_exact_mut(p).enumerate() {
            let a_row = &ax[i * p..(i + 1) * p];
            for (j, c_ij) in c_row.iter_mut().enumerate() {
                let b_col = &bx[j * p..(j + 1) * p];
                *c_ij += a_row.iter().zip(b_col).map(|(x, y)| x * y).sum::<f32>();
            }
        }
    }

    for (i, c_row) in cx[..p * p].chunks_exact(p).enumerate() {
        for (dst, &v) in c.row_mut(tile.row + i)[tile.col..tile.col + p]
            .iter_mut()
            .zip(c_row)
        {
            *dst += v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_baseline;

    #[test]
    fn test_packed_scalar_correctness() {
        let n = 32;
        let a = Matrix::from_fn(n, |i, j| ((i * 7 + j * 3) % 10) as f32);
        let b = Matrix::from_fn(n, |i, j| ((i + j * 5) % 10) as f32);
        let mut expected = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut expected, &KernelConfig::default());

        for p in [1, 2, 8, 16, 32] {
            let mut c = Matrix::zeros(n);
            matmul_packed_scalar(&a, &b, &mut c, &KernelConfig::uniform(p));
            assert_eq!(c, expected, "pack width {p}");
        }
    }
}
