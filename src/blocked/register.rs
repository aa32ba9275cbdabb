//! Register-blocked multiplication (outer-product tiling).

use crate::config::{KernelConfig, RegisterTile};
use crate::matrix::tile::tiles;
use crate::matrix::Matrix;

/// Register-blocked multiplication with the tile width from
/// `cfg.register_tile`.
///
/// Every B×B output tile keeps B×B scalar accumulators live across the full
/// reduction. Each step loads B values from a column of A and B values from
/// a row of B and applies their outer product to all accumulators, so each
/// loaded value is reused B times. The tile is added into C once at the end.
///
/// The register tile width must divide N.
pub fn matmul_register_blocked(a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) {
    match cfg.register_tile {
        RegisterTile::W2 => blocked::<2>(a, b, c),
        RegisterTile::W4 => blocked::<4>(a, b, c),
        RegisterTile::W8 => blocked::<8>(a, b, c),
        RegisterTile::W16 => blocked::<16>(a, b, c),
        RegisterTile::W32 => blocked::<32>(a, b, c),
    }
}

fn blocked<const B: usize>(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    let n = a.n();
    debug_assert!(b.n() == n && c.n() == n);
    debug_assert!(n % B == 0, "register tile {B} does not divide {n}");
    debug_assert!(!b.is_transposed(), "register-blocked kernel expects B in natural layout");

    for tile in tiles(n, B) {
        kernel::<B>(a, b, c, tile.row, tile.col);
    }
}

/// Computes the B×B tile of C at (x, y).
#[inline]
fn kernel<const B: usize>(a: &Matrix, b: &Matrix, c: &mut Matrix, x: usize, y: usize) {
    let n = a.n();
    let mut acc = [[0.0f32; B]; B];

    for k in 0..n {
        let mut ax = [0.0f32; B];
        for (i, v) in ax.iter_mut().enumerate() {
            *v = a.get(x + i, k);
        }
        let bx = &b.row(k)[y..y + B];

        for (acc_row, &a_i) in acc.iter_mut().zip(&ax) {
            for (acc_ij, &b_j) in acc_row.iter_mut().zip(bx) {
                *acc_ij += a_i * b_j;
            }
        }
    }

    for (i, acc_row) in acc.iter().enumerate() {
        for (c_ij, &v) in c.row_mut(x + i)[y..y + B].iter_mut().zip(acc_row) {
            *c_ij += v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_baseline;

    #[test]
    fn test_register_blocked_all_widths() {
        let n = 32;
        let a = Matrix::from_fn(n, |i, j| ((i * 5 + j * 3) % 10) as f32);
        let b = Matrix::from_fn(n, |i, j| ((i * 2 + j) % 10) as f32);
        let mut expected = Matrix::zeros(n);
        matmul_baseline(&a, &b, &mut expected, &KernelConfig::default());

        for tile in [
            RegisterTile::W2,
            RegisterTile::W4,
            RegisterTile::W8,
            RegisterTile::W16,
            RegisterTile::W32,
        ] {
            let cfg = KernelConfig {
                register_tile: tile,
                ..KernelConfig::default()
            };
            let mut c = Matrix::zeros(n);
            matmul_register_blocked(&a, &b, &mut c, &cfg);
            assert_eq!(c, expected, "tile {tile:?}");
        }
    }

    #[test]
    fn test_register_blocked_adds_into_c() {
        let n = 8;
        let a = Matrix::identity(n);
        let b = Matrix::from_fn(n, |i, j| (i * n + j) as f32);
        let mut c = Matrix::filled(n, 1.0);

        matmul_register_blocked(&a, &b, &mut c, &KernelConfig::default());

        for i in 0..n {
            for j in 0..n {
                assert_eq!(c.get(i, j), b.get(i, j) + 1.0);
            }
        }
    }
}
