//! Packing: copying a tile into contiguous scratch so kernels read it
//! sequentially, plus the inverse copies.
//!
//! Natural packing keeps the tile row-major (`to[i * width + j]`).
//! Transposed packing stores it column-major (`to[j * height + i]`), so a
//! column of the tile becomes a contiguous run.

use super::{Matrix, Tile};
use crate::kernels::lanes::Lanes;

/// Copy `tile` of `from` into `to`, row-major.
///
/// `to` must hold at least `tile.len()` elements.
pub fn pack(to: &mut [f32], from: &Matrix, tile: Tile) {
    debug_assert!(!tile.is_empty());
    for (i, dst) in to[..tile.len()].chunks_exact_mut(tile.width).enumerate() {
        dst.copy_from_slice(&from.row(tile.row + i)[tile.col..tile.col + tile.width]);
    }
}

/// Copy `tile` of `from` into `to`, transposed (column-major).
pub fn pack_transposed(to: &mut [f32], from: &Matrix, tile: Tile) {
    debug_assert!(!tile.is_empty());
    let h = tile.height;
    for i in 0..h {
        let src = &from.row(tile.row + i)[tile.col..tile.col + tile.width];
        for (j, &x) in src.iter().enumerate() {
            to[j * h + i] = x;
        }
    }
}

/// Inverse of [`pack`]: write a row-major packed tile back into `to`.
pub fn unpack(to: &mut Matrix, from: &[f32], tile: Tile) {
    debug_assert!(!tile.is_empty());
    for (i, src) in from[..tile.len()].chunks_exact(tile.width).enumerate() {
        to.row_mut(tile.row + i)[tile.col..tile.col + tile.width].copy_from_slice(src);
    }
}

/// Inverse of [`pack_transposed`].
pub fn unpack_transposed(to: &mut Matrix, from: &[f32], tile: Tile) {
    debug_assert!(!tile.is_empty());
    let h = tile.height;
    for i in 0..h {
        let dst = &mut to.row_mut(tile.row + i)[tile.col..tile.col + tile.width];
        for (j, x) in dst.iter_mut().enumerate() {
            *x = from[j * h + i];
        }
    }
}

/// Load `to.len()` rows of `from`, starting at `(row, col)`, one vector per
/// row, each `V::LANES` wide.
///
/// `bv[r]` ends up holding the tile's row `r`.
pub fn pack_into_vecs<V: Lanes>(to: &mut [V], from: &Matrix, row: usize, col: usize) {
    for (r, v) in to.iter_mut().enumerate() {
        *v = V::load(&from.row(row + r)[col..]);
    }
}

/// Add each vector of `from` into the matching row of `to`, starting at
/// `(row, col)`.
pub fn add_from_vecs<V: Lanes>(to: &mut Matrix, from: &[V], row: usize, col: usize) {
    for (i, &v) in from.iter().enumerate() {
        let dst = &mut to.row_mut(row + i)[col..col + V::LANES];
        let sum = V::load(dst).add(v);
        sum.store(dst);
    }
}
