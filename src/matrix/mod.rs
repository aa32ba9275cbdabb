//! The square matrix type and the scalar kernels built directly on it.
//!
//! `Matrix` owns an aligned row-major buffer. Kernels address it through
//! rows and tiles; the flat `row * n + col` formula stays in here.
//!
//! The naive kernel is the correctness baseline every other kernel is
//! checked against.

mod aligned;
pub mod naive;
pub mod pack;
pub mod tile;
pub mod tiled;
pub mod transpose;
pub mod transposed;

use std::fmt;

pub use aligned::ALIGNMENT;
pub use tile::Tile;

use aligned::AlignedBuf;

/// An N×N row-major `f32` matrix in a 64-byte aligned allocation.
///
/// Also records whether it currently holds the transpose of what was
/// written into it, so kernels that need a pre-transposed operand can
/// assert it in debug builds.
#[derive(Clone)]
pub struct Matrix {
    buf: AlignedBuf,
    n: usize,
    transposed: bool,
}

impl Matrix {
    /// An all-zero N×N matrix.
    pub fn zeros(n: usize) -> Self {
        let len = n
            .checked_mul(n)
            .unwrap_or_else(|| panic!("matrix side {n} overflows"));
        Self {
            buf: AlignedBuf::zeroed(len),
            n,
            transposed: false,
        }
    }

    /// Matrix with every element set to `value`.
    pub fn filled(n: usize, value: f32) -> Self {
        let mut m = Self::zeros(n);
        m.as_mut_slice().fill(value);
        m
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Builds a matrix from `f(row, col)`.
    pub fn from_fn<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut m = Self::zeros(n);
        for (i, row) in m.as_mut_slice().chunks_exact_mut(n.max(1)).enumerate() {
            for (j, x) in row.iter_mut().enumerate() {
                *x = f(i, j);
            }
        }
        m
    }

    /// Side length N.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Whether the contents are currently transposed.
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(
            row < self.n && col < self.n,
            "({row}, {col}) out of bounds for {0}×{0}",
            self.n
        );
        row * self.n + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.buf.as_slice()[self.offset(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.offset(row, col);
        self.buf.as_mut_slice()[idx] = value;
    }

    /// Adds `value` to element (row, col).
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.offset(row, col);
        self.buf.as_mut_slice()[idx] += value;
    }

    /// Row `i` as a contiguous slice of length N.
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.n;
        &self.buf.as_slice()[start..start + self.n]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        let start = i * self.n;
        let n = self.n;
        &mut self.buf.as_mut_slice()[start..start + n]
    }

    /// Rows `start..end` as one contiguous slice.
    pub fn rows_mut(&mut self, start: usize, end: usize) -> &mut [f32] {
        let n = self.n;
        &mut self.buf.as_mut_slice()[start * n..end * n]
    }

    /// The whole buffer, row-major.
    pub fn as_slice(&self) -> &[f32] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.buf.as_mut_slice()
    }

    /// Sets every element to zero. Required on C before every accumulating
    /// kernel.
    pub fn fill_zero(&mut self) {
        self.as_mut_slice().fill(0.0);
    }
}

impl PartialEq for Matrix {
    /// Element-wise equality; the transposed flag is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.n > 8 {
            return f
                .debug_struct("Matrix")
                .field("n", &self.n)
                .field("transposed", &self.transposed)
                .finish_non_exhaustive();
        }
        writeln!(f, "Matrix {0}×{0}:", self.n)?;
        for i in 0..self.n {
            for x in self.row(i) {
                write!(f, "{x:8.2} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_addressing() {
        let m = Matrix::from_fn(4, |i, j| (i * 10 + j) as f32);
        assert_eq!(m.get(2, 3), 23.0);
        assert_eq!(m.row(1), &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(m.as_slice()[2 * 4 + 1], 21.0);
    }

    #[test]
    fn test_rows_are_aligned() {
        let m = Matrix::zeros(64);
        for i in 0..64 {
            assert_eq!(m.row(i).as_ptr() as usize % 32, 0);
        }
    }

    #[test]
    fn test_identity_and_fill_zero() {
        let mut m = Matrix::identity(3);
        assert_eq!(m.as_slice(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        m.add(0, 1, 2.0);
        assert_eq!(m.get(0, 1), 2.0);
        m.fill_zero();
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_rows_mut_spans_rows() {
        let mut m = Matrix::zeros(4);
        m.rows_mut(1, 3).fill(1.0);
        assert_eq!(m.as_slice().iter().filter(|&&x| x == 1.0).count(), 8);
        assert_eq!(m.row(0), &[0.0; 4]);
        assert_eq!(m.row(3), &[0.0; 4]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        let m = Matrix::zeros(4);
        let _ = m.get(4, 0);
    }
}
