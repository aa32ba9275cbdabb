use super::Matrix;

impl Matrix {
    /// Transpose in place: swaps `m[i][j]` and `m[j][i]` for every `i < j`.
    ///
    /// Kernels that read B's columns as rows need this done before they are
    /// called. Applying it twice restores the original matrix and clears the
    /// transposed flag again.
    ///
    /// # Example
    ///
    /// ```
    /// use matmul_kernels::Matrix;
    ///
    /// let mut m = Matrix::from_fn(2, |i, j| (i * 2 + j) as f32);
    /// m.transpose_in_place();
    ///
    /// assert_eq!(m.as_slice(), &[0.0, 2.0,
    ///                            1.0, 3.0]);
    /// assert!(m.is_transposed());
    /// ```
    pub fn transpose_in_place(&mut self) {
        let n = self.n;
        let data = self.as_mut_slice();
        for i in 0..n {
            for j in i + 1..n {
                data.swap(i * n + j, j * n + i);
            }
        }
        self.transposed = !self.transposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_moves_columns_to_rows() {
        let mut m = Matrix::from_fn(3, |i, j| (i * 3 + j) as f32);
        m.transpose_in_place();
        assert_eq!(m.row(0), &[0.0, 3.0, 6.0]);
        assert_eq!(m.row(2), &[2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let original = Matrix::from_fn(16, |i, j| (i as f32).sin() + j as f32 * 0.5);
        let mut m = original.clone();
        m.transpose_in_place();
        assert_ne!(m, original);
        m.transpose_in_place();
        assert_eq!(m, original);
        assert!(!m.is_transposed());
    }

    #[test]
    fn test_transpose_trivial_sizes() {
        let mut empty = Matrix::zeros(0);
        empty.transpose_in_place();
        let mut one = Matrix::filled(1, 4.0);
        one.transpose_in_place();
        assert_eq!(one.get(0, 0), 4.0);
    }
}
