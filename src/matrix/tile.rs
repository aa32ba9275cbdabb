//! Rectangular sub-views of a matrix, identified by their top-left corner.

/// A `height × width` region whose top-left element is `(row, col)`.
///
/// Not an allocation, only an addressing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
}

impl Tile {
    pub fn new(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    pub fn square(row: usize, col: usize, side: usize) -> Self {
        Self::new(row, col, side, side)
    }

    /// Number of elements covered.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The same region with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        Self::new(self.col, self.row, self.width, self.height)
    }

    /// Every `(row, col)` inside the tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let Tile {
            row,
            col,
            height,
            width,
        } = *self;
        (row..row + height).flat_map(move |i| (col..col + width).map(move |j| (i, j)))
    }
}

/// Splits an `n × n` matrix into `side × side` tiles in row-major tile order.
///
/// `side` must divide `n`; the tiles then cover every element exactly once.
pub fn tiles(n: usize, side: usize) -> impl Iterator<Item = Tile> {
    debug_assert!(side > 0 && n % side == 0, "tile side {side} does not divide {n}");
    (0..n)
        .step_by(side)
        .flat_map(move |i| (0..n).step_by(side).map(move |j| Tile::square(i, j, side)))
}
