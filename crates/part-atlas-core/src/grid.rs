use crate::error::{AtlasError, Result};

/// Cell coordinates within the atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

/// Deterministic square-ish grid over N equal-size cells.
///
/// `tiles_per_row = ceil(sqrt(N))`, `tiles_per_col = ceil(N / tiles_per_row)`.
/// The mapping from ordinal index to `(row, col)` is a bijection over
/// `[0, tiles_per_row * tiles_per_col)`; trailing cells in the final row stay
/// empty and never receive a frame id.
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    count: usize,
    tiles_per_row: u32,
    tiles_per_col: u32,
}

impl GridLayout {
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(AtlasError::NoEligibleFiles);
        }
        let tiles_per_row = ceil_sqrt(count);
        let tiles_per_col = (count as u32).div_ceil(tiles_per_row);
        Ok(Self {
            count,
            tiles_per_row,
            tiles_per_col,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    pub fn tiles_per_col(&self) -> u32 {
        self.tiles_per_col
    }

    /// Cell for the input at zero-based ordinal `index`.
    ///
    /// # Panics
    /// Panics if `index >= count`.
    pub fn cell(&self, index: usize) -> GridCell {
        assert!(index < self.count, "cell index {index} out of range");
        let index = index as u32;
        GridCell {
            row: index / self.tiles_per_row,
            col: index % self.tiles_per_row,
        }
    }

    /// Pixel origin of `cell` for square cells of `cell_size` pixels.
    pub fn origin(&self, cell: GridCell, cell_size: u32) -> (u32, u32) {
        (cell.col * cell_size, cell.row * cell_size)
    }

    /// Full page dimensions in pixels for square cells of `cell_size`.
    pub fn page_size(&self, cell_size: u32) -> (u32, u32) {
        (
            self.tiles_per_row * cell_size,
            self.tiles_per_col * cell_size,
        )
    }
}

/// Smallest `r` with `r * r >= n`.
fn ceil_sqrt(n: usize) -> u32 {
    let mut r = (n as f64).sqrt().ceil() as u32;
    // guard against float rounding near perfect squares
    while (r as usize) * (r as usize) < n {
        r += 1;
    }
    while r > 1 && ((r - 1) as usize) * ((r - 1) as usize) >= n {
        r -= 1;
    }
    r
}
