//! Rectangular windows inside a raster

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A sub-rectangle of a raster, addressed by its upper-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// Column of the upper-left cell
    pub x: usize,
    /// Row of the upper-left cell
    pub y: usize,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl Window {
    pub fn new(x: usize, y: usize, rows: usize, cols: usize) -> Self {
        Self { x, y, rows, cols }
    }

    /// Window covering a whole `rows` x `cols` raster
    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(0, 0, rows, cols)
    }

    /// Number of cells in the window
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Check that the window is non-empty and fits a `rows` x `cols` raster
    pub fn validate(&self, rows: usize, cols: usize) -> Result<()> {
        let fits = self.y.checked_add(self.rows).is_some_and(|end| end <= rows)
            && self.x.checked_add(self.cols).is_some_and(|end| end <= cols);

        if self.is_empty() || !fits {
            return Err(Error::InvalidWindow {
                x: self.x,
                y: self.y,
                rows: self.rows,
                cols: self.cols,
                raster_rows: rows,
                raster_cols: cols,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Window::full(10, 20).validate(10, 20).is_ok());
        assert!(Window::new(5, 2, 8, 15).validate(10, 20).is_ok());
        assert!(Window::new(6, 2, 8, 15).validate(10, 20).is_err());
        assert!(Window::new(0, 3, 8, 15).validate(10, 20).is_err());
        assert!(Window::new(0, 0, 0, 15).validate(10, 20).is_err());
        assert!(Window::new(usize::MAX, 0, 1, 1).validate(10, 20).is_err());
    }
}
