//! Row-at-a-time cell sources

use crate::error::{Error, Result};
use crate::raster::{CellValue, Raster};

/// Supplies raster rows to a single-pass scan.
///
/// `read_row` fills `out` with the cells of absolute raster row `row`,
/// starting at column `col_offset`. Null cells are reported with the
/// category's null marker.
pub trait CellSource<T: CellValue> {
    fn read_row(&mut self, row: usize, col_offset: usize, out: &mut [T]) -> Result<()>;
}

impl<T: CellValue, S: CellSource<T> + ?Sized> CellSource<T> for &mut S {
    fn read_row(&mut self, row: usize, col_offset: usize, out: &mut [T]) -> Result<()> {
        (**self).read_row(row, col_offset, out)
    }
}

/// Row access to an in-memory [`Raster`]. No-data values become null markers.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a, T: CellValue> {
    raster: &'a Raster<T>,
}

impl<'a, T: CellValue> RowReader<'a, T> {
    pub fn new(raster: &'a Raster<T>) -> Self {
        Self { raster }
    }
}

impl<T: CellValue> CellSource<T> for RowReader<'_, T> {
    fn read_row(&mut self, row: usize, col_offset: usize, out: &mut [T]) -> Result<()> {
        let cells = self.raster.row(row)?;
        let end = col_offset + out.len();
        if end > cells.len() {
            return Err(Error::IndexOutOfBounds {
                row,
                col: end.saturating_sub(1),
                rows: self.raster.rows(),
                cols: self.raster.cols(),
            });
        }

        for (dst, &value) in out.iter_mut().zip(cells.iter().skip(col_offset)) {
            *dst = if self.raster.is_null(value) { T::null() } else { value };
        }
        Ok(())
    }
}
