//! Streaming rows from flat binary rasters
//!
//! A flat binary raster is a headerless row-major array of cells (the layout
//! of ENVI `.bil` single-band files and of uncompressed GRASS cell data).
//! Rows are fetched with a seek and a single read, so only one row is ever
//! held in memory.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use byteorder::{BigEndian, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::CellSource;
use crate::raster::CellValue;

/// Byte order of the cells in a binary file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// [`CellSource`] over a flat binary raster of `rows` x `cols` cells.
#[derive(Debug)]
pub struct RawRowReader<R, T: CellValue> {
    reader: R,
    rows: usize,
    cols: usize,
    endianness: Endianness,
    nodata: Option<T>,
    buf: Vec<u8>,
    _cell: PhantomData<T>,
}

impl<T: CellValue> RawRowReader<BufReader<File>, T> {
    /// Open a binary raster file
    pub fn open<P: AsRef<Path>>(path: P, rows: usize, cols: usize, endianness: Endianness) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let expected = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(T::CELL_TYPE.size_of()))
            .ok_or(Error::InvalidDimensions {
                width: cols,
                height: rows,
            })? as u64;
        let actual = file.metadata()?.len();
        if actual < expected {
            return Err(Error::Other(format!(
                "{} holds {} bytes, a {}x{} {} raster needs {}",
                path.as_ref().display(),
                actual,
                rows,
                cols,
                T::CELL_TYPE,
                expected
            )));
        }
        Ok(Self::new(BufReader::new(file), rows, cols, endianness))
    }
}

impl<R: Read + Seek, T: CellValue> RawRowReader<R, T> {
    pub fn new(reader: R, rows: usize, cols: usize, endianness: Endianness) -> Self {
        Self {
            reader,
            rows,
            cols,
            endianness,
            nodata: None,
            buf: Vec::new(),
            _cell: PhantomData,
        }
    }

    /// Treat `nodata` as null in addition to the null marker
    pub fn with_nodata(mut self, nodata: Option<T>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl<R: Read + Seek, T: CellValue> CellSource<T> for RawRowReader<R, T> {
    fn read_row(&mut self, row: usize, col_offset: usize, out: &mut [T]) -> Result<()> {
        let end = col_offset + out.len();
        if row >= self.rows || end > self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col: end.saturating_sub(1),
                rows: self.rows,
                cols: self.cols,
            });
        }

        let size = T::CELL_TYPE.size_of();
        let offset = row
            .checked_mul(self.cols)
            .and_then(|n| n.checked_add(col_offset))
            .and_then(|n| n.checked_mul(size))
            .ok_or(Error::InvalidDimensions {
                width: self.cols,
                height: self.rows,
            })? as u64;
        self.buf.resize(out.len() * size, 0);
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut self.buf)?;

        match self.endianness {
            Endianness::Little => T::decode_row::<LittleEndian>(&self.buf, out),
            Endianness::Big => T::decode_row::<BigEndian>(&self.buf, out),
        }

        if let Some(nd) = self.nodata {
            for v in out.iter_mut().filter(|v| v.same_class(&nd)) {
                v.set_null();
            }
        }
        Ok(())
    }
}
