//! Inclusion masks read in lock-step with cell rows

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use byteorder::{ByteOrder, NativeEndian};
use ndarray::{s, Array2};

use crate::error::{Error, Result};
use crate::raster::{CellValue, Raster, Window};

/// Supplies one inclusion row per window row, strictly in row order.
///
/// `true` keeps a cell, `false` excludes it from the analysis.
pub trait MaskSource {
    fn next_row(&mut self, out: &mut [bool]) -> Result<()>;
}

impl<M: MaskSource + ?Sized> MaskSource for &mut M {
    fn next_row(&mut self, out: &mut [bool]) -> Result<()> {
        (**self).next_row(out)
    }
}

/// Reader for r.li mask files.
///
/// The file holds one native-endian `i32` per window column for each window
/// row; non-zero means included. Any read failure, including a short file,
/// is reported as [`Error::MaskRead`].
#[derive(Debug)]
pub struct MaskReader<R> {
    reader: R,
    row: usize,
    buf: Vec<u8>,
}

impl MaskReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> MaskReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            row: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: Read> MaskSource for MaskReader<R> {
    fn next_row(&mut self, out: &mut [bool]) -> Result<()> {
        self.buf.resize(out.len() * 4, 0);
        self.reader
            .read_exact(&mut self.buf)
            .map_err(|source| Error::MaskRead { row: self.row, source })?;

        for (flag, chunk) in out.iter_mut().zip(self.buf.chunks_exact(4)) {
            *flag = NativeEndian::read_i32(chunk) != 0;
        }
        self.row += 1;
        Ok(())
    }
}

/// In-memory inclusion grid, consumed row by row as a [`MaskSource`].
#[derive(Debug, Clone, Default)]
pub struct Mask {
    data: Array2<bool>,
    next: usize,
}

impl Mask {
    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data, next: 0 }
    }

    /// Build a mask from a raster: non-null, non-zero cells are included
    pub fn from_raster<T: CellValue>(raster: &Raster<T>) -> Self {
        let data = raster
            .data()
            .map(|&v| !raster.is_null(v) && v.to_f64().is_some_and(|f| f != 0.0));
        Self::from_array(data)
    }

    /// The part of this mask covered by `window`, rewound to its first row
    pub fn window(&self, window: &Window) -> Result<Self> {
        let (rows, cols) = self.shape();
        window.validate(rows, cols)?;
        let view = self
            .data
            .slice(s![window.y..window.y + window.rows, window.x..window.x + window.cols]);
        Ok(Self::from_array(view.to_owned()))
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of included cells
    pub fn included(&self) -> usize {
        self.data.iter().filter(|&&keep| keep).count()
    }

    /// Restart reading from the first row
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl MaskSource for Mask {
    fn next_row(&mut self, out: &mut [bool]) -> Result<()> {
        let (rows, cols) = self.shape();
        if self.next >= rows {
            return Err(Error::MaskRead {
                row: self.next,
                source: std::io::Error::new(ErrorKind::UnexpectedEof, "mask has no more rows"),
            });
        }
        if out.len() != cols {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: out.len(),
                ar: rows,
                ac: cols,
            });
        }

        for (flag, &keep) in out.iter_mut().zip(self.data.row(self.next)) {
            *flag = keep;
        }
        self.next += 1;
        Ok(())
    }
}
