//! Error types for padcv

use thiserror::Error;

/// Main error type for padcv operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error(
        "Invalid window: origin ({x}, {y}) extent {rows}x{cols} does not fit in raster of size ({raster_rows}, {raster_cols})"
    )]
    InvalidWindow {
        x: usize,
        y: usize,
        rows: usize,
        cols: usize,
        raster_rows: usize,
        raster_cols: usize,
    },

    #[error("Cannot read mask row {row}: {source}")]
    MaskRead {
        row: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Patch count dropped to zero while merging at row {row}, col {col}")]
    PatchInvariant { row: usize, col: usize },

    #[error("Degenerate patch statistics: mean patch area is {mean} ha with {patches} patches")]
    DegenerateStatistics { mean: f64, patches: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for padcv operations
pub type Result<T> = std::result::Result<T, Error>;
