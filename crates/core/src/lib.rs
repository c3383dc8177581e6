//! # padcv core
//!
//! Core types, traits and I/O for the padcv landscape index.
//!
//! This crate provides:
//! - `Raster<T>` and `AnyRaster`: in-memory grids of CELL, FCELL or DCELL cells
//! - `CellValue`: null marker and exact equality for each cell category
//! - `Window`, `GeoTransform`, `Extent`, `Crs`: addressing and georeferencing
//! - `CellSource` / `MaskSource`: row-at-a-time inputs for single-pass scans
//! - `GroundDistance`: cell areas in square metres
//! - GeoTIFF and flat binary readers

pub mod crs;
pub mod error;
pub mod geodesy;
pub mod io;
pub mod raster;

pub use crs::Crs;
pub use error::{Error, Result};
pub use geodesy::{DistanceModel, GroundDistance, Spheroid};
pub use raster::{AnyRaster, CellType, CellValue, Extent, GeoTransform, Raster, Window};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::geodesy::{DistanceModel, GroundDistance};
    pub use crate::io::{CellSource, Mask, MaskSource};
    pub use crate::raster::{AnyRaster, CellValue, Extent, GeoTransform, Raster, Window};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in padcv.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
