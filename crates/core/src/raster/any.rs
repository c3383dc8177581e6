//! Raster of a category chosen at run time

use crate::crs::Crs;
use crate::raster::{CellType, Extent, GeoTransform, Raster};

/// A raster whose cell category is only known once it has been read.
#[derive(Debug, Clone)]
pub enum AnyRaster {
    Cell(Raster<i32>),
    FCell(Raster<f32>),
    DCell(Raster<f64>),
}

macro_rules! dispatch {
    ($self:expr, $r:ident => $body:expr) => {
        match $self {
            AnyRaster::Cell($r) => $body,
            AnyRaster::FCell($r) => $body,
            AnyRaster::DCell($r) => $body,
        }
    };
}

impl AnyRaster {
    pub fn cell_type(&self) -> CellType {
        match self {
            AnyRaster::Cell(_) => CellType::Cell,
            AnyRaster::FCell(_) => CellType::FCell,
            AnyRaster::DCell(_) => CellType::DCell,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        dispatch!(self, r => r.shape())
    }

    pub fn extent(&self) -> Extent {
        dispatch!(self, r => r.extent())
    }

    pub fn transform(&self) -> &GeoTransform {
        dispatch!(self, r => r.transform())
    }

    pub fn crs(&self) -> Option<&Crs> {
        dispatch!(self, r => r.crs())
    }

    pub fn null_count(&self) -> usize {
        dispatch!(self, r => r.null_count())
    }

    /// No-data value formatted for display
    pub fn nodata_label(&self) -> Option<String> {
        dispatch!(self, r => r.nodata().map(|v| format!("{:?}", v)))
    }
}

impl From<Raster<i32>> for AnyRaster {
    fn from(r: Raster<i32>) -> Self {
        AnyRaster::Cell(r)
    }
}

impl From<Raster<f32>> for AnyRaster {
    fn from(r: Raster<f32>) -> Self {
        AnyRaster::FCell(r)
    }
}

impl From<Raster<f64>> for AnyRaster {
    fn from(r: Raster<f64>) -> Self {
        AnyRaster::DCell(r)
    }
}
