//! Raster data structures

mod any;
mod element;
mod geotransform;
mod grid;
mod window;

pub use any::AnyRaster;
pub use element::{CellType, CellValue};
pub use geotransform::{Extent, GeoTransform};
pub use grid::Raster;
pub use window::Window;
