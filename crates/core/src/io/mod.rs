//! Row sources, masks and raster readers

mod mask;
mod native;
mod raw;
mod rows;

pub use mask::{Mask, MaskReader, MaskSource};
pub use native::{read_geotiff, read_geotiff_from_buffer};
pub use raw::{Endianness, RawRowReader};
pub use rows::{CellSource, RowReader};
