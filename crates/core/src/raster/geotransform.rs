//! Affine georeferencing and region extents

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and map coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up rasters the rotations are 0 and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up raster)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Build the north-up transform that maps a `rows` x `cols` grid onto `extent`
    pub fn from_extent(extent: &Extent) -> Self {
        let ew_res = (extent.east - extent.west) / extent.cols.max(1) as f64;
        let ns_res = (extent.north - extent.south) / extent.rows.max(1) as f64;
        Self::new(extent.west, extent.north, ew_res, -ns_res)
    }

    /// Map coordinates of the top-left corner of a cell
    pub fn corner(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Bounding extent of a `rows` x `cols` raster under this transform
    pub fn extent(&self, rows: usize, cols: usize) -> Extent {
        let corners = [
            self.corner(0, 0),
            self.corner(cols, 0),
            self.corner(0, rows),
            self.corner(cols, rows),
        ];

        let west = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let east = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let south = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let north = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        Extent {
            north,
            south,
            east,
            west,
            rows,
            cols,
        }
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// Edges and shape of a whole raster region.
///
/// This is what the ground-distance calculation works from: the four
/// geographic bounds of the full raster, not of a window inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub rows: usize,
    pub cols: usize,
}

impl Extent {
    pub fn new(north: f64, south: f64, east: f64, west: f64, rows: usize, cols: usize) -> Self {
        Self {
            north,
            south,
            east,
            west,
            rows,
            cols,
        }
    }
}
