//! Evaluation over sampling units
//!
//! The raster is tiled into contiguous, non-overlapping units of a fixed
//! size, scanned from the upper-left corner. Units cut by the right or bottom
//! edge keep their partial size. Each unit is evaluated on its own.

use serde::{Deserialize, Serialize};
use tracing::debug;

use padcv_core::io::{CellSource, Mask, MaskSource};
use padcv_core::raster::{AnyRaster, CellValue, Raster};
use padcv_core::{DistanceModel, Error, Extent, GroundDistance, Result, Window};

use super::area::{area_statistics, PatchAreaCv};
use super::labeler::label_patches;
use super::padcv::window_mask;

/// Size of the sampling units in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleGrid {
    pub unit_rows: usize,
    pub unit_cols: usize,
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self {
            unit_rows: 10,
            unit_cols: 10,
        }
    }
}

impl SampleGrid {
    pub fn new(unit_rows: usize, unit_cols: usize) -> Self {
        Self { unit_rows, unit_cols }
    }

    /// Units tiling a `rows` x `cols` raster, row by row
    pub fn windows(&self, rows: usize, cols: usize) -> Result<Vec<Window>> {
        if self.unit_rows == 0 || self.unit_cols == 0 {
            return Err(Error::InvalidParameter {
                name: "unit",
                value: format!("{},{}", self.unit_rows, self.unit_cols),
                reason: "sampling units need at least one row and one column".into(),
            });
        }

        let mut windows = Vec::with_capacity(rows.div_ceil(self.unit_rows) * cols.div_ceil(self.unit_cols));
        for y in (0..rows).step_by(self.unit_rows) {
            for x in (0..cols).step_by(self.unit_cols) {
                let unit_rows = self.unit_rows.min(rows - y);
                let unit_cols = self.unit_cols.min(cols - x);
                windows.push(Window::new(x, y, unit_rows, unit_cols));
            }
        }
        Ok(windows)
    }
}

/// Parameters for sampling-unit evaluation
#[derive(Debug, Clone, Default)]
pub struct SampleParams {
    pub grid: SampleGrid,
    /// How cell areas are measured (default: chosen from the raster CRS)
    pub distance: Option<DistanceModel>,
    /// Inclusion mask covering the whole raster
    pub mask: Option<Mask>,
}

/// CV of one sampling unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    pub window: Window,
    pub cv: PatchAreaCv,
}

/// Evaluate every sampling unit of `raster`
pub fn sample_patch_cv<T: CellValue>(raster: &Raster<T>, params: &SampleParams) -> Result<Vec<SampleResult>> {
    sample_patch_cv_with(raster, params, |_, _| {})
}

/// [`sample_patch_cv`] calling `progress(done, total)` after each unit
pub fn sample_patch_cv_with<T, F>(raster: &Raster<T>, params: &SampleParams, progress: F) -> Result<Vec<SampleResult>>
where
    T: CellValue,
    F: FnMut(usize, usize),
{
    let distance = params
        .distance
        .unwrap_or_else(|| DistanceModel::for_crs(raster.crs()));

    sample_patch_cv_streaming(
        &mut raster.row_reader(),
        &raster.extent(),
        params.grid,
        params.mask.as_ref(),
        &distance,
        progress,
    )
}

/// [`sample_patch_cv`] for a raster of any cell category
pub fn sample_patch_cv_any(raster: &AnyRaster, params: &SampleParams) -> Result<Vec<SampleResult>> {
    match raster {
        AnyRaster::Cell(r) => sample_patch_cv(r, params),
        AnyRaster::FCell(r) => sample_patch_cv(r, params),
        AnyRaster::DCell(r) => sample_patch_cv(r, params),
    }
}

/// Evaluate every sampling unit with rows pulled from `source`.
///
/// `extent` describes the full raster and `mask`, when given, must cover it.
pub fn sample_patch_cv_streaming<T, S, F>(
    source: &mut S,
    extent: &Extent,
    grid: SampleGrid,
    mask: Option<&Mask>,
    distance: &dyn GroundDistance,
    mut progress: F,
) -> Result<Vec<SampleResult>>
where
    T: CellValue,
    S: CellSource<T> + ?Sized,
    F: FnMut(usize, usize),
{
    let (rows, cols) = (extent.rows, extent.cols);
    let windows = grid.windows(rows, cols)?;
    let total = windows.len();

    debug!(
        units = total,
        unit_rows = grid.unit_rows,
        unit_cols = grid.unit_cols,
        rows,
        cols,
        "evaluating sampling units"
    );

    let mut results = Vec::with_capacity(total);
    for (done, window) in windows.into_iter().enumerate() {
        let mut unit_mask = match mask {
            Some(mask) => Some(window_mask(mask, &window, rows, cols)?),
            None => None,
        };

        let scan = label_patches(
            window,
            &mut *source,
            unit_mask.as_mut().map(|m| m as &mut dyn MaskSource),
        )?;
        let cv = area_statistics(&scan, distance, extent)?;

        debug!(x = window.x, y = window.y, cv = cv.to_scalar(), "unit evaluated");
        results.push(SampleResult { window, cv });
        progress(done + 1, total);
    }

    Ok(results)
}
