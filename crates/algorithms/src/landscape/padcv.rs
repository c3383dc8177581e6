//! Coefficient of variation of patch area
//!
//! A patch is a maximal 4-connected group of non-null cells sharing exactly
//! the same value. The index is the coefficient of variation (percent) of the
//! patch areas inside a window, with areas measured in hectares.

use padcv_core::io::{CellSource, Mask, MaskSource};
use padcv_core::raster::{AnyRaster, CellValue, Raster};
use padcv_core::{Algorithm, DistanceModel, Error, Extent, GroundDistance, Result, Window};

use super::area::{area_statistics, PatchAreaCv};
use super::labeler::label_patches;

/// Parameters for the patch area CV
#[derive(Debug, Clone, Default)]
pub struct PatchCvParams {
    /// Part of the raster to analyse (default: the whole raster)
    pub window: Option<Window>,
    /// How cell areas are measured (default: chosen from the raster CRS)
    pub distance: Option<DistanceModel>,
    /// Inclusion mask covering the whole raster
    pub mask: Option<Mask>,
}

/// Patch area CV algorithm
#[derive(Debug, Clone, Default)]
pub struct PatchAreaCvAlgorithm;

impl Algorithm for PatchAreaCvAlgorithm {
    type Input = AnyRaster;
    type Output = PatchAreaCv;
    type Params = PatchCvParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "PatchAreaCv"
    }

    fn description(&self) -> &'static str {
        "Coefficient of variation of patch area (4-connected, exact value equality)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        patch_area_cv_any(&input, &params)
    }
}

/// Patch area CV of an in-memory raster
///
/// # Arguments
/// * `raster` - Categorical or continuous raster; no-data cells are null
/// * `params` - Window, distance model and mask
pub fn patch_area_cv<T: CellValue>(raster: &Raster<T>, params: &PatchCvParams) -> Result<PatchAreaCv> {
    let (rows, cols) = raster.shape();
    let window = params.window.unwrap_or_else(|| Window::full(rows, cols));
    window.validate(rows, cols)?;

    let mut mask = match &params.mask {
        Some(mask) => Some(window_mask(mask, &window, rows, cols)?),
        None => None,
    };

    let distance = params
        .distance
        .unwrap_or_else(|| DistanceModel::for_crs(raster.crs()));

    let scan = label_patches(
        window,
        &mut raster.row_reader(),
        mask.as_mut().map(|m| m as &mut dyn MaskSource),
    )?;
    area_statistics(&scan, &distance, &raster.extent())
}

/// [`patch_area_cv`] for a raster of any cell category
pub fn patch_area_cv_any(raster: &AnyRaster, params: &PatchCvParams) -> Result<PatchAreaCv> {
    match raster {
        AnyRaster::Cell(r) => patch_area_cv(r, params),
        AnyRaster::FCell(r) => patch_area_cv(r, params),
        AnyRaster::DCell(r) => patch_area_cv(r, params),
    }
}

/// Patch area CV with rows pulled from `source`.
///
/// `extent` describes the full raster the window lies in. Rows of `mask` are
/// read in step with the window rows.
pub fn patch_area_cv_streaming<T, S>(
    source: &mut S,
    window: Window,
    extent: &Extent,
    mask: Option<&mut dyn MaskSource>,
    distance: &dyn GroundDistance,
) -> Result<PatchAreaCv>
where
    T: CellValue,
    S: CellSource<T> + ?Sized,
{
    window.validate(extent.rows, extent.cols)?;
    let scan = label_patches(window, source, mask)?;
    area_statistics(&scan, distance, extent)
}

/// Cut the window out of a whole-raster mask
pub(crate) fn window_mask(mask: &Mask, window: &Window, rows: usize, cols: usize) -> Result<Mask> {
    let (mask_rows, mask_cols) = mask.shape();
    if (mask_rows, mask_cols) != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: mask_rows,
            ac: mask_cols,
        });
    }
    mask.window(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use padcv_core::GeoTransform;

    /// 10 m cells: one cell is 0.01 ha
    fn raster_10m(rows: usize, cols: usize, data: Vec<i32>) -> Raster<i32> {
        let mut r = Raster::from_vec(data, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 10.0, 10.0, -10.0));
        r
    }

    #[test]
    fn test_uniform_raster() {
        let r = raster_10m(3, 3, vec![7; 9]);
        let result = patch_area_cv(&r, &PatchCvParams::default()).unwrap();
        let stats = result.stats().unwrap();
        assert_eq!(stats.patch_count, 1);
        assert_eq!(stats.cv, 0.0);
        assert_relative_eq!(stats.cell_area_m2, 100.0, epsilon = 1e-9);
        assert_relative_eq!(stats.mean_ha, 0.09, epsilon = 1e-12);
    }

    #[test]
    fn test_two_patches_of_different_size() {
        // Patches of 1 and 3 cells
        let r = raster_10m(2, 2, vec![1, 2, 2, 2]);
        let result = patch_area_cv(&r, &PatchCvParams::default()).unwrap();
        assert_relative_eq!(result.to_scalar(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_window_uses_full_extent_for_cell_size() {
        let r = raster_10m(4, 4, vec![3; 16]);
        let params = PatchCvParams {
            window: Some(Window::new(1, 1, 2, 2)),
            ..Default::default()
        };
        let stats = *patch_area_cv(&r, &params).unwrap().stats().unwrap();
        assert_eq!(stats.total_cells, 4);
        assert_relative_eq!(stats.cell_area_m2, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_window_outside_raster() {
        let r = raster_10m(2, 2, vec![1; 4]);
        let params = PatchCvParams {
            window: Some(Window::new(1, 0, 2, 2)),
            ..Default::default()
        };
        assert!(matches!(patch_area_cv(&r, &params), Err(Error::InvalidWindow { .. })));
    }

    #[test]
    fn test_mask_must_cover_raster() {
        let r = raster_10m(2, 2, vec![1; 4]);
        let params = PatchCvParams {
            mask: Some(Mask::from_array(Array2::from_elem((3, 2), true))),
            ..Default::default()
        };
        assert!(matches!(patch_area_cv(&r, &params), Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn test_fully_masked_is_no_data() {
        let r = raster_10m(2, 2, vec![1; 4]);
        let params = PatchCvParams {
            mask: Some(Mask::from_array(Array2::from_elem((2, 2), false))),
            ..Default::default()
        };
        assert!(patch_area_cv(&r, &params).unwrap().is_no_data());
    }

    #[test]
    fn test_algorithm_trait() {
        let algo = PatchAreaCvAlgorithm;
        assert_eq!(algo.name(), "PatchAreaCv");
        let input = AnyRaster::from(Raster::<f32>::filled(2, 3, 0.5));
        let result = algo.execute_default(input).unwrap();
        assert_eq!(result.cv(), Some(0.0));
    }
}
