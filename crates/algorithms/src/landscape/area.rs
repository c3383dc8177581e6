//! Patch area statistics
//!
//! Patch sizes are turned into hectares with the cell size of the full
//! raster region, then summarised as mean, population standard deviation
//! and coefficient of variation (in percent).

use serde::{Deserialize, Serialize};

use padcv_core::{CellValue, Error, Extent, GroundDistance, Result};

use super::labeler::PatchScan;

const M2_PER_HECTARE: f64 = 10_000.0;

/// Summary of the patch areas of one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchAreaStats {
    pub patch_count: usize,
    /// Non-null, unmasked cells
    pub total_cells: u64,
    /// Area of one cell in square metres
    pub cell_area_m2: f64,
    /// Mean patch area in hectares
    pub mean_ha: f64,
    /// Population standard deviation of patch areas in hectares
    pub std_dev_ha: f64,
    /// Coefficient of variation in percent
    pub cv: f64,
}

/// Result of the index: a CV, or no data when the window holds no patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatchAreaCv {
    NoData,
    Value(PatchAreaStats),
}

impl PatchAreaCv {
    pub fn cv(&self) -> Option<f64> {
        self.stats().map(|s| s.cv)
    }

    pub fn stats(&self) -> Option<&PatchAreaStats> {
        match self {
            PatchAreaCv::NoData => None,
            PatchAreaCv::Value(stats) => Some(stats),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, PatchAreaCv::NoData)
    }

    /// The CV as a DCELL value; no data becomes NaN
    pub fn to_scalar(&self) -> f64 {
        self.cv().unwrap_or(f64::NAN)
    }
}

/// Compute the CV of patch areas.
///
/// `cell_area` yields the size of one cell in square metres. It is only
/// called when there is at least one patch.
pub fn compute_cv<I, F>(total_cells: u64, patch_sizes: I, patch_count: usize, cell_area: F) -> Result<PatchAreaCv>
where
    I: IntoIterator<Item = u64>,
    F: FnOnce() -> f64,
{
    if patch_count == 0 {
        return Ok(PatchAreaCv::NoData);
    }

    let cell_area_m2 = cell_area();
    let n = patch_count as f64;

    let area = cell_area_m2 * total_cells as f64;
    let mean_ha = area / (n * M2_PER_HECTARE);

    if mean_ha == 0.0 || !mean_ha.is_finite() {
        return Err(Error::DegenerateStatistics {
            mean: mean_ha,
            patches: patch_count,
        });
    }

    let sum_sq: f64 = patch_sizes
        .into_iter()
        .map(|count| {
            let patch_ha = cell_area_m2 * count as f64 / M2_PER_HECTARE;
            (patch_ha - mean_ha).powi(2)
        })
        .sum();

    let std_dev_ha = (sum_sq / n).sqrt();
    let cv = std_dev_ha * 100.0 / mean_ha;

    Ok(PatchAreaCv::Value(PatchAreaStats {
        patch_count,
        total_cells,
        cell_area_m2,
        mean_ha,
        std_dev_ha,
        cv,
    }))
}

/// Area statistics of a finished scan; `extent` is the full raster region.
pub fn area_statistics<T, D>(scan: &PatchScan<T>, distance: &D, extent: &Extent) -> Result<PatchAreaCv>
where
    T: CellValue,
    D: GroundDistance + ?Sized,
{
    compute_cv(
        scan.total_cells(),
        scan.patches().map(|p| p.cell_count),
        scan.patch_count(),
        || distance.cell_area_m2(extent),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    #[test]
    fn test_uniform_sizes_have_zero_cv() {
        let result = compute_cv(12, [4, 4, 4], 3, || 100.0).unwrap();
        let stats = result.stats().unwrap();
        assert_eq!(stats.cv, 0.0);
        assert_relative_eq!(stats.mean_ha, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_known_cv() {
        // Sizes 1 and 3 cells of 10000 m2: mean 2 ha, std 1 ha
        let result = compute_cv(4, [1, 3], 2, || 10_000.0).unwrap();
        let stats = result.stats().unwrap();
        assert_relative_eq!(stats.mean_ha, 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev_ha, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.to_scalar(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_patches_skips_distance() {
        let calls = Cell::new(0);
        let result = compute_cv(0, std::iter::empty(), 0, || {
            calls.set(calls.get() + 1);
            1.0
        })
        .unwrap();
        assert!(result.is_no_data());
        assert!(result.to_scalar().is_nan());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_zero_cell_area_is_degenerate() {
        let result = compute_cv(5, [5], 1, || 0.0);
        assert!(matches!(result, Err(Error::DegenerateStatistics { patches: 1, .. })));

        let result = compute_cv(5, [5], 1, || f64::NAN);
        assert!(matches!(result, Err(Error::DegenerateStatistics { .. })));
    }
}
