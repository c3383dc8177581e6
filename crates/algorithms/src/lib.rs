//! # padcv algorithms
//!
//! Patch-based landscape indices for padcv.
//!
//! ## Available Algorithm Categories
//!
//! - **landscape**: Patch labeling, coefficient of variation of patch area,
//!   evaluation over sampling units

pub mod landscape;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::landscape::{
        label_patches, patch_area_cv, patch_area_cv_any, patch_area_cv_streaming,
        sample_patch_cv, sample_patch_cv_any, PatchAreaCv, PatchAreaCvAlgorithm, PatchAreaStats,
        PatchCvParams, PatchScan, SampleGrid, SampleParams, SampleResult,
    };
    pub use padcv_core::prelude::*;
}
