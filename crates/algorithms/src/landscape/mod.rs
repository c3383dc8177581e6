//! Landscape patch metrics
//!
//! Patch area coefficient of variation for categorical or continuous rasters:
//! - **Labeling**: single-pass 4-connected patches under exact value equality
//! - **Area statistics**: mean, standard deviation and CV of patch areas (ha)
//! - **Sampling units**: the index evaluated over a regular grid of windows

mod area;
mod labeler;
mod padcv;
mod patch_table;
mod sampling;

pub use area::{area_statistics, compute_cv, PatchAreaCv, PatchAreaStats};
pub use labeler::{label_patches, PatchLabeler, PatchScan};
pub use padcv::{
    patch_area_cv, patch_area_cv_any, patch_area_cv_streaming, PatchAreaCvAlgorithm, PatchCvParams,
};
pub use patch_table::{Label, PatchRecord, PatchTable};
pub use sampling::{
    sample_patch_cv, sample_patch_cv_any, sample_patch_cv_streaming, sample_patch_cv_with, SampleGrid,
    SampleParams, SampleResult,
};
