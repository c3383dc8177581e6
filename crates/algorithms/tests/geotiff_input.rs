//! GeoTIFF files carrying georeferencing and no-data, read and evaluated.

use std::fs::File;
use std::io::BufWriter;

use approx::assert_relative_eq;
use padcv_algorithms::landscape::{compute_cv, patch_area_cv_any, PatchCvParams};
use padcv_core::io::read_geotiff;
use padcv_core::{AnyRaster, DistanceModel, GroundDistance, Spheroid, Window};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

mod common;

use common::{flood_fill, random_grid, N};

const NODATA: f32 = -9999.0;

/// Write a geographic (EPSG:4326) Float32 GeoTIFF with GDAL_NODATA set
fn write_geotiff(path: &std::path::Path, rows: u32, cols: u32, data: &[f32]) {
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path).unwrap())).unwrap();
    let mut image = encoder.new_image::<colortype::Gray32Float>(cols, rows).unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[0.01f64, 0.01, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 10.0, 46.0, 0.0][..])
        .unwrap();
    let keys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])
        .unwrap();
    image.encoder().write_tag(Tag::GdalNodata, "-9999").unwrap();
    image.write_data(data).unwrap();
}

#[test]
fn geotiff_cv_uses_nodata_and_geodesic_cell_size() {
    let (rows, cols) = (12usize, 15usize);
    let source = random_grid(21, rows, cols, 3, 15);
    let data: Vec<f32> = source
        .data()
        .iter()
        .map(|&v| if v == N { NODATA } else { v as f32 })
        .collect();
    let nulls = data.iter().filter(|&&v| v == NODATA).count();
    assert!(nulls > 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("landcover.tif");
    write_geotiff(&path, rows as u32, cols as u32, &data);

    let raster = read_geotiff(&path).unwrap();
    assert_eq!(raster.shape(), (rows, cols));
    assert_eq!(raster.null_count(), nulls);
    let crs = raster.crs().unwrap();
    assert!(crs.is_geographic());
    assert_eq!(crs.epsg(), Some(4326));

    let extent = raster.extent();
    assert_relative_eq!(extent.west, 10.0, epsilon = 1e-9);
    assert_relative_eq!(extent.east, 10.15, epsilon = 1e-9);
    assert_relative_eq!(extent.south, 45.88, epsilon = 1e-9);

    let AnyRaster::FCell(cells) = &raster else {
        panic!("expected FCELL raster, got {:?}", raster.cell_type());
    };
    let (count, total, sizes) = flood_fill(cells, Window::full(rows, cols), None);
    assert_eq!(total as usize, rows * cols - nulls);

    let cell_area = DistanceModel::Geodesic(Spheroid::default()).cell_area_m2(&extent);
    let expected = compute_cv(total, sizes, count, || cell_area).unwrap();
    let actual = patch_area_cv_any(&raster, &PatchCvParams::default()).unwrap();

    let (expected, actual) = (expected.stats().unwrap(), actual.stats().unwrap());
    assert_eq!(actual.patch_count, expected.patch_count);
    assert_eq!(actual.total_cells, total);
    // about 0.01 degree squared at 46N
    assert_relative_eq!(actual.cell_area_m2, cell_area, max_relative = 1e-12);
    assert_relative_eq!(actual.cell_area_m2, 860_000.0, max_relative = 0.01);
    assert_relative_eq!(actual.cv, expected.cv, max_relative = 1e-9);
}
