//! Native GeoTIFF reading
//!
//! Uses the `tiff` crate. The cell category follows the sample format of the
//! file: integer samples become CELL, 32-bit floats FCELL and 64-bit floats
//! DCELL. Georeferencing comes from the ModelPixelScale/ModelTiepoint tags,
//! the CRS model from the GeoKey directory and no-data from the GDAL_NODATA tag.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use num_traits::NumCast;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::crs::{Crs, CrsModel};
use crate::error::{Error, Result};
use crate::raster::{AnyRaster, CellValue, GeoTransform, Raster};

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Read a single-band GeoTIFF file
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<AnyRaster> {
    let file = File::open(path.as_ref())?;
    decode_geotiff(BufReader::new(file))
}

/// Read a GeoTIFF from an in-memory buffer
pub fn read_geotiff_from_buffer(data: &[u8]) -> Result<AnyRaster> {
    decode_geotiff(Cursor::new(data))
}

fn decode_geotiff<R: Read + Seek>(reader: R) -> Result<AnyRaster> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let (rows, cols) = (height as usize, width as usize);

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let nodata = read_nodata(&mut decoder);
    let transform = read_geotransform(&mut decoder);
    let crs = read_crs(&mut decoder);

    let mut raster = match image {
        DecodingResult::F32(buf) => AnyRaster::FCell(build(buf, rows, cols, nodata)?),
        DecodingResult::F64(buf) => AnyRaster::DCell(build(buf, rows, cols, nodata)?),
        DecodingResult::U8(buf) => AnyRaster::Cell(build(cast_cells(buf), rows, cols, nodata)?),
        DecodingResult::U16(buf) => AnyRaster::Cell(build(cast_cells(buf), rows, cols, nodata)?),
        DecodingResult::U32(buf) => AnyRaster::Cell(build(cast_cells(buf), rows, cols, nodata)?),
        DecodingResult::I8(buf) => AnyRaster::Cell(build(cast_cells(buf), rows, cols, nodata)?),
        DecodingResult::I16(buf) => AnyRaster::Cell(build(cast_cells(buf), rows, cols, nodata)?),
        DecodingResult::I32(buf) => AnyRaster::Cell(build(buf, rows, cols, nodata)?),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF sample format".to_string(),
            ))
        }
    };

    match &mut raster {
        AnyRaster::Cell(r) => georeference(r, transform, crs),
        AnyRaster::FCell(r) => georeference(r, transform, crs),
        AnyRaster::DCell(r) => georeference(r, transform, crs),
    }

    Ok(raster)
}

/// Widen integer samples to CELL; values that do not fit become null
fn cast_cells<S: NumCast + Copy>(buf: Vec<S>) -> Vec<i32> {
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(i32::MIN))
        .collect()
}

fn build<T: CellValue>(data: Vec<T>, rows: usize, cols: usize, nodata: Option<f64>) -> Result<Raster<T>> {
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    let mut raster = Raster::from_vec(data, rows, cols)?;
    raster.set_nodata(nodata.and_then(num_traits::cast));
    Ok(raster)
}

fn georeference<T: CellValue>(raster: &mut Raster<T>, transform: Option<GeoTransform>, crs: Option<Crs>) {
    if let Some(transform) = transform {
        raster.set_transform(transform);
    }
    raster.set_crs(crs);
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    text.trim_matches(char::from(0)).trim().parse().ok()
}

/// GeoTransform from the pixel scale and tiepoint tags
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// CRS model and EPSG code from the GeoKey directory
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<Crs> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    if keys.len() < 4 {
        return None;
    }

    let mut model = None;
    let mut epsg = None;
    // Header is [version, revision, minor, count]; entries are
    // [key, location, count, value] with location 0 meaning an inline value.
    for entry in keys[4..].chunks_exact(4) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match key {
            GT_MODEL_TYPE_KEY => {
                model = match value {
                    1 => Some(CrsModel::Projected),
                    2 => Some(CrsModel::Geographic),
                    _ => None,
                }
            }
            GEOGRAPHIC_TYPE_KEY | PROJECTED_CS_TYPE_KEY if value != 32767 => {
                epsg = Some(<u32 as From<u16>>::from(value));
            }
            _ => {}
        }
    }

    match (epsg, model) {
        (Some(code), _) => Some(Crs::from_epsg(code)),
        (None, Some(model)) => Some(Crs::from_model(model)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::CellType;
    use approx::assert_relative_eq;
    use tiff::encoder::{colortype, TiffEncoder};

    fn encode_f32(rows: u32, cols: u32, data: &[f32], geographic: bool) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            let mut image = encoder.new_image::<colortype::Gray32Float>(cols, rows).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[0.5f64, 0.25, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 10.0, 46.0, 0.0][..])
                .unwrap();
            let keys: Vec<u16> = if geographic {
                vec![1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326]
            } else {
                vec![1, 1, 0, 1, 1024, 0, 1, 1]
            };
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, keys.as_slice())
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::GdalNodata, "-9999")
                .unwrap();
            image.write_data(data).unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_read_fcell_with_georeference() {
        let data = [1.0f32, 2.0, -9999.0, 4.0, 5.0, 6.0];
        let bytes = encode_f32(2, 3, &data, true);
        let raster = read_geotiff_from_buffer(&bytes).unwrap();

        assert_eq!(raster.cell_type(), CellType::FCell);
        assert_eq!(raster.shape(), (2, 3));
        assert_eq!(raster.null_count(), 1);

        let crs = raster.crs().unwrap();
        assert!(crs.is_geographic());
        assert_eq!(crs.epsg(), Some(4326));

        let extent = raster.extent();
        assert_relative_eq!(extent.west, 10.0, epsilon = 1e-12);
        assert_relative_eq!(extent.east, 11.5, epsilon = 1e-12);
        assert_relative_eq!(extent.north, 46.0, epsilon = 1e-12);
        assert_relative_eq!(extent.south, 45.5, epsilon = 1e-12);
    }

    #[test]
    fn test_projected_model_without_epsg() {
        let bytes = encode_f32(1, 2, &[1.0, 1.0], false);
        let raster = read_geotiff_from_buffer(&bytes).unwrap();
        assert_eq!(raster.crs().map(|c| c.model()), Some(CrsModel::Projected));
    }

    #[test]
    fn test_read_integer_samples_as_cell() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            encoder
                .write_image::<colortype::Gray16>(2, 2, &[1u16, 1, 2, 65535])
                .unwrap();
        }
        let raster = read_geotiff_from_buffer(&buf.into_inner()).unwrap();
        match raster {
            AnyRaster::Cell(r) => {
                assert_eq!(r.get(1, 1).unwrap(), 65535);
                assert!(r.crs().is_none());
            }
            other => panic!("expected CELL raster, got {:?}", other.cell_type()),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(read_geotiff_from_buffer(b"not a tiff").is_err());
    }
}
