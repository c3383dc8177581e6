//! padcv CLI - coefficient of variation of patch area

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use padcv_algorithms::landscape::{
    patch_area_cv_any, patch_area_cv_streaming, sample_patch_cv_streaming, sample_patch_cv_with,
    PatchAreaCv, PatchCvParams, SampleGrid, SampleParams, SampleResult,
};
use padcv_core::io::{read_geotiff, CellSource, Endianness, Mask, MaskReader, MaskSource, RawRowReader};
use padcv_core::{AnyRaster, CellType, CellValue, Crs, DistanceModel, Extent, Spheroid, Window};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "padcv")]
#[command(author, version, about = "Coefficient of variation of patch area", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster (GeoTIFF, or flat binary with --cell-type/--shape/--extent)
        input: PathBuf,
        #[command(flatten)]
        raw: RawArgs,
    },
    /// Patch area CV of one window
    Cv {
        /// Input raster (GeoTIFF, or flat binary with --cell-type/--shape/--extent)
        input: PathBuf,
        /// Window as x,y,rows,cols (default: whole raster)
        #[arg(short, long, value_parser = parse_window)]
        window: Option<Window>,
        /// Mask: a GeoTIFF covering the raster, or an r.li mask file covering the window
        #[arg(short, long)]
        mask: Option<PathBuf>,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        raw: RawArgs,
    },
    /// Patch area CV of every sampling unit
    Sample {
        /// Input raster (GeoTIFF, or flat binary with --cell-type/--shape/--extent)
        input: PathBuf,
        /// Sampling unit size as rows,cols
        #[arg(short, long, value_parser = parse_pair, default_value = "10,10")]
        unit: (usize, usize),
        /// Mask GeoTIFF covering the raster
        #[arg(short, long)]
        mask: Option<PathBuf>,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        raw: RawArgs,
    },
}

/// How cell areas are measured
#[derive(Args)]
struct AreaArgs {
    /// Geodesic distances on WGS84 (coordinates in degrees)
    #[arg(long, conflicts_with = "meters_per_unit")]
    geodesic: bool,
    /// Planimetric distances, map units scaled to metres by this factor
    #[arg(long)]
    meters_per_unit: Option<f64>,
}

/// Layout of flat binary inputs
#[derive(Args)]
struct RawArgs {
    /// Cell category of a binary input
    #[arg(long, value_enum)]
    cell_type: Option<CellTypeArg>,
    /// Shape of a binary input as rows,cols
    #[arg(long, value_parser = parse_pair)]
    shape: Option<(usize, usize)>,
    /// Bounds of a binary input as north,south,east,west
    #[arg(long, value_parser = parse_extent, allow_hyphen_values = true)]
    extent: Option<[f64; 4]>,
    /// Cells of a binary input are big-endian
    #[arg(long)]
    big_endian: bool,
    /// No-data value of a binary input
    #[arg(long, allow_hyphen_values = true)]
    nodata: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CellTypeArg {
    Cell,
    Fcell,
    Dcell,
}

impl From<CellTypeArg> for CellType {
    fn from(arg: CellTypeArg) -> Self {
        match arg {
            CellTypeArg::Cell => CellType::Cell,
            CellTypeArg::Fcell => CellType::FCell,
            CellTypeArg::Dcell => CellType::DCell,
        }
    }
}

// ─── Inputs ─────────────────────────────────────────────────────────────

/// A flat binary raster, read row by row
struct RawInput {
    path: PathBuf,
    cell_type: CellType,
    extent: Extent,
    endianness: Endianness,
    nodata: Option<f64>,
}

impl RawInput {
    fn open<T: CellValue>(&self) -> Result<RawRowReader<BufReader<File>, T>> {
        let reader = RawRowReader::open(&self.path, self.extent.rows, self.extent.cols, self.endianness)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        Ok(reader.with_nodata(self.nodata.and_then(num_traits::cast)))
    }
}

enum Input {
    Raster(AnyRaster),
    Raw(RawInput),
}

impl Input {
    fn extent(&self) -> Extent {
        match self {
            Input::Raster(raster) => raster.extent(),
            Input::Raw(raw) => raw.extent,
        }
    }

    fn crs(&self) -> Option<&Crs> {
        match self {
            Input::Raster(raster) => raster.crs(),
            Input::Raw(_) => None,
        }
    }
}

fn is_geotiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

fn open_input(path: &Path, raw: &RawArgs) -> Result<Input> {
    if is_geotiff(path) {
        let pb = spinner("Reading raster...");
        let raster = read_geotiff(path).context("Failed to read raster")?;
        pb.finish_and_clear();
        let (rows, cols) = raster.shape();
        info!("Input: {} x {} {}", cols, rows, raster.cell_type());
        return Ok(Input::Raster(raster));
    }

    let (Some(cell_type), Some((rows, cols)), Some([n, s, e, w])) =
        (raw.cell_type, raw.shape, raw.extent)
    else {
        bail!(
            "{} is not a GeoTIFF; binary inputs need --cell-type, --shape and --extent",
            path.display()
        );
    };

    let endianness = if raw.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };
    info!("Input: {} x {} {} (binary, {:?})", cols, rows, CellType::from(cell_type), endianness);

    Ok(Input::Raw(RawInput {
        path: path.to_path_buf(),
        cell_type: cell_type.into(),
        extent: Extent::new(n, s, e, w, rows, cols),
        endianness,
        nodata: raw.nodata,
    }))
}

fn read_raster_mask(path: &Path) -> Result<Mask> {
    let raster = read_geotiff(path).with_context(|| format!("Failed to read mask {}", path.display()))?;
    let mask = match &raster {
        AnyRaster::Cell(r) => Mask::from_raster(r),
        AnyRaster::FCell(r) => Mask::from_raster(r),
        AnyRaster::DCell(r) => Mask::from_raster(r),
    };
    debug!("Mask {}: {} cells included", path.display(), mask.included());
    Ok(mask)
}

/// Cut the window out of a mask raster covering the whole input
fn window_of(mask: &Mask, window: &Window, extent: &Extent) -> Result<Mask> {
    if mask.shape() != (extent.rows, extent.cols) {
        bail!(
            "Mask is {:?} cells, the input raster is ({}, {})",
            mask.shape(),
            extent.rows,
            extent.cols
        );
    }
    Ok(mask.window(window)?)
}

fn distance_model(area: &AreaArgs, crs: Option<&Crs>) -> DistanceModel {
    if area.geodesic {
        DistanceModel::Geodesic(Spheroid::default())
    } else if let Some(meters_per_unit) = area.meters_per_unit {
        DistanceModel::Planimetric { meters_per_unit }
    } else {
        DistanceModel::for_crs(crs)
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn cmd_info(input: &Input) -> Result<()> {
    let extent = input.extent();
    println!("Dimensions: {} x {} ({} cells)", extent.cols, extent.rows, extent.rows * extent.cols);
    println!(
        "Bounds: n={:.6} s={:.6} e={:.6} w={:.6}",
        extent.north, extent.south, extent.east, extent.west
    );

    match input {
        Input::Raster(raster) => {
            println!("Cell type: {}", raster.cell_type());
            match raster.crs() {
                Some(crs) => println!("CRS: {} ({:?})", crs, crs.model()),
                None => println!("CRS: unknown"),
            }
            if let Some(nodata) = raster.nodata_label() {
                println!("NoData: {}", nodata);
            }
            println!("Null cells: {}", raster.null_count());
        }
        Input::Raw(raw) => {
            println!("Cell type: {}", raw.cell_type);
            println!("Byte order: {:?}", raw.endianness);
            if let Some(nodata) = raw.nodata {
                println!("NoData: {}", nodata);
            }
            let nulls = match raw.cell_type {
                CellType::Cell => count_nulls(&mut raw.open::<i32>()?, &extent)?,
                CellType::FCell => count_nulls(&mut raw.open::<f32>()?, &extent)?,
                CellType::DCell => count_nulls(&mut raw.open::<f64>()?, &extent)?,
            };
            println!("Null cells: {}", nulls);
        }
    }
    Ok(())
}

fn count_nulls<T: CellValue, S: CellSource<T>>(source: &mut S, extent: &Extent) -> Result<usize> {
    let mut row = vec![T::null(); extent.cols];
    let mut nulls = 0;
    for r in 0..extent.rows {
        source.read_row(r, 0, &mut row)?;
        nulls += row.iter().filter(|v| v.is_null()).count();
    }
    Ok(nulls)
}

fn cmd_cv(
    input: &Input,
    window: Option<Window>,
    mask: Option<&Path>,
    area: &AreaArgs,
) -> Result<PatchAreaCv> {
    let extent = input.extent();
    let distance = distance_model(area, input.crs());
    let window = window.unwrap_or_else(|| Window::full(extent.rows, extent.cols));
    debug!("Window {:?}, distance {:?}", window, distance);

    match input {
        Input::Raster(raster) => match mask {
            Some(path) if !is_geotiff(path) => {
                let mut file_mask = open_mask_file(path)?;
                let mask: &mut dyn MaskSource = &mut file_mask;
                let result = match raster {
                    AnyRaster::Cell(r) => patch_area_cv_streaming(
                        &mut r.row_reader(),
                        window,
                        &extent,
                        Some(mask),
                        &distance,
                    ),
                    AnyRaster::FCell(r) => patch_area_cv_streaming(
                        &mut r.row_reader(),
                        window,
                        &extent,
                        Some(mask),
                        &distance,
                    ),
                    AnyRaster::DCell(r) => patch_area_cv_streaming(
                        &mut r.row_reader(),
                        window,
                        &extent,
                        Some(mask),
                        &distance,
                    ),
                };
                Ok(result?)
            }
            _ => {
                let params = PatchCvParams {
                    window: Some(window),
                    distance: Some(distance),
                    mask: mask.map(read_raster_mask).transpose()?,
                };
                Ok(patch_area_cv_any(raster, &params)?)
            }
        },
        Input::Raw(raw) => {
            let mut raster_mask;
            let mut file_mask;
            let mask: Option<&mut dyn MaskSource> = match mask {
                Some(path) if is_geotiff(path) => {
                    raster_mask = window_of(&read_raster_mask(path)?, &window, &extent)?;
                    Some(&mut raster_mask)
                }
                Some(path) => {
                    file_mask = open_mask_file(path)?;
                    Some(&mut file_mask)
                }
                None => None,
            };
            let result = match raw.cell_type {
                CellType::Cell => patch_area_cv_streaming(
                    &mut raw.open::<i32>()?,
                    window,
                    &extent,
                    mask,
                    &distance,
                ),
                CellType::FCell => patch_area_cv_streaming(
                    &mut raw.open::<f32>()?,
                    window,
                    &extent,
                    mask,
                    &distance,
                ),
                CellType::DCell => patch_area_cv_streaming(
                    &mut raw.open::<f64>()?,
                    window,
                    &extent,
                    mask,
                    &distance,
                ),
            };
            Ok(result?)
        }
    }
}

fn open_mask_file(path: &Path) -> Result<MaskReader<BufReader<File>>> {
    MaskReader::open(path).with_context(|| format!("Failed to open mask {}", path.display()))
}

fn cmd_sample(
    input: &Input,
    unit: (usize, usize),
    mask: Option<&Path>,
    area: &AreaArgs,
) -> Result<Vec<SampleResult>> {
    let grid = SampleGrid::new(unit.0, unit.1);
    let distance = distance_model(area, input.crs());
    let mask = match mask {
        Some(path) if is_geotiff(path) => Some(read_raster_mask(path)?),
        Some(path) => bail!(
            "{}: sampling units need a GeoTIFF mask covering the raster",
            path.display()
        ),
        None => None,
    };

    let pb = spinner("Evaluating sampling units...");
    let progress = |done: usize, total: usize| {
        pb.set_message(format!("Evaluating sampling units... {}/{}", done, total))
    };

    let results = match input {
        Input::Raster(raster) => {
            let params = SampleParams {
                grid,
                distance: Some(distance),
                mask,
            };
            match raster {
                AnyRaster::Cell(r) => sample_patch_cv_with(r, &params, progress),
                AnyRaster::FCell(r) => sample_patch_cv_with(r, &params, progress),
                AnyRaster::DCell(r) => sample_patch_cv_with(r, &params, progress),
            }
        }
        Input::Raw(raw) => {
            let extent = raw.extent;
            let mask = mask.as_ref();
            match raw.cell_type {
                CellType::Cell => sample_patch_cv_streaming(
                    &mut raw.open::<i32>()?,
                    &extent,
                    grid,
                    mask,
                    &distance,
                    progress,
                ),
                CellType::FCell => sample_patch_cv_streaming(
                    &mut raw.open::<f32>()?,
                    &extent,
                    grid,
                    mask,
                    &distance,
                    progress,
                ),
                CellType::DCell => sample_patch_cv_streaming(
                    &mut raw.open::<f64>()?,
                    &extent,
                    grid,
                    mask,
                    &distance,
                    progress,
                ),
            }
        }
    };
    pb.finish_and_clear();

    Ok(results?)
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set default subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn format_cv(cv: &PatchAreaCv) -> String {
    match cv.cv() {
        Some(value) => format!("{:.6}", value),
        None => "NULL".to_string(),
    }
}

fn parse_numbers<T: std::str::FromStr>(s: &str, expected: usize, what: &str) -> Result<Vec<T>, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("{} must be {} comma-separated numbers, got: {}", what, expected, s))?;
    if values.len() != expected {
        return Err(format!("{} must be {} comma-separated numbers, got: {}", what, expected, s));
    }
    Ok(values)
}

fn parse_window(s: &str) -> Result<Window, String> {
    let v = parse_numbers::<usize>(s, 4, "Window")?;
    Ok(Window::new(v[0], v[1], v[2], v[3]))
}

fn parse_pair(s: &str) -> Result<(usize, usize), String> {
    let v = parse_numbers::<usize>(s, 2, "Size")?;
    Ok((v[0], v[1]))
}

fn parse_extent(s: &str) -> Result<[f64; 4], String> {
    let v = parse_numbers::<f64>(s, 4, "Extent")?;
    Ok([v[0], v[1], v[2], v[3]])
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input, raw } => {
            println!("File: {}", input.display());
            let input = open_input(&input, &raw)?;
            cmd_info(&input)?;
        }

        Commands::Cv {
            input,
            window,
            mask,
            area,
            raw,
        } => {
            let input = open_input(&input, &raw)?;
            let start = Instant::now();
            let result = cmd_cv(&input, window, mask.as_deref(), &area)
                .context("Failed to compute patch area CV")?;
            if let Some(stats) = result.stats() {
                info!(
                    "{} patches, {} cells, cell size {:.4} m2, mean {:.6} ha, std dev {:.6} ha",
                    stats.patch_count, stats.total_cells, stats.cell_area_m2, stats.mean_ha, stats.std_dev_ha
                );
            } else {
                info!("No patches in window");
            }
            info!("Processing time: {:.2?}", start.elapsed());
            println!("{}", format_cv(&result));
        }

        Commands::Sample {
            input,
            unit,
            mask,
            area,
            raw,
        } => {
            let input = open_input(&input, &raw)?;
            let start = Instant::now();
            let results = cmd_sample(&input, unit, mask.as_deref(), &area)
                .context("Failed to evaluate sampling units")?;
            info!("{} sampling units in {:.2?}", results.len(), start.elapsed());

            println!("x\ty\trows\tcols\tcv");
            for unit in &results {
                let w = unit.window;
                println!("{}\t{}\t{}\t{}\t{}", w.x, w.y, w.rows, w.cols, format_cv(&unit.cv));
            }
        }
    }

    Ok(())
}
