//! Benchmarks for patch labeling and the patch area CV

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use padcv_algorithms::landscape::{label_patches, patch_area_cv, PatchCvParams, PatchScan};
use padcv_core::{GeoTransform, Raster, Window};

/// Land-cover-like map: blocky classes with a sprinkle of nulls
fn create_class_map(size: usize) -> Raster<i32> {
    let mut map = Raster::new(size, size);
    map.set_transform(GeoTransform::new(0.0, size as f64 * 30.0, 30.0, -30.0));
    for row in 0..size {
        for col in 0..size {
            let value = if (row * 31 + col * 17) % 97 == 0 {
                i32::MIN
            } else {
                ((row / 5 + col / 7 + (row * col) % 3) % 6) as i32
            };
            map.set(row, col, value).unwrap();
        }
    }
    map
}

fn bench_label_patches(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape/label_patches");
    for size in [128, 256, 512, 1024] {
        let map = create_class_map(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let scan: PatchScan<i32> =
                    label_patches(Window::full(size, size), &mut black_box(&map).row_reader(), None).unwrap();
                scan.patch_count()
            })
        });
    }
    group.finish();
}

fn bench_patch_area_cv(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape/patch_area_cv");
    for size in [256, 1024] {
        let map = create_class_map(size);
        let params = PatchCvParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| patch_area_cv(black_box(&map), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_label_patches, bench_patch_area_cv);
criterion_main!(benches);
