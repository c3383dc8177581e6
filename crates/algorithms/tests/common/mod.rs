//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use ndarray::Array2;
use padcv_core::{CellValue, Raster, Window};

pub const N: i32 = i32::MIN;

pub struct XorShift(pub u64);

impl XorShift {
    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// Grid of `classes` values with roughly `null_pct` percent nulls
pub fn random_grid(seed: u64, rows: usize, cols: usize, classes: u64, null_pct: u64) -> Raster<i32> {
    let mut rng = XorShift(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1);
    let data = (0..rows * cols)
        .map(|_| {
            if rng.next() % 100 < null_pct {
                N
            } else {
                (rng.next() % classes) as i32
            }
        })
        .collect();
    Raster::from_vec(data, rows, cols).unwrap()
}

/// Patch count, cell total and sorted patch sizes by flood fill
pub fn flood_fill<T: CellValue>(raster: &Raster<T>, window: Window, mask: Option<&Array2<bool>>) -> (usize, u64, Vec<u64>) {
    let usable = |row: usize, col: usize| -> Option<T> {
        let keep = mask.map_or(true, |m| m[[row - window.y, col - window.x]]);
        let value = raster.get(row, col).unwrap();
        (keep && !raster.is_null(value)).then_some(value)
    };

    let mut seen = Array2::from_elem((window.rows, window.cols), false);
    let mut sizes = Vec::new();

    for r in window.y..window.y + window.rows {
        for c in window.x..window.x + window.cols {
            if seen[[r - window.y, c - window.x]] {
                continue;
            }
            let Some(value) = usable(r, c) else { continue };

            let mut size = 0u64;
            let mut queue = VecDeque::from([(r, c)]);
            seen[[r - window.y, c - window.x]] = true;

            while let Some((pr, pc)) = queue.pop_front() {
                size += 1;
                let neighbors = [
                    (pr.wrapping_sub(1), pc),
                    (pr + 1, pc),
                    (pr, pc.wrapping_sub(1)),
                    (pr, pc + 1),
                ];
                for (nr, nc) in neighbors {
                    let inside = (window.y..window.y + window.rows).contains(&nr)
                        && (window.x..window.x + window.cols).contains(&nc);
                    if !inside || seen[[nr - window.y, nc - window.x]] {
                        continue;
                    }
                    if usable(nr, nc).is_some_and(|v| v.same_class(&value)) {
                        seen[[nr - window.y, nc - window.x]] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }
            sizes.push(size);
        }
    }

    sizes.sort_unstable();
    let total = sizes.iter().sum();
    (sizes.len(), total, sizes)
}
