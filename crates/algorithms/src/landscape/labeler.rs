//! Single-pass 4-connected patch labeling
//!
//! Rows are pulled one at a time from a [`CellSource`]. Only two rows of
//! cells and two rows of labels are kept: the row being labeled and the row
//! above it. When a cell turns out to join two labels, the label of the cell
//! is rewritten to the label found above in the already scanned part of the
//! current row and in the not yet visited part of the row above. Those are the
//! only places an outdated label can still be read from, so no union-find
//! structure is needed.

use padcv_core::io::{CellSource, MaskSource};
use padcv_core::{CellValue, Result, Window};
use tracing::{debug, trace};

use super::patch_table::{Label, PatchRecord, PatchTable};

/// Streaming connected-component labeler for one window.
#[derive(Debug)]
pub struct PatchLabeler<T: CellValue> {
    window: Window,
    cells: Vec<T>,
    cells_above: Vec<T>,
    labels: Vec<Label>,
    labels_above: Vec<Label>,
    mask: Vec<bool>,
    table: PatchTable<T>,
}

impl<T: CellValue> PatchLabeler<T> {
    pub fn new(window: Window) -> Self {
        let cols = window.cols;
        Self {
            window,
            cells: vec![T::null(); cols],
            cells_above: vec![T::null(); cols],
            labels: vec![0; cols],
            labels_above: vec![0; cols],
            mask: vec![true; cols],
            table: PatchTable::new(window.rows, cols),
        }
    }

    /// Label every row of the window.
    ///
    /// With a mask, one mask row is read per window row and excluded cells
    /// are handled exactly like null cells. A failed read aborts the scan.
    pub fn scan<S>(mut self, source: &mut S, mut mask: Option<&mut dyn MaskSource>) -> Result<PatchScan<T>>
    where
        S: CellSource<T> + ?Sized,
    {
        let window = self.window;
        debug!(
            x = window.x,
            y = window.y,
            rows = window.rows,
            cols = window.cols,
            cell_type = %T::CELL_TYPE,
            masked = mask.is_some(),
            "scanning window for patches"
        );

        for i in 0..window.rows {
            // The row labeled last becomes the row above; at i == 0 that is
            // the all-null buffer set up in `new`.
            std::mem::swap(&mut self.cells, &mut self.cells_above);
            source.read_row(window.y + i, window.x, &mut self.cells)?;

            if let Some(mask) = &mut mask {
                mask.next_row(&mut self.mask)?;
                for (cell, &keep) in self.cells.iter_mut().zip(&self.mask) {
                    if !keep {
                        cell.set_null();
                    }
                }
            }

            self.label_row(i)?;
        }

        debug!(
            patches = self.table.active_patches(),
            cells = self.table.total_cells(),
            highest_label = self.table.highest_label(),
            "window scanned"
        );

        Ok(PatchScan {
            window,
            table: self.table,
        })
    }

    fn label_row(&mut self, row: usize) -> Result<()> {
        std::mem::swap(&mut self.labels, &mut self.labels_above);
        self.labels.fill(0);

        let mut left = T::null();

        for j in 0..self.cells.len() {
            let cell = self.cells[j];

            if cell.is_null() {
                left = cell;
                continue;
            }

            self.table.count_cell();

            let mut connected = !left.is_null() && cell.same_class(&left);
            if connected {
                let label = self.labels[j - 1];
                self.labels[j] = label;
                self.table.extend(label);
            }

            let above = self.cells_above[j];
            if !above.is_null() && cell.same_class(&above) {
                let up = self.labels_above[j];
                let old = self.labels[j];

                if old != up {
                    if connected {
                        self.table.fuse(row, j)?;
                    }

                    self.labels[j] = up;
                    if old > 0 {
                        relabel(&mut self.labels[..j], old, up);
                        relabel(&mut self.labels_above[j + 1..], old, up);
                        self.table.merge(old, up);
                        trace!(row, col = j, from = old, into = up, "patches merged");
                    } else {
                        self.table.extend(up);
                    }
                }
                connected = true;
            }

            if !connected {
                self.labels[j] = self.table.start_patch(cell);
            }
            left = cell;
        }

        Ok(())
    }
}

fn relabel(labels: &mut [Label], from: Label, to: Label) {
    for label in labels.iter_mut().filter(|l| **l == from) {
        *label = to;
    }
}

/// Final state of a labeling pass.
#[derive(Debug, Clone)]
pub struct PatchScan<T: CellValue> {
    window: Window,
    table: PatchTable<T>,
}

impl<T: CellValue> PatchScan<T> {
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Number of distinct patches
    pub fn patch_count(&self) -> usize {
        self.table.active_patches()
    }

    /// Number of non-null, unmasked cells
    pub fn total_cells(&self) -> u64 {
        self.table.total_cells()
    }

    /// True when the window held no usable cell at all
    pub fn is_empty(&self) -> bool {
        self.patch_count() == 0
    }

    pub fn highest_label(&self) -> Label {
        self.table.highest_label()
    }

    /// Records of all patches
    pub fn patches(&self) -> impl Iterator<Item = &PatchRecord<T>> + '_ {
        self.table.active_records().map(|(_, rec)| rec)
    }

    /// Cell count of every patch, in label order
    pub fn patch_sizes(&self) -> Vec<u64> {
        self.patches().map(|rec| rec.cell_count).collect()
    }

    pub fn table(&self) -> &PatchTable<T> {
        &self.table
    }
}

/// Label the patches of `window`, reading rows from `source`
pub fn label_patches<T, S>(
    window: Window,
    source: &mut S,
    mask: Option<&mut dyn MaskSource>,
) -> Result<PatchScan<T>>
where
    T: CellValue,
    S: CellSource<T> + ?Sized,
{
    PatchLabeler::new(window).scan(source, mask)
}
