//! Per-patch statistics, indexed by patch label

use padcv_core::{CellValue, Error, Result};

/// Patch identifier. 0 marks a null or masked cell.
pub type Label = usize;

/// Largest growth block of the table
const MAX_INCREMENT: usize = 1024;

/// Size and defining value of one patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchRecord<T> {
    pub cell_count: u64,
    pub value: T,
}

impl<T: CellValue> PatchRecord<T> {
    fn empty() -> Self {
        Self {
            cell_count: 0,
            value: T::null(),
        }
    }
}

/// Growable table of patch records plus the running scan totals.
///
/// Slot 0 is reserved. Labels are handed out in increasing order; the only
/// reuse is the retraction of the highest label when it is merged away right
/// after being allocated.
#[derive(Debug, Clone)]
pub struct PatchTable<T: CellValue> {
    records: Vec<PatchRecord<T>>,
    increment: usize,
    highest: Label,
    active: usize,
    cells: u64,
}

impl<T: CellValue> PatchTable<T> {
    /// Table for a `rows` x `cols` window.
    ///
    /// The table grows in blocks of `min(1024, rows, cols)` slots, never
    /// fewer than 2.
    pub fn new(rows: usize, cols: usize) -> Self {
        let increment = MAX_INCREMENT.min(rows).min(cols).max(2);
        Self {
            records: vec![PatchRecord::empty(); increment],
            increment,
            highest: 0,
            active: 0,
            cells: 0,
        }
    }

    /// Count one more non-null cell
    pub fn count_cell(&mut self) {
        self.cells += 1;
    }

    /// Open a new single-cell patch and return its label
    pub fn start_patch(&mut self, value: T) -> Label {
        self.active += 1;
        self.highest += 1;

        if self.highest >= self.records.len() {
            let len = self.highest + self.increment;
            self.records.resize(len, PatchRecord::empty());
        }

        self.records[self.highest] = PatchRecord {
            cell_count: 1,
            value,
        };
        self.highest
    }

    /// Add one cell to an existing patch
    pub fn extend(&mut self, label: Label) {
        self.records[label].cell_count += 1;
    }

    /// Move every cell of `old` into `new`
    pub fn merge(&mut self, old: Label, new: Label) {
        let moved = std::mem::take(&mut self.records[old].cell_count);
        self.records[new].cell_count += moved;

        if old == self.highest {
            self.highest -= 1;
        }
    }

    /// Two patches already counted separately turned out to be one.
    ///
    /// The patch count cannot reach zero this way on any valid input, since
    /// the cell being joined belongs to a surviving patch.
    pub fn fuse(&mut self, row: usize, col: usize) -> Result<()> {
        self.active = self.active.saturating_sub(1);
        if self.active == 0 {
            return Err(Error::PatchInvariant { row, col });
        }
        Ok(())
    }

    /// Number of allocated slots, including the reserved slot 0
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    pub fn active_patches(&self) -> usize {
        self.active
    }

    /// Non-null, unmasked cells seen so far
    pub fn total_cells(&self) -> u64 {
        self.cells
    }

    pub fn highest_label(&self) -> Label {
        self.highest
    }

    pub fn record(&self, label: Label) -> Option<&PatchRecord<T>> {
        self.records.get(label)
    }

    /// Labels and records of every patch that still holds cells
    pub fn active_records(&self) -> impl Iterator<Item = (Label, &PatchRecord<T>)> + '_ {
        self.records
            .iter()
            .enumerate()
            .take(self.highest + 1)
            .skip(1)
            .filter(|(_, rec)| rec.cell_count > 0)
    }
}
