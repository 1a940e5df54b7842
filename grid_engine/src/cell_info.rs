// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use crate::{Alignment, GridBox};

/// User overrides for a single row or column.
///
/// Every field is optional: a default `CellInfo` means the row or column
/// is entirely described by the items it contains.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellInfo {
    /// Explicit stretch factor. Overrides the stretch derived from the items.
    pub stretch: Option<u32>,
    /// Explicit spacing after this row or column.
    pub spacing: Option<f64>,
    /// Explicit size hints, folded on top of the item constraints.
    ///
    /// [`GridBox::DEFAULT`] means no override.
    pub size_box: GridBox,
    /// Alignment for items that don't specify one along this axis.
    pub alignment: Alignment,
}

impl CellInfo {
    /// Returns `true` if no stretch, spacing or size hints were set.
    ///
    /// Alignment doesn't count, because it doesn't affect the distribution of space.
    pub fn is_default(&self) -> bool {
        self.stretch.is_none() && self.spacing.is_none() && self.size_box == GridBox::DEFAULT
    }
}

/// The [`CellInfo`]s of every row, or of every column.
///
/// Only cells that were touched by a setter are stored;
/// reading any other index yields a default `CellInfo`.
#[derive(Clone, Debug, Default)]
pub struct AxisInfo {
    count: usize,
    cells: Vec<CellInfo>,
}

impl AxisInfo {
    /// Creates an empty list with no rows or columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows or columns.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sets the number of rows or columns, dropping overrides past the new end.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.cells.truncate(count);
    }

    /// Returns the overrides of the cell at `index`.
    pub fn cell(&self, index: usize) -> CellInfo {
        self.cells.get(index).copied().unwrap_or_default()
    }

    /// Returns the overrides of the cell at `index` for modification.
    ///
    /// This doesn't change [`count`](Self::count): the caller is responsible
    /// for growing the grid when writing past the end.
    pub fn cell_mut(&mut self, index: usize) -> &mut CellInfo {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, CellInfo::default());
        }
        &mut self.cells[index]
    }

    /// Inserts `delta` default cells before `index` when `delta` is positive,
    /// or removes `-delta` cells starting at `index` when it is negative.
    ///
    /// Cells after the affected range keep their overrides and shift accordingly.
    pub fn insert_or_remove(&mut self, index: usize, delta: isize) {
        let index = index.min(self.count);
        if delta >= 0 {
            let delta = delta.unsigned_abs();
            if index < self.cells.len() {
                let tail = self.cells.split_off(index);
                self.cells
                    .extend(core::iter::repeat_n(CellInfo::default(), delta));
                self.cells.extend(tail);
            }
            self.count += delta;
        } else {
            let removed = delta.unsigned_abs().min(self.count - index);
            let stored_end = (index + removed).min(self.cells.len());
            if index < stored_end {
                self.cells.drain(index..stored_end);
            }
            self.count -= removed;
        }
    }

    /// Iterates over the overrides of every row or column.
    pub fn iter(&self) -> impl Iterator<Item = CellInfo> + '_ {
        (0..self.count).map(|index| self.cell(index))
    }
}
