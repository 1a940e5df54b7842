// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Folded constraints of every row (or column) and the space distribution algorithm.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Range;

use smallvec::{SmallVec, smallvec};

use crate::util::round_half_up;
use crate::{AxisInfo, GridBox, SizeHint};

/// Scratch buffers sized for typical grids, spilling to the heap for large ones.
type Scratch<T> = SmallVec<[T; 16]>;

/// The constraints contributed by an item that spans more than one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MultiCell {
    /// The combined box of every item with the same start and span.
    pub size_box: GridBox,
    /// The largest stretch factor of those items.
    pub stretch: i32,
}

/// The result of [`RowData::calculate_geometries`], one entry per cell of the solved range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGeometries {
    /// Offset of each cell from the start of the range.
    pub positions: Vec<f64>,
    /// Extent of each cell.
    pub sizes: Vec<f64>,
    /// Distance from the bottom of each cell to its shared baseline.
    ///
    /// Empty unless descents were requested.
    /// `None` for cells without baseline-aligned content.
    pub descents: Vec<Option<f64>>,
}

/// The folded constraints of every row, or of every column.
///
/// One box, stretch factor and spacing per cell, built from the single-cell items,
/// plus the constraints of spanning items keyed by `(start, span)`.
/// It is rebuilt from scratch whenever the engine's caches are invalidated.
#[derive(Clone, Debug, Default)]
pub struct RowData {
    boxes: Vec<GridBox>,
    stretches: Vec<i32>,
    spacings: Vec<f64>,
    ignore: Vec<bool>,
    multi_cells: BTreeMap<(usize, usize), MultiCell>,
    has_ignore_flag: bool,
}

impl RowData {
    /// Creates row data for `count` cells, see [`reset`](Self::reset).
    pub fn new(count: usize) -> Self {
        let mut data = Self::default();
        data.reset(count);
        data
    }

    /// Resets every cell to an empty box with no stretch and no spacing,
    /// and drops all spanning constraints.
    pub fn reset(&mut self, count: usize) {
        self.boxes.clear();
        self.boxes.resize(count, GridBox::DEFAULT);
        self.stretches.clear();
        self.stretches.resize(count, 0);
        self.spacings.clear();
        self.spacings.resize(count, 0.);
        self.ignore.clear();
        self.ignore.resize(count, false);
        self.multi_cells.clear();
        self.has_ignore_flag = false;
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Returns the folded box of the cell at `index`.
    pub fn cell_box(&self, index: usize) -> GridBox {
        self.boxes[index]
    }

    /// Sets the folded box of the cell at `index`.
    pub fn set_cell_box(&mut self, index: usize, size_box: GridBox) {
        self.boxes[index] = size_box;
    }

    /// Returns the stretch factor of the cell at `index`.
    pub fn stretch(&self, index: usize) -> i32 {
        self.stretches[index]
    }

    /// Sets the stretch factor of the cell at `index`.
    ///
    /// Negative values mean the cell only takes space no stretching cell wants.
    pub fn set_stretch(&mut self, index: usize, stretch: i32) {
        self.stretches[index] = stretch;
    }

    /// Returns the spacing after the cell at `index`.
    pub fn spacing(&self, index: usize) -> f64 {
        self.spacings[index]
    }

    /// Sets the spacing after the cell at `index`.
    pub fn set_spacing(&mut self, index: usize, spacing: f64) {
        self.spacings[index] = spacing;
    }

    /// Returns `true` if the cell at `index` takes no space and no spacing.
    pub fn is_ignored(&self, index: usize) -> bool {
        self.ignore[index]
    }

    /// Marks the cell at `index` as taking no space and no spacing.
    pub fn set_ignored(&mut self, index: usize, ignored: bool) {
        self.ignore[index] = ignored;
    }

    /// Records that some cell only holds items whose preferred size is ignored.
    pub fn set_has_ignore_flag(&mut self, has_ignore_flag: bool) {
        self.has_ignore_flag = has_ignore_flag;
    }

    /// Folds the constraints of an item spanning `span` cells from `start`.
    ///
    /// Items with the same start and span are combined, keeping the largest stretch factor.
    pub fn add_multi_cell(&mut self, start: usize, span: usize, size_box: &GridBox, stretch: i32) {
        match self.multi_cells.entry((start, span)) {
            Entry::Vacant(entry) => {
                entry.insert(MultiCell {
                    size_box: *size_box,
                    stretch,
                });
            }
            Entry::Occupied(mut entry) => {
                let multi_cell = entry.get_mut();
                multi_cell.size_box.combine(size_box);
                multi_cell.stretch = multi_cell.stretch.max(stretch);
            }
        }
    }

    /// Returns the spanning constraints that haven't been distributed yet.
    pub fn multi_cells(&self) -> impl Iterator<Item = ((usize, usize), &MultiCell)> + '_ {
        self.multi_cells.iter().map(|(key, cell)| (*key, cell))
    }

    /// Returns the box of the cells in `range` laid out one after another.
    ///
    /// Ignored cells contribute neither size nor spacing,
    /// and the spacing after the last cell is not included.
    pub fn total_box(&self, range: Range<usize>) -> GridBox {
        let mut result = GridBox::DEFAULT;
        if range.is_empty() {
            return result;
        }
        result.maximum = 0.;
        let mut next_spacing = 0.;
        for index in range {
            if self.ignore[index] {
                continue;
            }
            result.add(&self.boxes[index], self.stretches[index], next_spacing);
            next_spacing = self.spacings[index];
        }
        result
    }

    /// Returns the extent of the cell at `index` when every cell is at its `which` size.
    ///
    /// A cell with a stretch factor of zero never grows past its preferred size,
    /// matching what [`GridBox::add`] counts for the total maximum.
    fn stolen_size(&self, index: usize, which: SizeHint) -> f64 {
        let size_box = &self.boxes[index];
        match which {
            SizeHint::Maximum if self.stretches[index] == 0 => size_box.preferred,
            _ => size_box.get(which),
        }
    }

    /// Lays out the cells of `range` at their `which` size.
    fn steal_box(&self, range: Range<usize>, which: SizeHint, positions: &mut [f64], sizes: &mut [f64]) {
        let mut offset = 0.;
        let mut next_spacing = 0.;
        for (i, index) in range.enumerate() {
            let mut size = 0.;
            if !self.ignore[index] {
                size = self.stolen_size(index, which);
                offset += next_spacing;
                next_spacing = self.spacings[index];
            }
            positions[i] = offset;
            sizes[i] = size;
            offset += size;
        }
    }

    /// Distributes the constraints of spanning items over the cells they span.
    ///
    /// For every bound the spanning item needs more of than its cells provide,
    /// the cells are solved again with the spanning item's size as target,
    /// and the resulting sizes are folded into the cell boxes.
    /// Cells never shrink, and each one stretches at least as much as the spanning item.
    pub fn distribute_multi_cells(&mut self, info: &AxisInfo, snap: bool) {
        let multi_cells = core::mem::take(&mut self.multi_cells);
        for ((start, span), multi_cell) in multi_cells {
            let end = start + span;
            let total = self.total_box(start..end);
            let mut extras: Scratch<GridBox> = smallvec![GridBox::DEFAULT; span];

            for which in SizeHint::ALL {
                let wanted = multi_cell.size_box.get(which);
                let available = total.get(which);
                let extra = match which {
                    SizeHint::Maximum => available - wanted,
                    _ => wanted - available,
                };
                if extra > 0. {
                    let geometries =
                        self.calculate_geometries(start..end, wanted, &total, info, snap, false);
                    for (extra_box, size) in extras.iter_mut().zip(geometries.sizes) {
                        extra_box.set(which, size);
                    }
                }
            }

            for (offset, extra_box) in extras.iter().enumerate() {
                let index = start + offset;
                self.boxes[index].combine(extra_box);
                if multi_cell.stretch != 0 {
                    self.stretches[index] = self.stretches[index].max(multi_cell.stretch);
                }
            }
        }
    }

    /// Distributes `target` over the cells in `range`.
    ///
    /// `total` must be the [`total_box`](Self::total_box) of `range`.
    /// Once every cell reached its own maximum, only the maxima of `info` bound them.
    ///
    /// Below the preferred size every cell starts at its minimum and the slack is
    /// shared with a power law that favors cells which want to grow a lot only mildly.
    /// Above it every cell starts at its preferred (or maximum) size and the rest is
    /// shared by stretch factor, with cells pinned at their maximum one at a time.
    ///
    /// A `target` below the total minimum is raised to it.
    ///
    /// # Panics
    ///
    /// Panics if `range` is empty.
    pub fn calculate_geometries(
        &self,
        range: Range<usize>,
        target: f64,
        total: &GridBox,
        info: &AxisInfo,
        snap: bool,
        with_descents: bool,
    ) -> CellGeometries {
        assert!(!range.is_empty(), "cannot lay out an empty range of cells");

        let target = target.max(total.minimum);
        let n = range.len();

        let mut positions = vec![0.; n];
        let mut sizes = vec![0.; n];
        let mut new_sizes: Scratch<f64> = smallvec![0.; n];

        let sum_available;
        if target < total.preferred {
            self.steal_box(range.clone(), SizeHint::Minimum, &mut positions, &mut sizes);

            sum_available = target - total.minimum;
            if sum_available > 0. {
                let sum_desired = total.preferred - total.minimum;
                let mut factors: Scratch<f64> = smallvec![0.; n];
                let mut sum_factors = 0.;
                for (i, index) in range.clone().enumerate() {
                    if self.ignore[index] {
                        factors[i] = 0.;
                        continue;
                    }
                    let size_box = &self.boxes[index];
                    let desired = size_box.preferred - size_box.minimum;
                    factors[i] = growth_factor_below_preferred(desired, sum_available, sum_desired);
                    sum_factors += factors[i];
                }

                for i in 0..n {
                    let delta = if sum_factors > 0. {
                        sum_available * factors[i] / sum_factors
                    } else {
                        0.
                    };
                    new_sizes[i] = sizes[i] + delta;
                }
            }
        } else {
            let larger_than_maximum = target > total.maximum;
            let (which, total_size) = if larger_than_maximum {
                (SizeHint::Maximum, total.maximum)
            } else {
                (SizeHint::Preferred, total.preferred)
            };
            self.steal_box(range.clone(), which, &mut positions, &mut sizes);
            sum_available = target - total_size;

            if sum_available > 0. {
                new_sizes.copy_from_slice(&sizes);
                // Cells first grow up to their own maximum.
                let remaining = self.grow_cells(
                    range.clone(),
                    &sizes,
                    &mut new_sizes,
                    sum_available,
                    snap,
                    |index| self.boxes[index],
                );
                if larger_than_maximum && remaining > 0. {
                    // Once every cell is saturated, only the explicit row or column
                    // maxima still limit growth.
                    let saturated: Scratch<f64> = new_sizes.clone();
                    self.grow_cells(range.clone(), &saturated, &mut new_sizes, remaining, snap, |index| {
                        info.cell(index).size_box.normalized()
                    });
                }
            }
        }

        if sum_available > 0. {
            let mut offset = 0.;
            for i in 0..n {
                let delta = new_sizes[i] - sizes[i];
                positions[i] += offset;
                sizes[i] += delta;
                offset += delta;
            }
        }

        if snap {
            for i in 0..n {
                let old_position = positions[i];
                positions[i] = round_half_up(old_position);
                let delta = positions[i] - old_position;
                sizes[i] -= delta;
                if i > 0 {
                    sizes[i - 1] += delta;
                }
            }

            sizes[n - 1] = target - positions[n - 1];
            // Drop the epsilons left by the loop above, and make sure it didn't
            // push any cell below its minimum.
            for (i, index) in range.clone().enumerate() {
                sizes[i] = round_half_up(sizes[i]);
                if !self.ignore[index] {
                    sizes[i] = sizes[i].max(self.boxes[index].minimum);
                }
            }
        }

        let mut descents = Vec::new();
        if with_descents {
            descents = range
                .enumerate()
                .map(|(i, index)| {
                    if self.ignore[index] {
                        return None;
                    }
                    let size_box = &self.boxes[index];
                    size_box
                        .baseline
                        .map(|baseline| baseline.descent + (sizes[i] - size_box.minimum) / 2.)
                })
                .collect();
        }

        CellGeometries {
            positions,
            sizes,
            descents,
        }
    }

    /// Shares `available` over the cells of `range` by stretch factor, starting from `sizes`.
    ///
    /// No cell grows past the maximum of its `limit_box`: cells reaching it are pinned
    /// one at a time and the others share what is left. When no stretch factor asks
    /// for the rest, it is shared equally.
    ///
    /// Writes the grown sizes of the cells to `new_sizes` and
    /// returns the space that no cell could take.
    fn grow_cells(
        &self,
        range: Range<usize>,
        sizes: &[f64],
        new_sizes: &mut [f64],
        available: f64,
        snap: bool,
        limit_box: impl Fn(usize) -> GridBox,
    ) -> f64 {
        let n = range.len();
        let sum_sizes: f64 = sizes.iter().sum();
        let sum_stretches: i32 = range
            .clone()
            .filter(|&index| !self.ignore[index])
            .map(|index| self.stretches[index])
            .filter(|&stretch| stretch > 0)
            .sum();

        // Cells that still take part in the distribution.
        let mut pending: Scratch<bool> = smallvec![false; n];
        // Largest size each pending cell may reach.
        let mut limits: Scratch<f64> = smallvec![0.; n];
        let mut factors: Scratch<f64> = smallvec![0.; n];

        for (i, index) in range.enumerate() {
            if self.ignore[index] {
                new_sizes[i] = 0.;
                continue;
            }

            let box_size = sizes[i];
            let limit_box = limit_box(index);
            if limit_box.maximum - box_size <= 0. {
                continue;
            }

            factors[i] = self.stretch_factor(
                self.stretches[index],
                sum_stretches,
                sum_sizes,
                box_size,
                available,
            );
            pending[i] = true;
            limits[i] = if snap {
                limit_box.minimum.max(limit_box.maximum.floor())
            } else {
                limit_box.maximum
            };
        }

        let mut remaining = available;
        clamp_to_maximum(sizes, &factors, &limits, &mut pending, new_sizes, &mut remaining);

        let sum_factors: f64 = (0..n).filter(|&i| pending[i]).map(|i| factors[i]).sum();
        if sum_factors <= 0. && remaining > 0. {
            // No stretch factor asks for the rest: share it equally.
            for i in (0..n).filter(|&i| pending[i]) {
                factors[i] = 1.;
            }
            clamp_to_maximum(sizes, &factors, &limits, &mut pending, new_sizes, &mut remaining);
        }

        let sum_factors: f64 = (0..n).filter(|&i| pending[i]).map(|i| factors[i]).sum();
        if sum_factors <= 0. {
            return remaining;
        }
        for i in (0..n).filter(|&i| pending[i]) {
            new_sizes[i] = sizes[i] + remaining * factors[i] / sum_factors;
        }
        0.
    }

    /// Returns the share factor of a cell when distributing space above its preferred size.
    ///
    /// Stretching cells aim for an "ultimate" size proportional to their stretch,
    /// and blend into it while `available` grows, so that small containers
    /// don't jump straight to the stretch ratio.
    fn stretch_factor(
        &self,
        stretch: i32,
        sum_stretches: i32,
        sum_sizes: f64,
        box_size: f64,
        available: f64,
    ) -> f64 {
        if sum_stretches == 0 {
            return if stretch < 0 && (box_size != 0. || self.has_ignore_flag) {
                1.
            } else {
                0.
            };
        }
        if stretch == sum_stretches {
            return 1.;
        }
        if stretch <= 0 {
            return 0.;
        }

        let stretch = f64::from(stretch);
        let sum_stretches = f64::from(sum_stretches);

        let x = (stretch * sum_sizes - sum_stretches * box_size) / (sum_stretches - stretch);
        let (ultimate_size, ultimate_sum_sizes) = if x >= 0. {
            (box_size + x, sum_sizes + x)
        } else {
            (box_size, sum_stretches * box_size / stretch)
        };
        // Leave some room for a smooth transition, at the expense of
        // not fully respecting the stretch factors while it lasts.
        let ultimate_size = ultimate_size * 3. / 2.;
        let ultimate_sum_sizes = ultimate_sum_sizes * 3. / 2.;

        let beta = ultimate_sum_sizes - sum_sizes;
        if beta == 0. {
            return 1.;
        }
        let alpha = available.min(beta);
        let ultimate_factor = stretch * ultimate_sum_sizes / sum_stretches - box_size;
        let transitional_factor = available * (ultimate_size - box_size) / beta;

        (alpha * ultimate_factor + (beta - alpha) * transitional_factor) / beta
    }
}

/// Pins cells at their limit until no pending cell's share would exceed it.
///
/// Pinned cells get their final size in `new_sizes`, are no longer `pending`,
/// and what they consume is subtracted from `remaining`.
fn clamp_to_maximum(
    sizes: &[f64],
    factors: &[f64],
    limits: &[f64],
    pending: &mut [bool],
    new_sizes: &mut [f64],
    remaining: &mut f64,
) {
    let mut sum_factors: f64 = (0..sizes.len())
        .filter(|&i| pending[i])
        .map(|i| factors[i])
        .sum();

    let mut keep_going = true;
    while keep_going && sum_factors > 0. {
        keep_going = false;
        for i in 0..sizes.len() {
            if !pending[i] {
                continue;
            }
            let share = *remaining * factors[i] / sum_factors;
            if sizes[i] + share >= limits[i] {
                new_sizes[i] = limits[i];
                pending[i] = false;
                *remaining -= limits[i] - sizes[i];
                sum_factors -= factors[i];
                keep_going = *remaining > 0. && sum_factors > 0.;
                if !keep_going {
                    break;
                }
            }
        }
    }
}

/// Returns how much of the slack below the preferred size a cell gets, relative to the others.
///
/// The exponent grows with the cell's share of the desired growth, so cells that want
/// to grow a lot are held back while the slack is small and catch up as it grows.
fn growth_factor_below_preferred(desired: f64, sum_available: f64, sum_desired: f64) -> f64 {
    if sum_desired <= 0. {
        return 0.;
    }
    desired * (sum_available / sum_desired).powf(desired / sum_desired)
}
