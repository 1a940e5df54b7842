// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

#![expect(missing_docs, reason = "Bench crate")]

use divan::{Bencher, black_box};
use grid_engine::kurbo::{Axis, Rect};
use grid_engine::{AxisInfo, GridBox, GridEngine, GridParams, LayoutItem, RowData, SizeHint};

/// A cell whose size hints vary with its position, so that no two columns look alike.
struct Cell(GridBox);

impl Cell {
    fn new(index: usize) -> Self {
        let minimum = (index % 7) as f64 * 3.;
        let preferred = minimum + (index % 5) as f64 * 11.;
        Self(GridBox::new(minimum, preferred, GridBox::UNBOUNDED))
    }
}

impl LayoutItem for Cell {
    fn size_hint(&self, which: SizeHint, _axis: Axis, _constraint: Option<f64>) -> f64 {
        self.0.get(which)
    }
}

fn row_data(cells: usize) -> RowData {
    let mut data = RowData::new(cells);
    for index in 0..cells {
        data.set_cell_box(index, Cell::new(index).0);
        data.set_stretch(index, [0, 1, 2][index % 3]);
    }
    data
}

#[divan::bench(args = [4, 32, 256])]
fn distribute_below_preferred(bencher: Bencher<'_, '_>, cells: usize) {
    let data = row_data(cells);
    let total = data.total_box(0..cells);
    let target = (total.minimum + total.preferred) / 2.;
    let info = AxisInfo::new();

    bencher.bench(|| {
        data.calculate_geometries(0..cells, black_box(target), &total, &info, true, false)
    });
}

#[divan::bench(args = [4, 32, 256])]
fn distribute_above_preferred(bencher: Bencher<'_, '_>, cells: usize) {
    let data = row_data(cells);
    let total = data.total_box(0..cells);
    let target = total.preferred * 2.;
    let info = AxisInfo::new();

    bencher.bench(|| {
        data.calculate_geometries(0..cells, black_box(target), &total, &info, true, false)
    });
}

#[divan::bench(args = [4, 16, 64])]
fn full_grid(bencher: Bencher<'_, '_>, side: usize) {
    let mut grid = GridEngine::new();
    for row in 0..side {
        for column in 0..side {
            // Items on the diagonal also cover the cell to their right.
            let params = if row == column && column + 1 < side {
                GridParams::new(row, column, 1, 2)
            } else if column == row + 1 {
                continue;
            } else {
                GridParams::at(row, column)
            };
            let _ = grid.add_item(Cell::new(row * side + column), params);
        }
    }
    let contents = Rect::new(0., 0., side as f64 * 40., side as f64 * 40.);

    bencher.bench_local(|| {
        grid.invalidate();
        grid.compute_geometries(black_box(contents))
    });
}

// ---

fn main() {
    // Run registered benchmarks.
    divan::main();
}
