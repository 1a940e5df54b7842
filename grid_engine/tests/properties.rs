// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Properties of the space distribution that hold for any set of cells.

use float_cmp::approx_eq;
use grid_engine::{AxisInfo, CellGeometries, GridBox, RowData};
use proptest::prelude::*;

/// A cell with whole-number bounds and spacing.
#[derive(Clone, Debug)]
struct Cell {
    size_box: GridBox,
    stretch: i32,
    spacing: f64,
    ignored: bool,
}

/// Cells with stretch factors from -1 to 2, some of them ignored.
///
/// The first cell is never ignored, so there is always a cell to take the space.
fn cells(count: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Cell>> {
    prop::collection::vec(
        (0..50_u32, 0..50_u32, 0..100_u32, -1..3_i32, 0..10_u32, prop::bool::weighted(0.2)).prop_map(
            |(min, pref, max, stretch, spacing, ignored)| {
                let minimum = f64::from(min);
                let preferred = minimum + f64::from(pref);
                let maximum = preferred + f64::from(max);
                Cell {
                    size_box: GridBox::new(minimum, preferred, maximum),
                    stretch,
                    spacing: f64::from(spacing),
                    ignored,
                }
            },
        ),
        count,
    )
    .prop_map(|mut cells| {
        cells[0].ignored = false;
        cells
    })
}

fn row_data(cells: &[Cell]) -> RowData {
    let mut data = RowData::new(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        data.set_cell_box(index, cell.size_box);
        data.set_stretch(index, cell.stretch);
        data.set_spacing(index, cell.spacing);
        data.set_ignored(index, cell.ignored);
    }
    data
}

fn solve(data: &RowData, target: f64, snap: bool) -> CellGeometries {
    let total = data.total_box(0..data.len());
    data.calculate_geometries(0..data.len(), target, &total, &AxisInfo::new(), snap, false)
}

/// Where the last cell ends.
fn end(geometries: &CellGeometries) -> f64 {
    let last = geometries.sizes.len() - 1;
    geometries.positions[last] + geometries.sizes[last]
}

/// The largest target every cell can take without passing its own maximum.
fn sum_of_maxima(cells: &[Cell], data: &RowData) -> f64 {
    // The preferred total already holds the spacings between visible cells.
    let growth: f64 = cells
        .iter()
        .filter(|cell| !cell.ignored)
        .map(|cell| cell.size_box.maximum - cell.size_box.preferred)
        .sum();
    data.total_box(0..data.len()).preferred + growth
}

proptest! {
    #[test]
    fn cells_fill_the_target(cells in cells(1..6), extra in 0.0..500.0_f64) {
        let data = row_data(&cells);
        let target = data.total_box(0..data.len()).minimum + extra;

        let geometries = solve(&data, target, false);
        let end = end(&geometries);
        prop_assert!(approx_eq!(f64, end, target, epsilon = 1e-6), "{end} != {target}");
    }

    #[test]
    fn snapped_cells_fill_the_target_exactly(cells in cells(1..6), extra in 0..500_u32) {
        let data = row_data(&cells);
        let target = data.total_box(0..data.len()).minimum + f64::from(extra);

        let geometries = solve(&data, target, true);
        prop_assert_eq!(end(&geometries), target);
        for ((position, size), cell) in geometries.positions.iter().zip(&geometries.sizes).zip(&cells) {
            prop_assert_eq!(position.fract(), 0.);
            prop_assert_eq!(size.fract(), 0.);
            if cell.ignored {
                prop_assert_eq!(*size, 0.);
            }
        }
    }

    #[test]
    fn sizes_stay_within_bounds(cells in cells(1..6), fraction in 0.0..=1.0_f64) {
        let data = row_data(&cells);
        let total = data.total_box(0..data.len());
        // Reaches past the total maximum, up to where every cell is at its own maximum.
        let target = total.minimum + (sum_of_maxima(&cells, &data) - total.minimum) * fraction;

        let geometries = solve(&data, target, false);
        for (cell, size) in cells.iter().zip(&geometries.sizes) {
            if cell.ignored {
                prop_assert_eq!(*size, 0.);
                continue;
            }
            prop_assert!(*size >= cell.size_box.minimum - 1e-6, "{size} < {}", cell.size_box.minimum);
            prop_assert!(*size <= cell.size_box.maximum + 1e-6, "{size} > {}", cell.size_box.maximum);
        }
    }

    #[test]
    fn preferred_target_gives_preferred_sizes(cells in cells(1..6)) {
        let data = row_data(&cells);
        let target = data.total_box(0..data.len()).preferred;

        let geometries = solve(&data, target, false);
        for (cell, size) in cells.iter().zip(&geometries.sizes) {
            let expected = if cell.ignored { 0. } else { cell.size_box.preferred };
            prop_assert_eq!(*size, expected);
        }
    }

    #[test]
    fn solving_is_deterministic(cells in cells(1..6), extra in 0.0..500.0_f64, snap in any::<bool>()) {
        let data = row_data(&cells);
        let target = data.total_box(0..data.len()).minimum + extra;

        prop_assert_eq!(solve(&data, target, snap), solve(&data, target, snap));
    }

    #[test]
    fn growing_below_preferred_never_shrinks_a_cell(
        cells in cells(1..6),
        first in 0.0..=1.0_f64,
        second in 0.0..=1.0_f64,
    ) {
        let data = row_data(&cells);
        let total = data.total_box(0..data.len());
        let (low, high) = if first <= second { (first, second) } else { (second, first) };
        let at = |fraction: f64| total.minimum + (total.preferred - total.minimum) * fraction;

        let smaller = solve(&data, at(low), false);
        let larger = solve(&data, at(high), false);
        for (small, large) in smaller.sizes.iter().zip(&larger.sizes) {
            prop_assert!(*large >= *small - 1e-6, "{large} < {small}");
        }
    }

    #[test]
    fn spanning_minimum_is_honored(cells in cells(2..6), span_minimum in 0..300_u32) {
        let mut data = row_data(&cells);
        let span_minimum = f64::from(span_minimum);
        let count = data.len();
        data.add_multi_cell(0, count, &GridBox::new(span_minimum, span_minimum, GridBox::UNBOUNDED), 0);
        data.distribute_multi_cells(&AxisInfo::new(), false);

        let minimum = data.total_box(0..count).minimum;
        prop_assert!(minimum >= span_minimum - 1e-6, "{minimum} < {span_minimum}");
    }
}
