// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Memoized intermediate results of the engine.

use kurbo::Size;

use crate::row_data::CellGeometries;
use crate::{GridBox, PerAxis, RowData};

/// What the folded row data of an axis was computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ConstraintKey {
    /// Hints were queried without a cross-axis extent.
    Unconstrained,
    /// Hints were queried with the cross axis laid out over this extent.
    Constrained(f64),
}

/// The folded row data of one axis and its total box.
#[derive(Debug, Default)]
pub(crate) struct AxisCache {
    key: Option<ConstraintKey>,
    pub(crate) row_data: RowData,
    pub(crate) total_box: GridBox,
}

impl AxisCache {
    /// Returns `true` if the row data was computed for `key` and hasn't been invalidated since.
    pub(crate) fn is_valid_for(&self, key: ConstraintKey) -> bool {
        self.key == Some(key)
    }

    pub(crate) fn store(&mut self, key: ConstraintKey, row_data: RowData, total_box: GridBox) {
        self.key = Some(key);
        self.row_data = row_data;
        self.total_box = total_box;
    }

    pub(crate) fn invalidate(&mut self) {
        self.key = None;
    }
}

/// The solved cell geometries for the last laid out container.
#[derive(Debug, Default)]
pub(crate) struct GeometryCache {
    /// The container size the geometries were computed for, `None` when invalid.
    ///
    /// Cell positions are relative to the container origin.
    pub(crate) container: Option<Size>,
    pub(crate) cells: PerAxis<CellGeometries>,
}

impl GeometryCache {
    pub(crate) fn is_valid_for(&self, container: Size) -> bool {
        self.container == Some(container)
    }

    pub(crate) fn invalidate(&mut self) {
        self.container = None;
    }
}

/// Every cache of the engine, reset together on any change of the grid.
#[derive(Debug, Default)]
pub(crate) struct EngineCache {
    pub(crate) axes: PerAxis<AxisCache>,
    pub(crate) geometries: GeometryCache,
}

impl EngineCache {
    pub(crate) fn invalidate(&mut self) {
        self.axes.horizontal.invalidate();
        self.axes.vertical.invalidate();
        self.geometries.invalidate();
    }
}
