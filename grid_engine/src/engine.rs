// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use hashbrown::HashMap;
use kurbo::{Axis, Point, Rect, Size};
use tracing::{debug, trace, trace_span, warn};

use crate::cache::{ConstraintKey, EngineCache};
use crate::item::GridItem;
use crate::row_data::CellGeometries;
use crate::util::{Sanitize, round_half_up};
use crate::{
    Alignment, AxisInfo, CellInfo, GridBox, GridError, GridParams, ItemId, LayoutItem, PerAxis, RowData,
    SizeHint, SizePolicy, debug_panic,
};

/// Horizontal direction in which columns are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutDirection {
    /// The first column is at the left edge.
    #[default]
    LeftToRight,
    /// The first column is at the right edge.
    RightToLeft,
}

/// Which axis the size of some items depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOrientation {
    /// No item depends on the extent of the other axis.
    NoConstraint,
    /// Some items have a width that depends on their height.
    Horizontal,
    /// Some items have a height that depends on their width.
    Vertical,
    /// Items disagree on which axis depends on the other.
    ///
    /// Both axes are then solved independently.
    Unfeasible,
}

impl From<Axis> for ConstraintOrientation {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::Horizontal,
            Axis::Vertical => Self::Vertical,
        }
    }
}

/// A grid layout engine.
///
/// The engine owns a set of [`LayoutItem`]s, each placed on a rectangular block of cells,
/// and distributes the space of a container over its rows and columns.
///
/// Rows and columns are addressed through an [`Axis`]: the [`Axis::Vertical`] variants of
/// the per-cell methods act on rows, the [`Axis::Horizontal`] ones on columns.
///
/// Every query memoizes its intermediate results, which is why queries take `&mut self`.
/// Any modification invalidates all of them.
///
/// ```
/// use grid_engine::kurbo::{Axis, Rect, Size};
/// use grid_engine::{GridBox, GridEngine, GridParams, LayoutItem, SizeHint};
///
/// struct Label(f64);
///
/// impl LayoutItem for Label {
///     fn size_hint(&self, which: SizeHint, _axis: Axis, _constraint: Option<f64>) -> f64 {
///         match which {
///             SizeHint::Maximum => GridBox::UNBOUNDED,
///             _ => self.0,
///         }
///     }
/// }
///
/// let mut grid = GridEngine::new();
/// grid.add_item(Label(20.), GridParams::at(0, 0)).unwrap();
/// grid.add_item(Label(30.), GridParams::at(0, 1)).unwrap();
///
/// assert_eq!(grid.size_hint(SizeHint::Preferred, None, None), Size::new(50., 30.));
/// let geometries = grid.compute_geometries(Rect::new(0., 0., 100., 30.));
/// assert_eq!(geometries[1].1, Rect::new(45., 0., 100., 30.));
/// ```
#[derive(Debug)]
pub struct GridEngine<T> {
    items: HashMap<ItemId, GridItem<T>>,
    /// Ids in insertion order.
    order: Vec<ItemId>,
    next_id: u64,
    /// Row-major, `rows * columns` slots.
    grid: Vec<Option<ItemId>>,
    infos: PerAxis<AxisInfo>,
    default_spacing: PerAxis<f64>,
    default_alignment: Alignment,
    snap_to_pixel_grid: bool,
    direction: LayoutDirection,
    constraint_orientation: Option<ConstraintOrientation>,
    /// Whether the current disagreement between items was already logged.
    ///
    /// This survives [`invalidate`](Self::invalidate).
    reported_unfeasible: bool,
    cache: EngineCache,
}

impl<T: LayoutItem> Default for GridEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

// --- MARK: ITEMS
impl<T: LayoutItem> GridEngine<T> {
    /// Creates an engine with no rows, no columns and no items.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            grid: Vec::new(),
            infos: PerAxis::default(),
            default_spacing: PerAxis::default(),
            default_alignment: Alignment::empty(),
            snap_to_pixel_grid: true,
            direction: LayoutDirection::default(),
            constraint_orientation: None,
            reported_unfeasible: false,
            cache: EngineCache::default(),
        }
    }

    /// Places `content` on the cells described by `params`, growing the grid as needed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySpan`] if a span is zero and
    /// [`GridError::CellOccupied`] if one of the cells already holds an item.
    /// The engine is unchanged in both cases.
    pub fn add_item(&mut self, content: T, params: GridParams) -> Result<ItemId, GridError> {
        if params.row_span == 0 || params.column_span == 0 {
            debug!(?params, "rejected item with an empty span");
            return Err(GridError::EmptySpan {
                row_span: params.row_span,
                column_span: params.column_span,
            });
        }

        for row in params.row..params.row + params.row_span {
            for column in params.column..params.column + params.column_span {
                if let Some(occupant) = self.item_at(row, column) {
                    debug!(row, column, ?occupant, "rejected item on an occupied cell");
                    return Err(GridError::CellOccupied {
                        row,
                        column,
                        occupant,
                    });
                }
            }
        }

        let id = ItemId(self.next_id);
        self.next_id += 1;

        self.maybe_expand_grid(
            params.row + params.row_span,
            params.column + params.column_span,
        );
        self.place(id, &params);
        self.items.insert(id, GridItem::new(content, &params));
        self.order.push(id);
        self.invalidate();
        Ok(id)
    }

    /// Removes the item from the grid and returns its content.
    ///
    /// The grid keeps its rows and columns.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownItem`] if `id` is not part of this engine.
    pub fn remove_item(&mut self, id: ItemId) -> Result<T, GridError> {
        let item = self.items.remove(&id).ok_or(GridError::UnknownItem(id))?;
        self.order.retain(|&other| other != id);
        for slot in &mut self.grid {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        self.invalidate();
        Ok(item.content)
    }

    /// Returns the item covering the cell at `row` and `column`, if any.
    pub fn item_at(&self, row: usize, column: usize) -> Option<ItemId> {
        self.grid_index(row, column).and_then(|index| self.grid[index])
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the content of an item.
    pub fn item(&self, id: ItemId) -> Option<&T> {
        self.items.get(&id).map(|item| &item.content)
    }

    /// Returns the content of an item for modification.
    ///
    /// The content may report different hints afterwards, so this invalidates all caches.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut T> {
        let item = self.items.get_mut(&id)?;
        self.cache.invalidate();
        self.constraint_orientation = None;
        Some(&mut item.content)
    }

    /// Iterates over the items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &T)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).map(|item| (*id, &item.content)))
    }

    /// Returns the current placement of an item.
    ///
    /// This reflects row and column insertions and removals since the item was added.
    pub fn item_params(&self, id: ItemId) -> Option<GridParams> {
        self.items.get(&id).map(GridItem::params)
    }

    /// Overrides the stretch factor of an item along `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownItem`] if `id` is not part of this engine.
    pub fn set_item_stretch_factor(
        &mut self,
        id: ItemId,
        stretch: u32,
        axis: Axis,
    ) -> Result<(), GridError> {
        let item = self.items.get_mut(&id).ok_or(GridError::UnknownItem(id))?;
        item.stretch[axis] = Some(stretch);
        self.invalidate();
        Ok(())
    }

    /// Sets the alignment of an item inside its cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownItem`] if `id` is not part of this engine.
    pub fn set_item_alignment(&mut self, id: ItemId, alignment: Alignment) -> Result<(), GridError> {
        let item = self.items.get_mut(&id).ok_or(GridError::UnknownItem(id))?;
        item.alignment = alignment;
        self.invalidate();
        Ok(())
    }
}

// --- MARK: GRID
impl<T: LayoutItem> GridEngine<T> {
    /// Returns the number of rows ([`Axis::Vertical`]) or columns ([`Axis::Horizontal`]).
    pub fn row_count(&self, axis: Axis) -> usize {
        self.infos[axis].count()
    }

    /// Inserts `delta` rows or columns before `index` when `delta` is positive,
    /// or removes `-delta` of them starting at `index` when it is negative.
    ///
    /// Items after `index` move along. Items straddling `index` grow when inserting
    /// and lose the removed cells when removing. An item left without any cell
    /// collapses onto a single cell at `index`.
    pub fn insert_or_remove_rows(&mut self, index: usize, delta: isize, axis: Axis) {
        let old_count = self.row_count(axis);
        if index > old_count {
            debug_panic!("cannot insert or remove at index {index}, there are only {old_count}");
            return;
        }
        if delta == 0 {
            return;
        }
        self.invalidate();

        if index == old_count && delta > 0 {
            let mut counts = self.counts();
            counts[axis] = old_count + delta.unsigned_abs();
            self.maybe_expand_grid(counts.vertical, counts.horizontal);
            return;
        }

        self.infos[axis].insert_or_remove(index, delta);
        let new_count = self.row_count(axis);
        for item in self.items.values_mut() {
            item.insert_or_remove_cells(index, delta, axis, new_count);
        }
        self.regenerate_grid();
    }

    /// Swaps rows and columns, including their settings and the placement of every item.
    pub fn transpose(&mut self) {
        for item in self.items.values_mut() {
            item.transpose();
        }
        self.infos.transpose();
        self.default_spacing.transpose();
        self.regenerate_grid();
        self.invalidate();
    }

    fn counts(&self) -> PerAxis<usize> {
        PerAxis::new(self.row_count(Axis::Horizontal), self.row_count(Axis::Vertical))
    }

    fn grid_index(&self, row: usize, column: usize) -> Option<usize> {
        let columns = self.row_count(Axis::Horizontal);
        (row < self.row_count(Axis::Vertical) && column < columns).then(|| row * columns + column)
    }

    /// Returns the item at `index` along `axis` and `cross_index` along the other axis.
    fn item_in_cell(&self, index: usize, cross_index: usize, axis: Axis) -> Option<ItemId> {
        match axis {
            Axis::Vertical => self.item_at(index, cross_index),
            Axis::Horizontal => self.item_at(cross_index, index),
        }
    }

    /// Writes `id` into every cell of the block covered by `params`.
    fn place(&mut self, id: ItemId, params: &GridParams) {
        for row in params.row..params.row + params.row_span {
            for column in params.column..params.column + params.column_span {
                if let Some(index) = self.grid_index(row, column) {
                    self.grid[index] = Some(id);
                }
            }
        }
    }

    /// Grows the grid to at least `rows` by `columns`, keeping every cell in place.
    fn maybe_expand_grid(&mut self, rows: usize, columns: usize) {
        let old_rows = self.row_count(Axis::Vertical);
        let old_columns = self.row_count(Axis::Horizontal);
        let new_rows = rows.max(old_rows);
        let new_columns = columns.max(old_columns);
        if new_rows == old_rows && new_columns == old_columns {
            return;
        }

        if new_columns == old_columns {
            self.grid.resize(new_rows * new_columns, None);
        } else {
            let mut grid = vec![None; new_rows * new_columns];
            for row in 0..old_rows {
                let old_start = row * old_columns;
                let new_start = row * new_columns;
                grid[new_start..new_start + old_columns]
                    .copy_from_slice(&self.grid[old_start..old_start + old_columns]);
            }
            self.grid = grid;
        }
        self.infos.vertical.set_count(new_rows);
        self.infos.horizontal.set_count(new_columns);
    }

    /// Rebuilds the grid from the placement of every item.
    ///
    /// When items overlap, the one added first keeps the cell.
    fn regenerate_grid(&mut self) {
        let mut counts = self.counts();
        for item in self.items.values() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                counts[axis] = counts[axis].max(item.last(axis) + 1);
            }
        }
        self.infos.horizontal.set_count(counts.horizontal);
        self.infos.vertical.set_count(counts.vertical);
        self.grid = vec![None; counts.horizontal * counts.vertical];

        let placements: Vec<_> = self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.items.get(id).map(|item| (*id, item.params())))
            .collect();
        for (id, params) in placements {
            self.place(id, &params);
        }
    }
}

// --- MARK: SETTINGS
impl<T: LayoutItem> GridEngine<T> {
    /// Sets the spacing between adjacent rows or columns without an explicit spacing.
    pub fn set_spacing(&mut self, spacing: f64, axis: Axis) {
        self.default_spacing[axis] = spacing.sanitize("spacing");
        self.invalidate();
    }

    /// Returns the spacing between adjacent rows or columns without an explicit spacing.
    pub fn spacing(&self, axis: Axis) -> f64 {
        self.default_spacing[axis]
    }

    /// Sets the alignment of items that neither they nor their row specify vertically.
    pub fn set_default_alignment(&mut self, alignment: Alignment) {
        self.default_alignment = alignment;
        self.invalidate();
    }

    /// Returns the fallback alignment of items.
    pub fn default_alignment(&self) -> Alignment {
        self.default_alignment
    }

    /// Enables rounding of cell positions and item origins to whole pixels.
    ///
    /// This is on by default.
    pub fn set_snap_to_pixel_grid(&mut self, snap: bool) {
        self.snap_to_pixel_grid = snap;
        self.invalidate();
    }

    /// Returns `true` if positions are rounded to whole pixels.
    pub fn snap_to_pixel_grid(&self) -> bool {
        self.snap_to_pixel_grid
    }

    /// Sets the direction in which columns are laid out.
    pub fn set_visual_direction(&mut self, direction: LayoutDirection) {
        self.direction = direction;
        self.invalidate();
    }

    /// Returns the direction in which columns are laid out.
    pub fn visual_direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Overrides the stretch factor of the row or column at `index`.
    ///
    /// The grid grows to include `index` if needed.
    pub fn set_row_stretch_factor(&mut self, index: usize, stretch: u32, axis: Axis) {
        self.cell_info_mut(index, axis).stretch = Some(stretch);
    }

    /// Returns the explicit stretch factor of the row or column at `index`.
    pub fn row_stretch_factor(&self, index: usize, axis: Axis) -> Option<u32> {
        self.infos[axis].cell(index).stretch
    }

    /// Overrides the spacing after the row or column at `index`.
    ///
    /// The grid grows to include `index` if needed.
    pub fn set_row_spacing(&mut self, index: usize, spacing: f64, axis: Axis) {
        self.cell_info_mut(index, axis).spacing = Some(spacing.sanitize("row spacing"));
    }

    /// Returns the explicit spacing after the row or column at `index`.
    pub fn row_spacing(&self, index: usize, axis: Axis) -> Option<f64> {
        self.infos[axis].cell(index).spacing
    }

    /// Overrides the `which` size of the row or column at `index`.
    ///
    /// The override raises the minimum and preferred sizes folded from the items,
    /// and replaces their maximum unless it is [`GridBox::UNBOUNDED`].
    /// The grid grows to include `index` if needed.
    pub fn set_row_size_hint(&mut self, which: SizeHint, index: usize, size: f64, axis: Axis) {
        let size = size.sanitize("row size hint");
        self.cell_info_mut(index, axis).size_box.set(which, size);
    }

    /// Returns the explicit `which` size of the row or column at `index`.
    pub fn row_size_hint(&self, which: SizeHint, index: usize, axis: Axis) -> f64 {
        self.infos[axis].cell(index).size_box.get(which)
    }

    /// Sets the alignment of items in the row or column at `index`
    /// that don't specify one along `axis`.
    ///
    /// The grid grows to include `index` if needed.
    pub fn set_row_alignment(&mut self, index: usize, alignment: Alignment, axis: Axis) {
        self.cell_info_mut(index, axis).alignment = alignment;
    }

    /// Returns the alignment of the row or column at `index`.
    pub fn row_alignment(&self, index: usize, axis: Axis) -> Alignment {
        self.infos[axis].cell(index).alignment
    }

    fn cell_info_mut(&mut self, index: usize, axis: Axis) -> &mut CellInfo {
        let mut counts = self.counts();
        counts[axis] = counts[axis].max(index + 1);
        self.maybe_expand_grid(counts.vertical, counts.horizontal);
        self.invalidate();
        self.infos[axis].cell_mut(index)
    }

    /// Returns the alignment an item is placed with.
    ///
    /// Missing flags come from the item's first row and column,
    /// and missing vertical flags then from the engine default.
    fn effective_alignment(&self, item: &GridItem<T>) -> Alignment {
        let mut alignment = item.alignment;
        if alignment.along(Axis::Vertical).is_empty() {
            alignment |= self
                .row_alignment(item.first(Axis::Vertical), Axis::Vertical)
                .along(Axis::Vertical);
            if alignment.along(Axis::Vertical).is_empty() {
                alignment |= self.default_alignment.along(Axis::Vertical);
            }
        }
        if alignment.along(Axis::Horizontal).is_empty() {
            alignment |= self
                .row_alignment(item.first(Axis::Horizontal), Axis::Horizontal)
                .along(Axis::Horizontal);
        }
        alignment
    }
}

// --- MARK: LAYOUT
impl<T: LayoutItem> GridEngine<T> {
    /// Drops every memoized result.
    ///
    /// The engine calls this itself on any modification. Call it when the hints of the
    /// items changed without going through [`item_mut`](Self::item_mut).
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.constraint_orientation = None;
    }

    /// Returns which axis the size of the items depends on.
    ///
    /// Logs a warning when items start to disagree.
    pub fn constraint_orientation(&mut self) -> ConstraintOrientation {
        if let Some(orientation) = self.constraint_orientation {
            return orientation;
        }

        let mut orientation = ConstraintOrientation::NoConstraint;
        for id in self.order.iter().rev() {
            let Some(axis) = self
                .items
                .get(id)
                .and_then(|item| item.content.dynamic_constraint())
            else {
                continue;
            };
            let item_orientation = ConstraintOrientation::from(axis);
            if orientation == ConstraintOrientation::NoConstraint {
                orientation = item_orientation;
            } else if orientation != item_orientation {
                orientation = ConstraintOrientation::Unfeasible;
                break;
            }
        }

        if orientation == ConstraintOrientation::Unfeasible {
            if self.reported_unfeasible {
                debug!("grid still mixes horizontal and vertical dynamic constraints");
            } else {
                warn!("cannot mix horizontal and vertical dynamic constraints in the same grid");
                self.reported_unfeasible = true;
            }
        } else {
            self.reported_unfeasible = false;
        }

        self.constraint_orientation = Some(orientation);
        orientation
    }

    /// Returns `true` if some items depend on the extent of the other axis,
    /// and they all agree on which one.
    pub fn has_dynamic_constraint(&mut self) -> bool {
        matches!(
            self.constraint_orientation(),
            ConstraintOrientation::Horizontal | ConstraintOrientation::Vertical
        )
    }

    /// Returns the `which` size of the whole grid.
    ///
    /// When items have a height that depends on their width, a `width` makes the
    /// returned height account for it; the same goes for `height` in the other direction.
    /// Otherwise both are ignored.
    pub fn size_hint(&mut self, which: SizeHint, width: Option<f64>, height: Option<f64>) -> Size {
        let _span = trace_span!("size_hint", ?which, ?width, ?height).entered();

        let has_cells = self.row_count(Axis::Horizontal) > 0 && self.row_count(Axis::Vertical) > 0;
        if has_cells && self.has_dynamic_constraint() {
            let constraint = match self.constraint_orientation() {
                ConstraintOrientation::Vertical => width.map(|width| (Axis::Horizontal, width)),
                _ => height.map(|height| (Axis::Vertical, height)),
            };
            if let Some((primary, extent)) = constraint {
                self.ensure_axis_data(primary, None);
                let solved = self.solve_axis(primary, extent);
                self.ensure_axis_data(primary.cross(), Some(&solved));
                return self.total_size(which);
            }
        }

        self.ensure_axis_data(Axis::Horizontal, None);
        self.ensure_axis_data(Axis::Vertical, None);
        self.total_size(which)
    }

    /// Lays out the grid in `contents` and returns the rectangle of every item,
    /// in insertion order.
    pub fn compute_geometries(&mut self, contents: Rect) -> Vec<(ItemId, Rect)> {
        if self.row_count(Axis::Horizontal) == 0 || self.row_count(Axis::Vertical) == 0 {
            return Vec::new();
        }
        self.ensure_geometries(contents.size());

        self.order
            .iter()
            .filter_map(|&id| {
                let item = self.items.get(&id)?;
                Some((id, self.item_geometry(item, contents)))
            })
            .collect()
    }

    /// Lays out the grid in `contents` and passes every item its rectangle.
    pub fn set_geometries(&mut self, contents: Rect) {
        for (id, geometry) in self.compute_geometries(contents) {
            if let Some(item) = self.items.get_mut(&id) {
                item.content.set_geometry(geometry);
            }
        }
    }

    /// Returns the area covered by a block of cells when the grid is laid out in `contents`.
    ///
    /// Spans reaching past the grid are cut at its last row or column.
    /// Returns `None` if the first cell is outside the grid or a span is zero.
    pub fn cell_rect(
        &mut self,
        contents: Rect,
        row: usize,
        column: usize,
        row_span: usize,
        column_span: usize,
    ) -> Option<Rect> {
        let counts = self.counts();
        if row >= counts.vertical || column >= counts.horizontal || row_span == 0 || column_span == 0 {
            return None;
        }
        self.ensure_geometries(contents.size());

        let cells = &self.cache.geometries.cells;
        let last_row = (row + row_span).min(counts.vertical) - 1;
        let last_column = (column + column_span).min(counts.horizontal) - 1;
        let (x, width) = span_extent(&cells.horizontal, column, last_column);
        let (y, height) = span_extent(&cells.vertical, row, last_row);
        let rect = Rect::from_origin_size(
            (contents.x0 + x, contents.y0 + y),
            Size::new(width, height),
        );
        Some(self.visual_rect(rect, contents))
    }

    fn total_size(&self, which: SizeHint) -> Size {
        let axes = &self.cache.axes;
        PerAxis::new(&axes.horizontal, &axes.vertical)
            .map(|_, cache| cache.total_box.get(which))
            .to_size()
    }

    /// Solves both axes for a container of `size`, unless already done.
    fn ensure_geometries(&mut self, size: Size) {
        if self.cache.geometries.is_valid_for(size) {
            trace!("reusing cell geometries");
            return;
        }
        let _span = trace_span!("ensure_geometries", width = size.width, height = size.height).entered();

        // Items whose width depends on their height need the rows first.
        let primary = match self.constraint_orientation() {
            ConstraintOrientation::Horizontal => Axis::Vertical,
            _ => Axis::Horizontal,
        };
        let secondary = primary.cross();
        let extent = PerAxis::from(size);

        self.ensure_axis_data(primary, None);
        let first = self.solve_axis(primary, extent[primary]);
        let cross = self.has_dynamic_constraint().then_some(&first);
        self.ensure_axis_data(secondary, cross);
        let second = self.solve_axis(secondary, extent[secondary]);

        let mut cells = PerAxis::<CellGeometries>::default();
        cells[primary] = first;
        cells[secondary] = second;
        self.cache.geometries.cells = cells;
        self.cache.geometries.container = Some(size);
    }

    /// Distributes `extent` over the rows or columns, using the folded data of `axis`.
    fn solve_axis(&self, axis: Axis, extent: f64) -> CellGeometries {
        let count = self.row_count(axis);
        if count == 0 {
            return CellGeometries::default();
        }
        let cache = &self.cache.axes[axis];
        cache.row_data.calculate_geometries(
            0..count,
            extent,
            &cache.total_box,
            &self.infos[axis],
            self.snap_to_pixel_grid,
            axis == Axis::Vertical,
        )
    }

    /// Folds the items into row data for `axis`, unless the cached data is still valid.
    ///
    /// `cross` holds the solved cells of the other axis when items depend on it.
    fn ensure_axis_data(&mut self, axis: Axis, cross: Option<&CellGeometries>) {
        let key = match cross {
            Some(cross) if !cross.sizes.is_empty() => {
                let last = cross.sizes.len() - 1;
                ConstraintKey::Constrained(cross.positions[last] + cross.sizes[last])
            }
            _ => ConstraintKey::Unconstrained,
        };
        if self.cache.axes[axis].is_valid_for(key) {
            trace!(?axis, "reusing row data");
            return;
        }

        let mut row_data = self.fill_row_data(axis, cross);
        row_data.distribute_multi_cells(&self.infos[axis], self.snap_to_pixel_grid);
        let total_box = row_data.total_box(0..row_data.len());
        self.cache.axes[axis].store(key, row_data, total_box);
    }

    /// Folds the constraints of every item into one box per row (or column).
    fn fill_row_data(&self, axis: Axis, cross: Option<&CellGeometries>) -> RowData {
        let cross_axis = axis.cross();
        let row_count = self.row_count(axis);
        let column_count = self.row_count(cross_axis);
        let info = &self.infos[axis];
        let mut data = RowData::new(row_count);

        for (row, cell) in info.iter().enumerate() {
            let mut is_empty = true;
            let mut identical_to_previous = row > 0;
            for column in 0..column_count {
                let id = self.item_in_cell(row, column, axis);
                if identical_to_previous && id != self.item_in_cell(row - 1, column, axis) {
                    identical_to_previous = false;
                }
                let holds_content = id
                    .and_then(|id| self.items.get(&id))
                    .is_some_and(|item| !item.content.is_empty());
                if holds_content {
                    is_empty = false;
                }
            }

            data.set_ignored(row, (is_empty || identical_to_previous) && cell.is_default());
            data.set_spacing(row, cell.spacing.unwrap_or(self.default_spacing[axis]));
            data.set_stretch(row, cell.stretch.map_or(-1, stretch_to_i32));
        }

        let mut any_item = false;
        let mut all_ignored = true;
        for row in 0..row_count {
            let cell = info.cell(row);
            let mut row_stretch = data.stretch(row);
            let mut row_box = GridBox::DEFAULT;

            for column in 0..column_count {
                let Some(item) = self
                    .item_in_cell(row, column, axis)
                    .and_then(|id| self.items.get(&id))
                else {
                    continue;
                };
                // Each item is folded once, from its first cell.
                if item.first(axis) != row
                    || item.first(cross_axis) != column
                    || item.content.is_empty()
                {
                    continue;
                }

                any_item = true;
                all_ignored &= item.size_policy(axis).contains(SizePolicy::IGNORE);

                let constraint = cross
                    .filter(|_| item.content.dynamic_constraint() == Some(axis))
                    .map(|cross| {
                        span_extent(cross, item.first(cross_axis), item.last(cross_axis)).1
                    });
                let item_box = item.size_box(axis, self.snap_to_pixel_grid, constraint);
                let item_stretch = item.stretch_factor(axis);

                let span = item.span(axis);
                let effective_span =
                    1 + (row + 1..row + span).filter(|&index| !data.is_ignored(index)).count();
                if effective_span == 1 {
                    row_box.combine(&item_box);
                    if cell.stretch.is_none() && item_stretch != 0 {
                        row_stretch = row_stretch.max(item_stretch);
                    }
                } else {
                    data.add_multi_cell(row, span, &item_box, item_stretch);
                }
            }

            let explicit = cell.size_box;
            row_box.minimum = row_box.minimum.max(explicit.minimum);
            let maximum = if explicit.is_unbounded() {
                row_box.maximum
            } else {
                explicit.maximum
            };
            row_box.maximum = row_box.minimum.max(maximum);
            row_box.preferred = row_box
                .preferred
                .max(explicit.preferred)
                .clamp(row_box.minimum, row_box.maximum);

            data.set_cell_box(row, row_box);
            data.set_stretch(row, row_stretch);
        }
        data.set_has_ignore_flag(any_item && all_ignored);

        data
    }

    fn item_geometry(&self, item: &GridItem<T>, contents: Rect) -> Rect {
        let cells = &self.cache.geometries.cells;
        let (x, width) = span_extent(
            &cells.horizontal,
            item.first(Axis::Horizontal),
            item.last(Axis::Horizontal),
        );
        let (y, height) = span_extent(
            &cells.vertical,
            item.first(Axis::Vertical),
            item.last(Axis::Vertical),
        );
        let row_descent = cells
            .vertical
            .descents
            .get(item.last(Axis::Vertical))
            .copied()
            .flatten();

        let cell = Rect::from_origin_size(
            (contents.x0 + x, contents.y0 + y),
            Size::new(width, height),
        );
        let mut geometry = item.geometry_within(
            cell,
            row_descent,
            self.effective_alignment(item),
            self.snap_to_pixel_grid,
        );
        if self.snap_to_pixel_grid {
            // Centering may have moved the item off the pixel grid.
            let origin = Point::new(round_half_up(geometry.x0), round_half_up(geometry.y0));
            geometry = geometry.with_origin(origin);
        }
        self.visual_rect(geometry, contents)
    }

    /// Mirrors `rect` inside `contents` for right-to-left layouts.
    fn visual_rect(&self, rect: Rect, contents: Rect) -> Rect {
        match self.direction {
            LayoutDirection::LeftToRight => rect,
            LayoutDirection::RightToLeft => {
                rect.with_origin((contents.x0 + contents.x1 - rect.x1, rect.y0))
            }
        }
    }
}

/// Returns the start and extent of the cells `first..=last`, spacing included.
fn span_extent(cells: &CellGeometries, first: usize, last: usize) -> (f64, f64) {
    let start = cells.positions.get(first).copied().unwrap_or_default();
    let end = match (cells.positions.get(last), cells.sizes.get(last)) {
        (Some(position), Some(size)) => position + size,
        _ => start,
    };
    (start, end - start)
}

fn stretch_to_i32(stretch: u32) -> i32 {
    i32::try_from(stretch).unwrap_or(i32::MAX)
}
