// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use bitflags::bitflags;
use kurbo::{Axis, Rect, Size};

use crate::util::Sanitize;
use crate::{Baseline, GridBox, PerAxis, SizeHint};

bitflags! {
    /// How content reacts to getting more or less room than it prefers, along one axis.
    ///
    /// The named combinations such as [`SizePolicy::PREFERRED`] cover the common cases.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SizePolicy: u8 {
        /// The content can use more than its preferred size.
        const GROW = 1 << 0;
        /// The content wants as much room as it can get.
        const EXPAND = 1 << 1;
        /// The content can be shrunk down to its minimum size.
        const SHRINK = 1 << 2;
        /// The preferred size is ignored: the content only asks for its minimum.
        const IGNORE = 1 << 3;
    }
}

impl SizePolicy {
    /// The preferred size is the only acceptable size.
    pub const FIXED: Self = Self::empty();
    /// The preferred size is a minimum, the content may grow.
    pub const MINIMUM: Self = Self::GROW;
    /// The preferred size is a maximum, the content may shrink.
    pub const MAXIMUM: Self = Self::SHRINK;
    /// The content may shrink and grow, but doesn't ask for extra room.
    pub const PREFERRED: Self = Self::GROW.union(Self::SHRINK);
    /// The content may grow and wants extra room, but can't shrink.
    pub const MINIMUM_EXPANDING: Self = Self::GROW.union(Self::EXPAND);
    /// The content may shrink, grow and wants extra room.
    pub const EXPANDING: Self = Self::PREFERRED.union(Self::EXPAND);
    /// The content only asks for its minimum and takes whatever else is available.
    pub const IGNORED: Self = Self::PREFERRED.union(Self::IGNORE);

    /// Returns the stretch factor used when no explicit stretch is set.
    ///
    /// Expanding content gets a stretch of `1`.
    /// Growing content gets `-1`, which means it only receives space
    /// that no stretching cell wants.
    /// Anything else doesn't stretch.
    pub fn default_stretch(self) -> i32 {
        if self.contains(Self::EXPAND) {
            1
        } else if self.contains(Self::GROW) {
            -1
        } else {
            0
        }
    }
}

bitflags! {
    /// Placement of an item inside the area of its cells.
    ///
    /// At most one horizontal and one vertical flag should be set.
    /// Without a horizontal flag the item is placed at the leading edge,
    /// without a vertical flag at the top.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Alignment: u16 {
        /// Align with the left edge.
        const LEFT = 1 << 0;
        /// Align with the right edge.
        const RIGHT = 1 << 1;
        /// Center horizontally.
        const H_CENTER = 1 << 2;
        /// Align with the top edge.
        const TOP = 1 << 5;
        /// Align with the bottom edge.
        const BOTTOM = 1 << 6;
        /// Center vertically.
        const V_CENTER = 1 << 7;
        /// Align the item's baseline with the shared baseline of its row.
        const BASELINE = 1 << 8;

        /// Center on both axes.
        const CENTER = Self::H_CENTER.bits() | Self::V_CENTER.bits();
        /// All horizontal flags.
        const HORIZONTAL_MASK = Self::LEFT.bits() | Self::RIGHT.bits() | Self::H_CENTER.bits();
        /// All vertical flags.
        const VERTICAL_MASK =
            Self::TOP.bits() | Self::BOTTOM.bits() | Self::V_CENTER.bits() | Self::BASELINE.bits();
    }
}

impl Alignment {
    /// Returns the flags that apply to `axis`.
    pub fn along(self, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => self & Self::HORIZONTAL_MASK,
            Axis::Vertical => self & Self::VERTICAL_MASK,
        }
    }
}

/// The content placed into a [`GridEngine`](crate::GridEngine).
///
/// The engine never inspects the content directly:
/// it asks for size hints when folding the grid,
/// and hands over the final rectangle in [`set_geometry`](Self::set_geometry).
///
/// All queries must be deterministic for a given input,
/// because the engine caches their results until it is invalidated.
pub trait LayoutItem {
    /// Returns the `which` size of the content along `axis`.
    ///
    /// `constraint` is the already solved extent on the cross axis, if any.
    /// It is only provided for the axis returned by
    /// [`dynamic_constraint`](Self::dynamic_constraint),
    /// so content whose size doesn't depend on the cross axis can ignore it.
    ///
    /// A maximum of [`GridBox::UNBOUNDED`] means no limit.
    fn size_hint(&self, which: SizeHint, axis: Axis, constraint: Option<f64>) -> f64;

    /// Returns the minimum extent below the baseline, if the content has a baseline.
    ///
    /// Only queried for items aligned with [`Alignment::BASELINE`].
    fn minimum_descent(&self, constraint: Option<f64>) -> Option<f64> {
        let _ = constraint;
        None
    }

    /// Returns how the content reacts to more or less room along `axis`.
    fn size_policy(&self, axis: Axis) -> SizePolicy {
        let _ = axis;
        SizePolicy::PREFERRED
    }

    /// Returns the axis whose size depends on the extent of the other axis.
    ///
    /// Text that wraps has a height that depends on its width,
    /// and would return [`Axis::Vertical`].
    fn dynamic_constraint(&self) -> Option<Axis> {
        None
    }

    /// Returns `true` if the content is currently not shown.
    ///
    /// Rows and columns holding only empty items take no space.
    fn is_empty(&self) -> bool {
        false
    }

    /// Receives the final rectangle of the content, in the coordinate space of the container.
    fn set_geometry(&mut self, geometry: Rect) {
        let _ = geometry;
    }
}

/// Identifier of an item inserted into a [`GridEngine`](crate::GridEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u64);

impl ItemId {
    /// Returns the raw value of the identifier.
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Parameters required when adding an item to a [`GridEngine`](crate::GridEngine).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridParams {
    /// Index of the row this item is starting from.
    pub row: usize,
    /// Index of the column this item is starting from.
    pub column: usize,
    /// Number of rows this item spans.
    pub row_span: usize,
    /// Number of columns this item spans.
    pub column_span: usize,
    /// Placement of the item inside its cells.
    ///
    /// Missing flags fall back to the row, column or engine default alignment.
    pub alignment: Alignment,
    /// Explicit stretch factors, overriding the ones derived from the [`SizePolicy`].
    pub stretch: PerAxis<Option<u32>>,
}

impl Default for GridParams {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}

impl GridParams {
    /// Creates grid parameters with the given values.
    pub fn new(row: usize, column: usize, row_span: usize, column_span: usize) -> Self {
        Self {
            row,
            column,
            row_span,
            column_span,
            alignment: Alignment::empty(),
            stretch: PerAxis::default(),
        }
    }

    /// Creates parameters for an item occupying the single cell at `row` and `column`.
    pub fn at(row: usize, column: usize) -> Self {
        Self::new(row, column, 1, 1)
    }

    /// Builder-style method to set the alignment.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Builder-style method to set an explicit stretch factor along `axis`.
    #[must_use]
    pub fn with_stretch(mut self, axis: Axis, stretch: u32) -> Self {
        self.stretch[axis] = Some(stretch);
        self
    }
}

/// An item as stored by the engine: the content plus its placement.
///
/// Indices are stored per axis: the horizontal value is the column,
/// the vertical value is the row.
#[derive(Debug)]
pub(crate) struct GridItem<T> {
    pub(crate) content: T,
    first: PerAxis<usize>,
    span: PerAxis<usize>,
    pub(crate) stretch: PerAxis<Option<u32>>,
    pub(crate) alignment: Alignment,
}

impl<T: LayoutItem> GridItem<T> {
    pub(crate) fn new(content: T, params: &GridParams) -> Self {
        Self {
            content,
            first: PerAxis::new(params.column, params.row),
            span: PerAxis::new(params.column_span, params.row_span),
            stretch: params.stretch,
            alignment: params.alignment,
        }
    }

    pub(crate) fn params(&self) -> GridParams {
        GridParams {
            row: self.first.vertical,
            column: self.first.horizontal,
            row_span: self.span.vertical,
            column_span: self.span.horizontal,
            alignment: self.alignment,
            stretch: self.stretch,
        }
    }

    /// First cell index along `axis`.
    pub(crate) fn first(&self, axis: Axis) -> usize {
        self.first[axis]
    }

    /// Last cell index along `axis`, inclusive.
    pub(crate) fn last(&self, axis: Axis) -> usize {
        self.first[axis] + self.span[axis] - 1
    }

    pub(crate) fn span(&self, axis: Axis) -> usize {
        self.span[axis]
    }

    pub(crate) fn size_policy(&self, axis: Axis) -> SizePolicy {
        self.content.size_policy(axis)
    }

    /// Returns the explicit stretch along `axis`, or the one derived from the size policy.
    pub(crate) fn stretch_factor(&self, axis: Axis) -> i32 {
        match self.stretch[axis] {
            Some(stretch) => i32::try_from(stretch).unwrap_or(i32::MAX),
            None => self.size_policy(axis).default_stretch(),
        }
    }

    fn hint(&self, which: SizeHint, axis: Axis, constraint: Option<f64>) -> f64 {
        self.content
            .size_hint(which, axis, constraint)
            .sanitize("size hint")
    }

    /// Builds the constraints of this item along `axis`.
    ///
    /// The size policy decides which hints are honored:
    /// content that can't shrink has its preferred size as minimum,
    /// content that can neither grow nor expand has it as maximum.
    pub(crate) fn size_box(&self, axis: Axis, snap: bool, constraint: Option<f64>) -> GridBox {
        let policy = self.size_policy(axis);
        let preferred = self.hint(SizeHint::Preferred, axis, constraint);

        let mut minimum = if policy.contains(SizePolicy::SHRINK) {
            self.hint(SizeHint::Minimum, axis, constraint)
        } else {
            preferred
        };
        if snap {
            minimum = minimum.ceil();
        }

        let maximum = if policy.intersects(SizePolicy::GROW | SizePolicy::EXPAND) {
            self.hint(SizeHint::Maximum, axis, constraint)
        } else {
            preferred
        };

        let mut result = GridBox::new(minimum, preferred, maximum);

        if axis == Axis::Vertical && self.alignment.contains(Alignment::BASELINE) {
            if let Some(descent) = self.content.minimum_descent(constraint) {
                // Whatever the minimum was raised by (snapping, no shrinking) goes below the baseline.
                let raised_by = minimum - self.hint(SizeHint::Minimum, axis, constraint);
                let descent = descent.sanitize("minimum descent") + raised_by;
                result.baseline = Some(Baseline {
                    ascent: minimum - descent,
                    descent,
                });
            }
        }

        if policy.contains(SizePolicy::IGNORE) {
            result.preferred = result.minimum;
        }

        result.normalized()
    }

    /// Returns the largest size the item wants to occupy inside its cells.
    ///
    /// Along an axis where the item can't grow this is its preferred size.
    /// `width` and `height` constrain the respective cross-axis queries.
    pub(crate) fn effective_max_size(&self, width: Option<f64>, height: Option<f64>) -> Size {
        let mut fixed_width = width;
        let mut fixed_height = height;
        if !self.size_policy(Axis::Horizontal).contains(SizePolicy::GROW) {
            fixed_width = Some(self.hint(SizeHint::Preferred, Axis::Horizontal, height));
        }
        if !self.size_policy(Axis::Vertical).contains(SizePolicy::GROW) {
            fixed_height = Some(self.hint(SizeHint::Preferred, Axis::Vertical, width));
        }

        Size::new(
            fixed_width.unwrap_or_else(|| self.hint(SizeHint::Maximum, Axis::Horizontal, fixed_height)),
            fixed_height.unwrap_or_else(|| self.hint(SizeHint::Maximum, Axis::Vertical, fixed_width)),
        )
    }

    /// Places the item inside `cell` according to `alignment`.
    ///
    /// `row_descent` is the descent of the shared baseline of the item's last row.
    pub(crate) fn geometry_within(
        &self,
        cell: Rect,
        row_descent: Option<f64>,
        alignment: Alignment,
        snap: bool,
    ) -> Rect {
        let cell_width = cell.width();
        let cell_height = cell.height();

        let mut size = self.effective_max_size(None, None);
        match self.content.dynamic_constraint() {
            Some(Axis::Vertical) if size.width > cell_width => {
                size = self.effective_max_size(Some(cell_width), None);
            }
            Some(Axis::Horizontal) if size.height > cell_height => {
                size = self.effective_max_size(None, Some(cell_height));
            }
            _ => {}
        }
        let mut width = size.width.min(cell_width);
        let mut height = size.height.min(cell_height);

        let mut x = cell.x0;
        let mut y = cell.y0;

        let horizontal = alignment.along(Axis::Horizontal);
        if horizontal == Alignment::H_CENTER {
            x += (cell_width - width) / 2.;
        } else if horizontal == Alignment::RIGHT {
            x += cell_width - width;
        }

        let vertical = alignment.along(Axis::Vertical);
        if vertical == Alignment::V_CENTER {
            y += (cell_height - height) / 2.;
        } else if vertical == Alignment::BOTTOM {
            y += cell_height - height;
        } else if vertical == Alignment::BASELINE {
            width = width.min(self.effective_max_size(None, None).width);
            let vertical_box = self.size_box(Axis::Vertical, snap, None);
            if let Some(baseline) = vertical_box.baseline {
                let ascent = vertical_box.minimum - baseline.descent;
                y += cell_height - row_descent.unwrap_or(0.) - ascent;
                height = ascent + baseline.descent;
            }
        }

        Rect::new(x, y, x + width, y + height)
    }

    /// Shifts or resizes the item after rows or columns were inserted or removed.
    ///
    /// A positive `delta` inserts cells before `index`; items starting at or after
    /// `index` move, items straddling it get a larger span.
    /// A negative `delta` removes cells starting at `index`; items lose the removed
    /// cells, and an item left without cells collapses to a single cell at `index`,
    /// clamped to `new_count`.
    pub(crate) fn insert_or_remove_cells(
        &mut self,
        index: usize,
        delta: isize,
        axis: Axis,
        new_count: usize,
    ) {
        let first = self.first[axis];
        let last = self.last(axis);

        if delta >= 0 {
            let inserted = delta.unsigned_abs();
            if first >= index {
                self.first[axis] = first + inserted;
            } else if last >= index {
                self.span[axis] += inserted;
            }
            return;
        }

        let removed = delta.unsigned_abs();
        let end = index + removed;
        let overlap = (last + 1).min(end).saturating_sub(first.max(index));
        let survivors = self.span[axis] - overlap;
        let new_first = if first < index {
            first
        } else if first >= end {
            first - removed
        } else {
            index
        };

        if survivors == 0 {
            self.first[axis] = new_first.min(new_count.saturating_sub(1));
            self.span[axis] = 1;
        } else {
            self.first[axis] = new_first;
            self.span[axis] = survivors;
        }
    }

    /// Swaps the row and column placement of the item.
    pub(crate) fn transpose(&mut self) {
        self.first.transpose();
        self.span.transpose();
        self.stretch.transpose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Hints {
        boxes: PerAxis<GridBox>,
        policy: PerAxis<SizePolicy>,
        descent: Option<f64>,
    }

    impl Hints {
        fn new(horizontal: GridBox, vertical: GridBox) -> Self {
            Self {
                boxes: PerAxis::new(horizontal, vertical),
                policy: PerAxis::splat(SizePolicy::PREFERRED),
                descent: None,
            }
        }
    }

    impl LayoutItem for Hints {
        fn size_hint(&self, which: SizeHint, axis: Axis, _constraint: Option<f64>) -> f64 {
            self.boxes[axis].get(which)
        }

        fn minimum_descent(&self, _constraint: Option<f64>) -> Option<f64> {
            self.descent
        }

        fn size_policy(&self, axis: Axis) -> SizePolicy {
            self.policy[axis]
        }
    }

    fn item(hints: Hints) -> GridItem<Hints> {
        GridItem::new(hints, &GridParams::at(0, 0))
    }

    #[test]
    fn default_stretch_from_policy() {
        assert_eq!(SizePolicy::EXPANDING.default_stretch(), 1);
        assert_eq!(SizePolicy::PREFERRED.default_stretch(), -1);
        assert_eq!(SizePolicy::FIXED.default_stretch(), 0);
        assert_eq!(SizePolicy::MAXIMUM.default_stretch(), 0);
    }

    #[test]
    fn explicit_stretch_wins() {
        let mut item = item(Hints::new(GridBox::fixed(1.), GridBox::fixed(1.)));
        assert_eq!(item.stretch_factor(Axis::Horizontal), -1);
        item.stretch.horizontal = Some(4);
        assert_eq!(item.stretch_factor(Axis::Horizontal), 4);
    }

    #[test]
    fn policy_shapes_the_box() {
        let hints = GridBox::new(10., 20., 30.);
        let mut content = Hints::new(hints, hints);
        content.policy = PerAxis::new(SizePolicy::FIXED, SizePolicy::IGNORED);
        let item = item(content);

        assert_eq!(
            item.size_box(Axis::Horizontal, false, None),
            GridBox::fixed(20.)
        );
        assert_eq!(
            item.size_box(Axis::Vertical, false, None),
            GridBox::new(10., 10., 30.)
        );
    }

    #[test]
    fn snapping_rounds_minimum_up() {
        let hints = GridBox::new(10.2, 20., 30.);
        let item = item(Hints::new(hints, hints));
        assert_eq!(item.size_box(Axis::Horizontal, true, None).minimum, 11.);
        assert_eq!(item.size_box(Axis::Horizontal, false, None).minimum, 10.2);
    }

    #[test]
    fn baseline_only_for_baseline_alignment() {
        let mut content = Hints::new(GridBox::fixed(10.), GridBox::fixed(20.));
        content.descent = Some(5.);
        let mut item = item(content);

        assert_eq!(item.size_box(Axis::Vertical, false, None).baseline, None);

        item.alignment = Alignment::BASELINE;
        assert_eq!(
            item.size_box(Axis::Vertical, false, None).baseline,
            Some(Baseline {
                ascent: 15.,
                descent: 5.
            })
        );
        assert_eq!(item.size_box(Axis::Horizontal, false, None).baseline, None);
    }

    #[test]
    fn geometry_is_aligned_in_cell() {
        let hints = GridBox::new(0., 10., 10.);
        let item = item(Hints::new(hints, hints));
        let cell = Rect::new(0., 0., 30., 40.);

        assert_eq!(
            item.geometry_within(cell, None, Alignment::empty(), false),
            Rect::new(0., 0., 10., 10.)
        );
        assert_eq!(
            item.geometry_within(cell, None, Alignment::CENTER, false),
            Rect::new(10., 15., 20., 25.)
        );
        assert_eq!(
            item.geometry_within(cell, None, Alignment::RIGHT | Alignment::BOTTOM, false),
            Rect::new(20., 30., 30., 40.)
        );
    }

    #[test]
    fn geometry_is_bounded_by_cell() {
        let item = item(Hints::new(GridBox::DEFAULT, GridBox::DEFAULT));
        let cell = Rect::new(5., 5., 25., 45.);
        assert_eq!(
            item.geometry_within(cell, None, Alignment::CENTER, false),
            cell
        );
    }

    #[test]
    fn insertion_moves_or_grows() {
        let mut item = GridItem::new(
            Hints::new(GridBox::DEFAULT, GridBox::DEFAULT),
            &GridParams::new(2, 0, 3, 1),
        );
        item.insert_or_remove_cells(3, 2, Axis::Vertical, 7);
        assert_eq!((item.first(Axis::Vertical), item.span(Axis::Vertical)), (2, 5));

        item.insert_or_remove_cells(0, 1, Axis::Vertical, 8);
        assert_eq!((item.first(Axis::Vertical), item.span(Axis::Vertical)), (3, 5));

        // Columns are untouched.
        assert_eq!((item.first(Axis::Horizontal), item.span(Axis::Horizontal)), (0, 1));
    }

    #[test]
    fn removal_shrinks_or_collapses() {
        let mut item = GridItem::new(
            Hints::new(GridBox::DEFAULT, GridBox::DEFAULT),
            &GridParams::new(1, 0, 3, 1),
        );
        // Rows 1..=3, remove rows 0 and 1.
        item.insert_or_remove_cells(0, -2, Axis::Vertical, 3);
        assert_eq!((item.first(Axis::Vertical), item.span(Axis::Vertical)), (0, 2));

        // Remove everything the item covers.
        item.insert_or_remove_cells(0, -2, Axis::Vertical, 1);
        assert_eq!((item.first(Axis::Vertical), item.span(Axis::Vertical)), (0, 1));
    }
}
