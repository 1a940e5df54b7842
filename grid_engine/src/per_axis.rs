// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::ops::{Index, IndexMut};

use kurbo::{Axis, Size};

/// A pair of values, one for each [`Axis`].
///
/// The grid engine runs the same code for rows and columns.
/// Anything that exists once per orientation (cell infos, default spacings,
/// item spans, cached solutions) is stored in a `PerAxis` and indexed with the axis
/// currently being solved, instead of swapping rows and columns by hand.
///
/// [`Axis::Horizontal`] holds the column-related value and
/// [`Axis::Vertical`] holds the row-related value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerAxis<T> {
    /// The value for the horizontal axis.
    pub horizontal: T,
    /// The value for the vertical axis.
    pub vertical: T,
}

impl<T> PerAxis<T> {
    /// Creates a new pair from the horizontal and vertical values.
    pub const fn new(horizontal: T, vertical: T) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Creates a pair holding `value` for both axes.
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            horizontal: value.clone(),
            vertical: value,
        }
    }

    /// Returns the pair with the horizontal and vertical values swapped.
    #[must_use]
    pub fn transposed(self) -> Self {
        Self {
            horizontal: self.vertical,
            vertical: self.horizontal,
        }
    }

    /// Swaps the horizontal and vertical values in place.
    pub fn transpose(&mut self) {
        core::mem::swap(&mut self.horizontal, &mut self.vertical);
    }

    /// Applies `f` to both values.
    pub fn map<U>(self, mut f: impl FnMut(Axis, T) -> U) -> PerAxis<U> {
        PerAxis {
            horizontal: f(Axis::Horizontal, self.horizontal),
            vertical: f(Axis::Vertical, self.vertical),
        }
    }
}

impl PerAxis<f64> {
    /// Converts the pair into a [`Size`], horizontal being the width.
    pub fn to_size(self) -> Size {
        Size::new(self.horizontal, self.vertical)
    }
}

impl From<Size> for PerAxis<f64> {
    fn from(size: Size) -> Self {
        Self::new(size.width, size.height)
    }
}

impl<T> Index<Axis> for PerAxis<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_by_axis() {
        let mut pair = PerAxis::new(1, 2);
        assert_eq!(pair[Axis::Horizontal], 1);
        assert_eq!(pair[Axis::Vertical], 2);

        pair[Axis::Vertical] = 5;
        assert_eq!(pair.vertical, 5);
    }

    #[test]
    fn transposed_swaps_axes() {
        let pair = PerAxis::new("columns", "rows").transposed();
        assert_eq!(pair[Axis::Horizontal], "rows");
        assert_eq!(pair[Axis::Vertical], "columns");
    }

    #[test]
    fn size_conversion() {
        let pair = PerAxis::from(Size::new(3., 4.));
        assert_eq!(pair.to_size(), Size::new(3., 4.));
    }
}
