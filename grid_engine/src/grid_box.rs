// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

/// Which of the three size bounds of a [`GridBox`] is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeHint {
    /// The smallest acceptable extent.
    Minimum,
    /// The extent the content would like to have.
    Preferred,
    /// The largest useful extent.
    Maximum,
}

impl SizeHint {
    /// All size hints, from smallest to largest.
    pub const ALL: [Self; 3] = [Self::Minimum, Self::Preferred, Self::Maximum];
}

/// The minimum ascent and descent of baseline-aligned content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    /// Extent above the baseline.
    pub ascent: f64,
    /// Extent below the baseline.
    pub descent: f64,
}

/// Size constraints of a cell, an item or a range of cells along one axis.
///
/// A box is rebuilt from scratch on every fold of the grid,
/// so its operations take and return plain values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridBox {
    /// The smallest acceptable extent.
    pub minimum: f64,
    /// The extent the content would like to have.
    pub preferred: f64,
    /// The largest useful extent, [`GridBox::UNBOUNDED`] if there is no limit.
    pub maximum: f64,
    /// Baseline requirements, only present for baseline-aligned content on the vertical axis.
    pub baseline: Option<Baseline>,
}

impl Default for GridBox {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl GridBox {
    /// The "no maximum" sentinel.
    ///
    /// This is a large finite number rather than infinity,
    /// so that sums and differences of unbounded boxes stay finite.
    pub const UNBOUNDED: f64 = f32::MAX as f64;

    /// An empty box that may grow without limit.
    pub const DEFAULT: Self = Self {
        minimum: 0.,
        preferred: 0.,
        maximum: Self::UNBOUNDED,
        baseline: None,
    };

    /// Creates a box without baseline requirements.
    pub const fn new(minimum: f64, preferred: f64, maximum: f64) -> Self {
        Self {
            minimum,
            preferred,
            maximum,
            baseline: None,
        }
    }

    /// Creates a box whose three bounds are all `size`.
    pub const fn fixed(size: f64) -> Self {
        Self::new(size, size, size)
    }

    /// Builder-style method to attach baseline requirements.
    #[must_use]
    pub const fn with_baseline(mut self, ascent: f64, descent: f64) -> Self {
        self.baseline = Some(Baseline { ascent, descent });
        self
    }

    /// Returns the bound selected by `which`.
    pub const fn get(&self, which: SizeHint) -> f64 {
        match which {
            SizeHint::Minimum => self.minimum,
            SizeHint::Preferred => self.preferred,
            SizeHint::Maximum => self.maximum,
        }
    }

    /// Sets the bound selected by `which`.
    pub const fn set(&mut self, which: SizeHint, value: f64) {
        match which {
            SizeHint::Minimum => self.minimum = value,
            SizeHint::Preferred => self.preferred = value,
            SizeHint::Maximum => self.maximum = value,
        }
    }

    /// Returns `true` if the maximum is the [`UNBOUNDED`](Self::UNBOUNDED) sentinel.
    pub fn is_unbounded(&self) -> bool {
        self.maximum == Self::UNBOUNDED
    }

    /// Appends `other` after this box along the axis, separated by `spacing`.
    ///
    /// A cell with a stretch factor of zero never grows past its preferred size,
    /// so it contributes its preferred size to the maximum.
    ///
    /// Baselines are not carried over: a sequence of cells has no single baseline.
    pub fn add(&mut self, other: &Self, stretch: i32, spacing: f64) {
        debug_assert!(
            self.baseline.is_none(),
            "cannot append to a box with a baseline"
        );
        self.minimum += other.minimum + spacing;
        self.preferred += other.preferred + spacing;
        self.maximum += if stretch == 0 {
            other.preferred
        } else {
            other.maximum
        } + spacing;
    }

    /// Merges the constraints of `other`, which occupies the same cell as this box.
    ///
    /// Minimum and preferred sizes take the larger value.
    /// A finite maximum always wins over an unbounded one,
    /// otherwise the larger maximum is kept.
    pub fn combine(&mut self, other: &Self) {
        self.baseline = match (self.baseline, other.baseline) {
            (Some(a), Some(b)) => Some(Baseline {
                ascent: a.ascent.max(b.ascent),
                descent: a.descent.max(b.descent),
            }),
            (a, b) => a.or(b),
        };

        let baseline_extent = self
            .baseline
            .map_or(0., |baseline| baseline.ascent + baseline.descent);
        self.minimum = baseline_extent.max(self.minimum.max(other.minimum));

        let max_max = if self.is_unbounded() && !other.is_unbounded() {
            other.maximum
        } else if other.is_unbounded() && !self.is_unbounded() {
            self.maximum
        } else {
            self.maximum.max(other.maximum)
        };

        self.maximum = self.minimum.max(max_max);
        self.preferred = self
            .preferred
            .max(other.preferred)
            .clamp(self.minimum, self.maximum);
    }

    /// Enforces `0 <= minimum <= preferred <= maximum` and `descent <= minimum`.
    ///
    /// This is idempotent.
    pub fn normalize(&mut self) {
        self.maximum = self.maximum.max(0.);
        self.minimum = self.minimum.clamp(0., self.maximum);
        self.preferred = self.preferred.clamp(self.minimum, self.maximum);
        if let Some(baseline) = &mut self.baseline {
            baseline.descent = baseline.descent.min(self.minimum);
        }
    }

    /// Returns a normalized copy of this box.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_uses_preferred_for_rigid_cells() {
        let mut total = GridBox::new(0., 0., 0.);
        total.add(&GridBox::new(10., 20., 50.), 0, 0.);
        total.add(&GridBox::new(10., 30., 50.), 1, 5.);

        assert_eq!(total, GridBox::new(25., 55., 75.));
    }

    #[test]
    fn combine_prefers_finite_maximum() {
        let mut unbounded = GridBox::new(5., 10., GridBox::UNBOUNDED);
        unbounded.combine(&GridBox::new(0., 5., 30.));
        assert_eq!(unbounded, GridBox::new(5., 10., 30.));

        let mut bounded = GridBox::new(0., 5., 30.);
        bounded.combine(&GridBox::new(5., 10., GridBox::UNBOUNDED));
        assert_eq!(bounded, GridBox::new(5., 10., 30.));
    }

    #[test]
    fn combine_keeps_larger_finite_maximum() {
        let mut a = GridBox::new(0., 10., 20.);
        a.combine(&GridBox::new(0., 15., 40.));
        assert_eq!(a, GridBox::new(0., 15., 40.));
    }

    #[test]
    fn combine_raises_maximum_to_minimum() {
        let mut a = GridBox::new(0., 10., 20.);
        a.combine(&GridBox::new(30., 30., 30.));
        assert_eq!(a, GridBox::new(30., 30., 30.));
    }

    #[test]
    fn combine_merges_baselines() {
        let mut a = GridBox::new(20., 20., 20.).with_baseline(15., 5.);
        a.combine(&GridBox::new(12., 12., 12.).with_baseline(4., 8.));

        assert_eq!(
            a.baseline,
            Some(Baseline {
                ascent: 15.,
                descent: 8.
            })
        );
        // The merged baseline needs more room than either input.
        assert_eq!(a.minimum, 23.);
        assert_eq!(a.maximum, 23.);
    }

    #[test]
    fn normalize_orders_bounds() {
        let mut b = GridBox::new(30., 10., 20.).with_baseline(0., 50.);
        b.normalize();
        assert_eq!(b.minimum, 20.);
        assert_eq!(b.preferred, 20.);
        assert_eq!(b.maximum, 20.);
        assert_eq!(b.baseline.map(|b| b.descent), Some(20.));

        let again = b.normalized();
        assert_eq!(again, b);
    }

    #[test]
    fn normalize_clamps_negative_values() {
        let b = GridBox::new(-5., -1., -10.).normalized();
        assert_eq!(b, GridBox::new(0., 0., 0.));
    }
}
