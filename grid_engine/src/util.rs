// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Miscellaneous utility functions.

/// Panic in debug and `tracing::error` in release mode.
///
/// This macro is in some way a combination of `panic` and `debug_assert`,
/// but it will log the provided message instead of ignoring it in release builds.
///
/// The grid engine uses it for caller mistakes it can recover from,
/// such as an out-of-range cell index passed to a setter.
#[macro_export]
macro_rules! debug_panic {
    ($msg:expr$(,)?) => {
        if cfg!(debug_assertions) {
            panic!($msg);
        } else {
            tracing::error!($msg);
        }
    };
    ($fmt:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) {
            panic!($fmt, $($arg)*);
        } else {
            tracing::error!($fmt, $($arg)*);
        }
    };
}

pub use crate::debug_panic;

/// Provides sanitization of values.
///
/// This is a generic trait that doesn't specify what sanitization exactly means,
/// as that will be implementations specific per type.
pub trait Sanitize {
    /// Returns the sanitized value.
    ///
    /// Depending on the implementation, may also panic or log.
    #[track_caller]
    fn sanitize(self, name: &str) -> Self;
}

impl Sanitize for f64 {
    /// Ensures the value is finite and non-negative.
    ///
    /// Non-finite or negative value falls back to zero.
    ///
    /// `name` is how the value will be named in the log message.
    ///
    /// # Panics
    ///
    /// Panics if the value is non-finite or negative and debug assertions are enabled.
    #[track_caller]
    fn sanitize(self, name: &str) -> Self {
        if !self.is_finite() {
            debug_panic!("{name} must be finite. Received: {self}");
            0.
        } else if self < 0. {
            debug_panic!("{name} must be non-negative. Received: {self}");
            0.
        } else {
            self
        }
    }
}

/// Rounds to the nearest integer, with ties rounding up.
///
/// Unlike [`f64::round`], `-0.5` rounds to `0.` so that
/// positions on both sides of the origin snap the same way.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_round_up() {
        assert_eq!(round_half_up(1.5), 2.);
        assert_eq!(round_half_up(-0.5), 0.);
        assert_eq!(round_half_up(2.49), 2.);
    }

    #[test]
    fn sanitize_keeps_valid_values() {
        assert_eq!(12.5_f64.sanitize("spacing"), 12.5);
        assert_eq!(0_f64.sanitize("spacing"), 0.);
    }

    #[test]
    #[should_panic(expected = "spacing must be non-negative")]
    #[cfg(debug_assertions)]
    fn sanitize_rejects_negative() {
        let _ = (-1_f64).sanitize("spacing");
    }
}
