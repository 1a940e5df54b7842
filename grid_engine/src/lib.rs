// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Grid Engine distributes the space of a container over the rows and columns of a grid.
//!
//! Items are placed on rectangular blocks of cells of a [`GridEngine`].
//! Each item reports minimum, preferred and maximum sizes through the [`LayoutItem`] trait,
//! and the engine computes the position and size of every row, every column and every item
//! for any container size.
//!
//! The distribution is not a proportional split:
//!
//! - Below the preferred size, cells grow from their minimum following a power law
//!   that keeps the layout smooth while the container grows.
//! - Above it, extra space is shared by stretch factor, and cells are pinned at their
//!   maximum one at a time.
//! - Items spanning several cells push their constraints down into those cells.
//! - Baseline-aligned items in a row share a common baseline.
//! - Content whose height depends on its width (or the other way around) is solved in two passes.
//!
//! All positions can be snapped to whole pixels without losing the total extent.
//!
//! Geometry types come from [`kurbo`], which is re-exported.
//!
//! # Diagnostics
//!
//! The engine reports through [`tracing`]: a warning when items mix
//! dynamic-constraint axes, debug events when an insertion is rejected,
//! and trace spans around every solve.
//! Caller mistakes it can recover from, such as negative spacings, panic in debug builds
//! and are logged and sanitized in release builds.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use kurbo;

#[macro_use]
pub mod util;

mod cache;
mod cell_info;
mod engine;
mod error;
mod grid_box;
mod item;
mod per_axis;
mod row_data;

pub use cell_info::{AxisInfo, CellInfo};
pub use engine::{ConstraintOrientation, GridEngine, LayoutDirection};
pub use error::GridError;
pub use grid_box::{Baseline, GridBox, SizeHint};
pub use item::{Alignment, GridParams, ItemId, LayoutItem, SizePolicy};
pub use per_axis::PerAxis;
pub use row_data::{CellGeometries, MultiCell, RowData};
