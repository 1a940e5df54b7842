// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use crate::ItemId;

/// Errors returned when modifying the items of a [`GridEngine`](crate::GridEngine).
///
/// The engine is left unchanged when an operation fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    /// The item would cover a cell that already holds another item.
    CellOccupied {
        /// Row of the first conflicting cell.
        row: usize,
        /// Column of the first conflicting cell.
        column: usize,
        /// The item already placed there.
        occupant: ItemId,
    },
    /// The item would span no rows or no columns.
    EmptySpan {
        /// Requested number of rows.
        row_span: usize,
        /// Requested number of columns.
        column_span: usize,
    },
    /// No item with this id is part of the engine.
    UnknownItem(ItemId),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOccupied {
                row,
                column,
                occupant,
            } => write!(
                f,
                "cell at row {row}, column {column} is already occupied by item {}",
                occupant.to_raw()
            ),
            Self::EmptySpan {
                row_span,
                column_span,
            } => write!(
                f,
                "item must span at least one cell, got {row_span} rows and {column_span} columns"
            ),
            Self::UnknownItem(id) => write!(f, "no item with id {} in the grid", id.to_raw()),
        }
    }
}

impl std::error::Error for GridError {}
