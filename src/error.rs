//! Error types for the solving engine.
//!
//! Mirrors `pyngrm`'s `NonogramError` and the board-construction `ValueError`s
//! (`pyngrm/board.py::validate`/`validate_headers`) as a single Rust enum,
//! hand-rolled with a plain `Display` + `Error` impl rather than pulling in
//! `thiserror`/`anyhow`.

use std::error::Error;
use std::fmt;

/// Which axis a line-level error occurred on.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Errors raised by the core solving engine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SolveError {
    /// A line has no valid placement given its current cell constraints.
    ///
    /// Raised by the line solver. Caught by the contradiction driver as a
    /// successful refutation; propagated out of ordinary propagation as a
    /// solver failure (the puzzle is unsatisfiable).
    Inconsistency { axis: Axis, index: usize },

    /// A clue's minimum required length (block sizes plus mandatory gaps)
    /// exceeds the line's capacity. Raised at board construction.
    InfeasibleClue {
        axis: Axis,
        index: usize,
        needed: usize,
        available: usize,
    },

    /// Row and column clues disagree on the total number of filled cells
    /// (overall for monochrome boards, per color for colored boards).
    ClueMismatch {
        color: Option<u32>,
        rows_total: usize,
        columns_total: usize,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inconsistency { axis, index } => {
                write!(f, "no valid arrangement for {} {}", axis, index)
            }
            Self::InfeasibleClue {
                axis,
                index,
                needed,
                available,
            } => write!(
                f,
                "cannot allocate {} {} in just {} cells (needs {})",
                axis, index, available, needed
            ),
            Self::ClueMismatch {
                color,
                rows_total,
                columns_total,
            } => match color {
                Some(id) => write!(
                    f,
                    "color {} count differs: {} (rows) vs {} (columns)",
                    id, rows_total, columns_total
                ),
                None => write!(
                    f,
                    "box count differs: {} (rows) vs {} (columns)",
                    rows_total, columns_total
                ),
            },
        }
    }
}

impl Error for SolveError {}

pub type Result<T> = std::result::Result<T, SolveError>;
