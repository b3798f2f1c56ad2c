//! The 2-D cell grid plus row/column clues and the mutation helpers the
//! propagation and probing solvers need.
//!
//! The `get_row`/`set_row`/`is_solved_full`/`solution_rate` surface follows
//! the board API a priority-queue propagation driver needs, and the
//! construction-time validation and observer-callback shape
//! (`row_updated`/`column_updated`/`solution_round_completed`) is grounded
//! on `pyngrm/board.py::BaseBoard`: the board never calls into a renderer,
//! it only exposes hooks.

use std::fmt;

use crate::block::Clue;
use crate::cell::{Cell, ColorId, Line};
use crate::error::{Axis, SolveError};

/// A single grid coordinate. `x` indexes columns, `y` indexes rows.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A byte-for-byte copy of the board's cells, for the contradiction solver's
/// snapshot/restore cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    cells: Vec<Cell>,
}

/// Observer hooks. These are one-way: the board knows nothing about
/// renderers, it only notifies. Implementations must not mutate the board
/// from inside a hook.
#[derive(Default)]
pub struct Callbacks {
    pub on_row_update: Option<Box<dyn FnMut(usize)>>,
    pub on_column_update: Option<Box<dyn FnMut(usize)>>,
    pub on_solution_round_complete: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_row_update", &self.on_row_update.is_some())
            .field("on_column_update", &self.on_column_update.is_some())
            .field(
                "on_solution_round_complete",
                &self.on_solution_round_complete.is_some(),
            )
            .finish()
    }
}

/// The board: two clue lists plus a height x width grid of `Cell`s.
/// Immutable in structure (clues, dimensions), mutable in cell values.
/// Cell values are monotone: `set_row`/`set_column`/`set_cell` reject any
/// write that isn't a subset of the previous value.
#[derive(Debug)]
pub struct Board {
    row_clues: Vec<Clue>,
    col_clues: Vec<Clue>,
    cells: Vec<Cell>,
    palette: Vec<ColorId>,
    solved: bool,
    solutions: Vec<Box<[Cell]>>,
    callbacks: Callbacks,
}

impl Board {
    /// Build a board, validating clue feasibility and row/column agreement,
    /// ported from `pyngrm/board.py::validate`.
    pub fn new(row_clues: Vec<Clue>, col_clues: Vec<Clue>) -> Result<Self, SolveError> {
        let height = row_clues.len();
        let width = col_clues.len();

        for (index, clue) in row_clues.iter().enumerate() {
            Self::check_feasible(Axis::Row, index, clue, width)?;
        }
        for (index, clue) in col_clues.iter().enumerate() {
            Self::check_feasible(Axis::Column, index, clue, height)?;
        }

        Self::check_totals(&row_clues, &col_clues)?;

        let mut palette: Vec<ColorId> = row_clues
            .iter()
            .chain(col_clues.iter())
            .flat_map(Clue::colors)
            .collect();
        palette.push(crate::cell::SPACE);
        if palette.iter().all(|&c| c == crate::cell::SPACE) {
            // a fully blank board still admits BOX as a candidate, so lines
            // made entirely of empty clues are not vacuously "solved"
            palette.push(crate::cell::BOX);
        }
        palette.sort_unstable();
        palette.dedup();

        let cells = vec![Cell::unknown(&palette); height * width];

        Ok(Self {
            row_clues,
            col_clues,
            cells,
            palette,
            solved: false,
            solutions: Vec::new(),
            callbacks: Callbacks::default(),
        })
    }

    /// Convenience constructor for a monochrome board from plain run-length
    /// clues (every block is `BOX`-colored).
    pub fn monochrome(rows: Vec<Vec<usize>>, columns: Vec<Vec<usize>>) -> Result<Self, SolveError> {
        let to_clue = |sizes: Vec<usize>| {
            Clue::new(sizes.into_iter().map(crate::block::Block::mono).collect())
        };
        Self::new(
            rows.into_iter().map(to_clue).collect(),
            columns.into_iter().map(to_clue).collect(),
        )
    }

    fn check_feasible(axis: Axis, index: usize, clue: &Clue, available: usize) -> Result<(), SolveError> {
        let needed = clue.min_length();
        if needed > available {
            return Err(SolveError::InfeasibleClue {
                axis,
                index,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn check_totals(rows: &[Clue], columns: &[Clue]) -> Result<(), SolveError> {
        let row_totals = Self::sum_by_color(rows);
        let column_totals = Self::sum_by_color(columns);

        let mut colors: Vec<ColorId> = row_totals.keys().chain(column_totals.keys()).copied().collect();
        colors.sort_unstable();
        colors.dedup();

        let is_monochrome = colors.len() <= 1;

        for color in colors {
            let row_total = row_totals.get(&color).copied().unwrap_or(0);
            let column_total = column_totals.get(&color).copied().unwrap_or(0);
            if row_total != column_total {
                return Err(SolveError::ClueMismatch {
                    color: if is_monochrome { None } else { Some(color) },
                    rows_total: row_total,
                    columns_total: column_total,
                });
            }
        }
        Ok(())
    }

    fn sum_by_color(clues: &[Clue]) -> hashbrown::HashMap<ColorId, usize> {
        let mut totals = hashbrown::HashMap::new();
        for clue in clues {
            for (color, count) in clue.totals_by_color() {
                *totals.entry(color).or_insert(0) += count;
            }
        }
        totals
    }

    pub fn height(&self) -> usize {
        self.row_clues.len()
    }

    pub fn width(&self) -> usize {
        self.col_clues.len()
    }

    pub fn palette(&self) -> &[ColorId] {
        &self.palette
    }

    pub fn row_clue(&self, index: usize) -> &Clue {
        &self.row_clues[index]
    }

    pub fn column_clue(&self, index: usize) -> &Clue {
        &self.col_clues[index]
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    pub fn cell(&self, point: Point) -> Cell {
        self.cells[self.index(point.x, point.y)]
    }

    pub fn get_row(&self, index: usize) -> Line {
        let width = self.width();
        self.cells[index * width..(index + 1) * width]
            .iter()
            .copied()
            .collect()
    }

    pub fn get_column(&self, index: usize) -> Line {
        (0..self.height()).map(|y| self.cell(Point::new(index, y))).collect()
    }

    /// Replace a row. Every new cell must be a subset of the old one
    /// (monotone refinement). Returns the list of cell indexes (x, within
    /// the row) that strictly changed.
    pub fn set_row(&mut self, index: usize, new: &[Cell]) -> Vec<usize> {
        let width = self.width();
        debug_assert_eq!(new.len(), width);
        let mut changed = Vec::new();
        for x in 0..width {
            let old = self.cell(Point::new(x, index));
            if new[x] != old {
                debug_assert!(
                    new[x].is_strict_refinement_of(old),
                    "non-monotone write to row {} at column {}: {:?} -> {:?}",
                    index,
                    x,
                    old,
                    new[x]
                );
                let i = self.index(x, index);
                self.cells[i] = new[x];
                changed.push(x);
            }
        }
        if !changed.is_empty() {
            if let Some(cb) = self.callbacks.on_row_update.as_mut() {
                cb(index);
            }
        }
        changed
    }

    /// Replace a column, symmetric to `set_row`.
    pub fn set_column(&mut self, index: usize, new: &[Cell]) -> Vec<usize> {
        let height = self.height();
        debug_assert_eq!(new.len(), height);
        let mut changed = Vec::new();
        for y in 0..height {
            let old = self.cell(Point::new(index, y));
            if new[y] != old {
                debug_assert!(
                    new[y].is_strict_refinement_of(old),
                    "non-monotone write to column {} at row {}: {:?} -> {:?}",
                    index,
                    y,
                    old,
                    new[y]
                );
                let i = self.index(index, y);
                self.cells[i] = new[y];
                changed.push(y);
            }
        }
        if !changed.is_empty() {
            if let Some(cb) = self.callbacks.on_column_update.as_mut() {
                cb(index);
            }
        }
        changed
    }

    /// Set a single cell, used by the probing solver to stage an
    /// assumption. Returns `false` if `new` is not a strict subset of the
    /// current value (the caller is expected to have checked `is_solved`
    /// first; this is a debug assertion, not a runtime check, matching
    /// `set_row`/`set_column`).
    pub fn set_cell(&mut self, point: Point, new: Cell) {
        let old = self.cell(point);
        debug_assert!(
            new.is_strict_refinement_of(old) || new == old,
            "non-monotone write to {:?}: {:?} -> {:?}",
            point,
            old,
            new
        );
        let i = self.index(point.x, point.y);
        self.cells[i] = new;
    }

    pub fn row_solution_rate(&self, index: usize) -> f64 {
        let width = self.width();
        if width == 0 {
            return 1.0;
        }
        self.get_row(index)
            .iter()
            .map(|c| c.solution_rate(&self.palette))
            .sum::<f64>()
            / width as f64
    }

    pub fn column_solution_rate(&self, index: usize) -> f64 {
        let height = self.height();
        if height == 0 {
            return 1.0;
        }
        self.get_column(index)
            .iter()
            .map(|c| c.solution_rate(&self.palette))
            .sum::<f64>()
            / height as f64
    }

    pub fn solution_rate(&self) -> f64 {
        let total = self.cells.len();
        if total == 0 {
            return 1.0;
        }
        self.cells
            .iter()
            .map(|c| c.solution_rate(&self.palette))
            .sum::<f64>()
            / total as f64
    }

    pub fn is_solved_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_solved())
    }

    /// Heuristic priority for blotted boards: fewer remaining unknown cells
    /// on the line means fewer attempts were needed to narrow it, so it
    /// gets scheduled sooner (lower numeric priority). Positive-valued and
    /// monotone in remaining ambiguity (no stronger upstream definition
    /// exists for this heuristic).
    pub fn attempts_to_try(&self, is_column: bool, index: usize) -> f64 {
        let line = if is_column {
            self.get_column(index)
        } else {
            self.get_row(index)
        };
        line.iter().filter(|c| !c.is_solved()).count() as f64
    }

    pub fn set_solved(&mut self, solved: bool) {
        self.solved = solved;
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn solution_round_completed(&mut self) {
        if let Some(cb) = self.callbacks.on_solution_round_complete.as_mut() {
            cb();
        }
    }

    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.cells.clone(),
        }
    }

    /// Byte-for-byte restore, the contradiction solver's rollback
    /// primitive. Bypasses the monotonicity check on purpose: restoring can
    /// only ever widen a trial cell back to its pre-probe state.
    pub fn restore(&mut self, snapshot: Snapshot) {
        debug_assert_eq!(snapshot.cells.len(), self.cells.len());
        self.cells = snapshot.cells;
    }

    /// Record the current grid as a discovered complete solution, if it is
    /// one and isn't already recorded. Called by the probing solver when an
    /// un-refuted assumption happens to leave the board fully solved (a
    /// side effect of probing, never the product of an exhaustive search).
    pub fn record_solution_if_complete(&mut self) {
        if self.is_solved_full() {
            let snapshot: Box<[Cell]> = self.cells.clone().into_boxed_slice();
            if !self.solutions.iter().any(|s| *s == snapshot) {
                self.solutions.push(snapshot);
            }
        }
    }

    pub fn solutions(&self) -> &[Box<[Cell]>] {
        &self.solutions
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = Line> + '_ {
        (0..self.height()).map(move |i| self.get_row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    fn u_letter() -> Board {
        Board::monochrome(
            vec![vec![1, 1], vec![1, 1], vec![3]],
            vec![vec![3], vec![1], vec![3]],
        )
        .unwrap()
    }

    #[test]
    fn constructs_with_unknown_cells() {
        let board = u_letter();
        assert_eq!(board.height(), 3);
        assert_eq!(board.width(), 3);
        assert!(!board.is_solved_full());
    }

    #[test]
    fn rejects_infeasible_clue() {
        let err = Board::monochrome(vec![vec![5]], vec![vec![1], vec![1], vec![1]]).unwrap_err();
        assert!(matches!(err, SolveError::InfeasibleClue { .. }));
    }

    #[test]
    fn rejects_mismatched_totals() {
        // 1x3 board: row wants 3 boxes, columns want only 2
        let err = Board::new(
            vec![Clue::new(vec![Block::mono(3)])],
            vec![
                Clue::new(vec![Block::mono(1)]),
                Clue::new(vec![Block::mono(1)]),
                Clue::empty(),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::ClueMismatch { .. }));
    }

    #[test]
    fn set_row_reports_changed_indexes_and_fires_callback() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut board = u_letter();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let fired_clone = Rc::clone(&fired);
        board.set_callbacks(Callbacks {
            on_row_update: Some(Box::new(move |index| fired_clone.borrow_mut().push(index))),
            ..Callbacks::default()
        });
        let mut row = board.get_row(0);
        row[0] = Cell::filled();
        let changed = board.set_row(0, &row);
        assert_eq!(changed, vec![0]);
        assert_eq!(*fired.borrow(), vec![0]);
        assert_eq!(board.cell(Point::new(0, 0)), Cell::filled());
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let mut board = u_letter();
        let snap = board.snapshot();
        let mut row = board.get_row(0);
        row[0] = Cell::filled();
        let _ = board.set_row(0, &row);
        assert_ne!(board.cell(Point::new(0, 0)), Cell::unknown(board.palette()));
        board.restore(snap);
        assert_eq!(board.cell(Point::new(0, 0)), Cell::unknown(&[1, 2]));
    }
}
