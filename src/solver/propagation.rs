//! Priority-queue propagation driver.
//!
//! Dirty lines sit in a `priority_queue::PriorityQueue` keyed by
//! `OrderedFloat` priority, the same structure the probing solver already
//! needs for its own queue of unsolved points (here it drives ordinary
//! propagation too, instead of a plain stack with a visited set).
//! Re-solving a line that already produced no change is avoided via
//! `LineCache`.
//!
//! The driver takes `&mut Board` directly rather than a shared, reference-
//! counted handle: nothing here needs shared ownership across solver
//! instances, so a plain mutable borrow is enough.
//!
//! `priority_queue::PriorityQueue::pop` always returns the *maximum*-keyed
//! entry, but the scheduling order this driver wants is the numerically
//! smallest priority first (freshly dirtied lines get `priority - 1.0` and
//! should be visited sooner, not later). Each job's key is therefore
//! `(Reverse<OrderedFloat<f64>>, axis_rank)`: wrapping the float in
//! `Reverse` turns the max-heap into the min-heap this driver needs, and
//! the second element breaks same-priority ties in favor of rows.

use std::cmp::Reverse;

use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, info};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::board::{Board, Point};
use crate::cache::LineCache;
use crate::error::{Axis, SolveError};

type Job = (Axis, usize);
type JobPriority = (Reverse<OrderedFloat<f64>>, u8);
type Queue = PriorityQueue<Job, JobPriority, DefaultHashBuilder>;

/// Rows are preferred over columns when two jobs tie on priority.
fn axis_rank(axis: Axis) -> u8 {
    match axis {
        Axis::Row => 1,
        Axis::Column => 0,
    }
}

fn job_priority(axis: Axis, priority: f64) -> JobPriority {
    (Reverse(OrderedFloat(priority)), axis_rank(axis))
}

/// Runs the line solver to a fixed point over a board, propagating each
/// change into the perpendicular lines it touches.
#[derive(Debug)]
pub struct PropagationDriver {
    method: super::Method,
    cache: LineCache,
    contradiction_mode: bool,
}

impl PropagationDriver {
    pub fn new(method: super::Method) -> Self {
        Self {
            method,
            cache: LineCache::default(),
            contradiction_mode: false,
        }
    }

    pub fn with_capacity(method: super::Method, capacity: usize) -> Self {
        Self {
            method,
            cache: LineCache::with_capacity(capacity),
            contradiction_mode: false,
        }
    }

    /// When on, `solve`/`solve_point` skip the `is_solved`/
    /// `solution_round_completed` bookkeeping a verified top-level solve
    /// performs (the probing solver runs propagation speculatively under a
    /// snapshot and doesn't want those side effects).
    pub fn set_contradiction_mode(&mut self, on: bool) {
        self.contradiction_mode = on;
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    /// Solve every row and column to a fixed point.
    pub fn solve(&mut self, board: &mut Board) -> Result<usize, SolveError> {
        let mut queue = Queue::with_default_hasher();
        for y in 0..board.height() {
            queue.push((Axis::Row, y), job_priority(Axis::Row, 0.0));
        }
        for x in 0..board.width() {
            queue.push((Axis::Column, x), job_priority(Axis::Column, 0.0));
        }
        self.drain(board, queue)
    }

    /// Solve only the row and column through `point`, then whatever those
    /// propagate into. Used by the probing solver to evaluate a single
    /// assumption cheaply instead of re-running the whole board.
    pub fn solve_point(&mut self, board: &mut Board, point: Point) -> Result<Vec<Point>, SolveError> {
        let mut queue = Queue::with_default_hasher();
        queue.push((Axis::Row, point.y), job_priority(Axis::Row, 1.0));
        queue.push((Axis::Column, point.x), job_priority(Axis::Column, 1.0));

        let mut touched: hashbrown::HashSet<Job> = hashbrown::HashSet::new();
        self.drain_tracking(board, queue, &mut touched)?;

        let mut points = Vec::new();
        for (axis, index) in touched {
            match axis {
                Axis::Row => {
                    for x in 0..board.width() {
                        points.push(Point::new(x, index));
                    }
                }
                Axis::Column => {
                    for y in 0..board.height() {
                        points.push(Point::new(index, y));
                    }
                }
            }
        }
        Ok(points)
    }

    /// The two-phase legacy entry point: fully resolve one axis in
    /// isolation before the other, then finish with the ordinary
    /// interleaved propagation. Unlike the upstream `solve_round(rows_first)`
    /// this flag is honored: `rows_first=false` really does solve columns
    /// before rows.
    pub fn solve_round(&mut self, board: &mut Board, rows_first: bool) -> Result<usize, SolveError> {
        let (first, second) = if rows_first {
            (Axis::Row, Axis::Column)
        } else {
            (Axis::Column, Axis::Row)
        };
        let mut total = self.solve_axis_once(board, first)?;
        total += self.solve_axis_once(board, second)?;
        total += self.solve(board)?;
        Ok(total)
    }

    fn solve_axis_once(&mut self, board: &mut Board, axis: Axis) -> Result<usize, SolveError> {
        let count = match axis {
            Axis::Row => board.height(),
            Axis::Column => board.width(),
        };
        let mut total = 0;
        for index in 0..count {
            total += self.update_line(board, axis, index)?.len();
        }
        Ok(total)
    }

    fn drain(&mut self, board: &mut Board, queue: Queue) -> Result<usize, SolveError> {
        let mut ignored = hashbrown::HashSet::new();
        let total = self.drain_tracking(board, queue, &mut ignored)?;
        if !self.contradiction_mode {
            board.set_solved(board.is_solved_full());
            board.solution_round_completed();
        }
        Ok(total)
    }

    fn drain_tracking(
        &mut self,
        board: &mut Board,
        mut queue: Queue,
        touched: &mut hashbrown::HashSet<Job>,
    ) -> Result<usize, SolveError> {
        let mut total_changed = 0usize;
        while let Some(((axis, index), (Reverse(OrderedFloat(priority)), _))) = queue.pop() {
            let changed = self.update_line(board, axis, index)?;
            if changed.is_empty() {
                continue;
            }
            let _ = touched.insert((axis, index));
            total_changed += changed.len();
            debug!("line {:?} {} changed {} cells", axis, index, changed.len());

            let next_priority = priority - 1.0;
            for other in changed {
                let (perp_axis, perp_index) = match axis {
                    Axis::Row => (Axis::Column, other),
                    Axis::Column => (Axis::Row, other),
                };
                let _ = queue.push_increase((perp_axis, perp_index), job_priority(perp_axis, next_priority));
                let _ = touched.insert((perp_axis, perp_index));
            }
        }
        info!("solution rate: {:.4}", board.solution_rate());
        Ok(total_changed)
    }

    fn update_line(&mut self, board: &mut Board, axis: Axis, index: usize) -> Result<Vec<usize>, SolveError> {
        let (clue, cells) = match axis {
            Axis::Row => (board.row_clue(index).clone(), board.get_row(index)),
            Axis::Column => (board.column_clue(index).clone(), board.get_column(index)),
        };

        let result = match self.cache.get(&clue, &cells) {
            Some(cached) => cached,
            None => {
                let computed = super::line::solve_line(self.method, &clue, &cells);
                self.cache.put(&clue, &cells, computed.clone());
                computed
            }
        };

        match result {
            Ok(new_cells) => {
                if new_cells == cells {
                    return Ok(Vec::new());
                }
                let changed = match axis {
                    Axis::Row => board.set_row(index, &new_cells),
                    Axis::Column => board.set_column(index, &new_cells),
                };
                Ok(changed)
            }
            Err(()) => Err(SolveError::Inconsistency { axis, index }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn u_letter() -> Board {
        Board::monochrome(
            vec![vec![1, 1], vec![1, 1], vec![3]],
            vec![vec![3], vec![1], vec![3]],
        )
        .unwrap()
    }

    #[test]
    fn solves_u_letter_fully() {
        let mut board = u_letter();
        let mut driver = PropagationDriver::new(super::super::Method::Fsm);
        driver.solve(&mut board).unwrap();
        assert!(board.is_solved_full());
        assert_eq!(board.solution_rate(), 1.0);
    }

    #[test]
    fn rows_first_and_columns_first_agree() {
        let mut rows_first_board = u_letter();
        let mut driver_a = PropagationDriver::new(super::super::Method::Fsm);
        driver_a.solve_round(&mut rows_first_board, true).unwrap();

        let mut columns_first_board = u_letter();
        let mut driver_b = PropagationDriver::new(super::super::Method::Fsm);
        driver_b.solve_round(&mut columns_first_board, false).unwrap();

        assert!(rows_first_board.is_solved_full());
        assert!(columns_first_board.is_solved_full());
    }

    #[test]
    fn inconsistency_only_visible_after_propagation() {
        use crate::block::{Block, Clue};

        // row forces "#.#" (totals match columns in aggregate), but column 0
        // claims to have no boxes at all (only line solving finds this)
        let rows = vec![Clue::new(vec![Block::mono(1), Block::mono(1)])];
        let cols = vec![Clue::empty(), Clue::new(vec![Block::mono(1)]), Clue::new(vec![Block::mono(1)])];
        let mut board = Board::new(rows, cols).unwrap();

        let mut driver = PropagationDriver::new(super::super::Method::Fsm);
        let err = driver.solve(&mut board).unwrap_err();
        assert!(matches!(err, SolveError::Inconsistency { .. }));
    }
}
