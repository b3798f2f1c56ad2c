//! Contradiction ("probing") solving: pick an unsolved cell, try each
//! remaining candidate color under a snapshot, and keep only the ones that
//! don't immediately propagate to a contradiction.
//!
//! Grounded on `pyngrm/core/solve/contradiction_solver.py`'s priority
//! queue of unsolved points (weighted by neighbour count and row/column
//! solution rate), generalized from a single Boolean assumption-flip to
//! per-color probing over the unified `Cell` bitmask: instead of trying
//! "is this cell black or white", `probe` iterates `cell.colors()`.

use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashMap;
use log::{info, warn};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::board::{Board, Point};
use crate::cell::ColorId;
use crate::error::SolveError;

use super::propagation::PropagationDriver;
use super::Method;

type OrderedPoints = PriorityQueue<Point, OrderedFloat<f64>, DefaultHashBuilder>;

/// Per `(point, color)` assumption: how many cells that assumption's
/// propagation settled, paired with the priority it was tried at.
pub type Impact = HashMap<(Point, ColorId), (usize, f64)>;

const PRIORITY_NEIGHBOURS_OF_NEWLY_SOLVED: f64 = 10.0;
const PRIORITY_NEIGHBOURS_OF_CONTRADICTION: f64 = 20.0;

#[derive(Debug)]
pub struct ContradictionSolver {
    method: Method,
}

impl ContradictionSolver {
    pub fn new(method: Method) -> Self {
        Self { method }
    }

    /// Probe every unsolved cell, refuting the colors that lead to a
    /// contradiction, until either the board is fully solved or a full pass
    /// over the queue refutes nothing.
    pub fn run(&self, board: &mut Board) -> Result<Impact, SolveError> {
        let mut probes = self.unsolved_cells(board);
        self.run_from(board, &mut probes)
    }

    /// Same as `run`, but seeded from a single point instead of the whole
    /// board (cheaper resumption after an external cell edit).
    pub fn run_from_point(&self, board: &mut Board, point: Point) -> Result<Impact, SolveError> {
        let mut probes = OrderedPoints::with_default_hasher();
        probes.push(point, OrderedFloat(0.0));
        self.run_from(board, &mut probes)
    }

    fn unsolved_cells(&self, board: &Board) -> OrderedPoints {
        let mut queue = OrderedPoints::with_default_hasher();
        for y in 0..board.height() {
            for x in 0..board.width() {
                let point = Point::new(x, y);
                if board.cell(point).is_solved() {
                    continue;
                }
                let unsolved_neighbours = self.unsolved_neighbour_count(board, point) as f64;
                let row_rate = board.row_solution_rate(point.y);
                let column_rate = board.column_solution_rate(point.x);
                let priority = row_rate + column_rate - unsolved_neighbours + 4.0;
                queue.push(point, OrderedFloat(priority));
            }
        }
        queue
    }

    fn unsolved_neighbour_count(&self, board: &Board, point: Point) -> usize {
        self.neighbours(board, point)
            .filter(|&p| !board.cell(p).is_solved())
            .count()
    }

    fn neighbours(&self, board: &Board, point: Point) -> impl Iterator<Item = Point> + '_ {
        let height = board.height();
        let width = board.width();
        let x = point.x;
        let y = point.y;
        [
            (x > 0).then(|| Point::new(x - 1, y)),
            (x + 1 < width).then(|| Point::new(x + 1, y)),
            (y > 0).then(|| Point::new(x, y - 1)),
            (y + 1 < height).then(|| Point::new(x, y + 1)),
        ]
        .iter()
        .copied()
        .flatten()
    }

    fn run_from(&self, board: &mut Board, probes: &mut OrderedPoints) -> Result<Impact, SolveError> {
        let mut contradictions_found = 0u32;

        let impact = loop {
            let mut impact = HashMap::new();

            if board.is_solved_full() {
                break impact;
            }

            let mut refuted: Option<(Point, Vec<ColorId>)> = None;

            while let Some((point, priority)) = probes.pop() {
                if board.cell(point).is_solved() {
                    continue;
                }

                let outcomes = self.probe(board, point)?;
                let (bad, good): (Vec<_>, Vec<_>) = outcomes
                    .into_iter()
                    .partition(|(_, settled)| settled.is_none());

                if !bad.is_empty() {
                    refuted = Some((point, bad.into_iter().map(|(color, _)| color).collect()));
                    break;
                }

                for (color, settled) in good {
                    if let Some(settled_count) = settled {
                        let _ = impact.insert((point, color), (settled_count, priority.0));
                    }
                }
            }

            if let Some((point, bad_colors)) = refuted {
                contradictions_found += 1;
                let mut cell = board.cell(point);
                for color in bad_colors {
                    cell = cell.without(color).ok_or(SolveError::Inconsistency {
                        axis: crate::error::Axis::Row,
                        index: point.y,
                    })?;
                }
                board.set_cell(point, cell);
                board.record_solution_if_complete();

                let mut driver = PropagationDriver::new(self.method);
                driver.set_contradiction_mode(true);
                let touched = driver.solve_point(board, point)?;
                board.record_solution_if_complete();

                for new_point in &touched {
                    for neighbour in self.neighbours(board, *new_point) {
                        if !board.cell(neighbour).is_solved() {
                            let _ = probes.push_increase(
                                neighbour,
                                OrderedFloat(PRIORITY_NEIGHBOURS_OF_NEWLY_SOLVED),
                            );
                        }
                    }
                }
                for neighbour in self.neighbours(board, point) {
                    if !board.cell(neighbour).is_solved() {
                        let _ = probes.push_increase(
                            neighbour,
                            OrderedFloat(PRIORITY_NEIGHBOURS_OF_CONTRADICTION),
                        );
                    }
                }

                info!("solution rate: {:.4}", board.solution_rate());
            } else {
                break impact;
            }
        };

        if contradictions_found > 0 {
            warn!("contradictions refuted: {}", contradictions_found);
        }
        Ok(impact)
    }

    /// Try every remaining candidate color for `point` under a snapshot.
    /// `None` means that color immediately propagates to a contradiction;
    /// `Some(n)` means it propagates and settles `n` other cells.
    fn probe(&self, board: &mut Board, point: Point) -> Result<HashMap<ColorId, Option<usize>>, SolveError> {
        let mut outcomes = HashMap::new();
        let candidates: Vec<ColorId> = board.cell(point).colors().collect();

        for color in candidates {
            let snapshot = board.snapshot();
            board.set_cell(point, crate::cell::Cell::singleton(color));

            let mut driver = PropagationDriver::new(self.method);
            driver.set_contradiction_mode(true);
            let result = driver.solve_point(board, point);
            board.restore(snapshot);

            match result {
                Ok(settled) => {
                    let _ = outcomes.insert(color, Some(settled.len()));
                }
                Err(SolveError::Inconsistency { .. }) => {
                    let _ = outcomes.insert(color, None);
                }
                Err(other) => return Err(other),
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, Clue};

    #[test]
    fn solves_a_board_line_propagation_already_closes() {
        let rows = vec![
            Clue::new(vec![Block::mono(1), Block::mono(1)]),
            Clue::new(vec![Block::mono(1), Block::mono(1)]),
            Clue::new(vec![Block::mono(3)]),
        ];
        let cols = vec![
            Clue::new(vec![Block::mono(3)]),
            Clue::new(vec![Block::mono(1)]),
            Clue::new(vec![Block::mono(3)]),
        ];
        let mut board = Board::new(rows, cols).unwrap();

        let solver = ContradictionSolver::new(Method::Fsm);
        solver.run(&mut board).unwrap();

        assert!(board.is_solved_full());
        assert_eq!(board.solution_rate(), 1.0);
    }


    #[test]
    fn already_solved_board_is_a_no_op() {
        let rows = vec![Clue::empty()];
        let cols = vec![Clue::empty()];
        let mut board = Board::new(rows, cols).unwrap();
        let mut driver = PropagationDriver::new(Method::Fsm);
        driver.solve(&mut board).unwrap();
        assert!(board.is_solved_full());

        let solver = ContradictionSolver::new(Method::Fsm);
        let impact = solver.run(&mut board).unwrap();
        assert!(impact.is_empty());
    }
}
