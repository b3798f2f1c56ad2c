//! Single-line solving: given a clue and a partially known line, compute the
//! tightest sound refinement of every cell.
//!
//! `fsm::solve` is a single backward-recursive reachability DP, memoized
//! over `(position, blocks placed)`, that evaluates *both* the "blank here"
//! and "block-color here" transitions at every state (`fill_blank(...) |
//! fill_color(...)`, deliberately not short-circuited) so every color that
//! appears in *any* valid arrangement gets OR'd into the accumulator (the
//! union-over-all-placements completeness that makes this the strongest
//! sound refinement obtainable from the clue and line length alone).
//! `overlap::solve` is the classic leftmost/rightmost-justification method,
//! grounded on the same partial-sum packing logic as `Clue::partial_sums`,
//! an incomplete but much cheaper warm-up pass the propagation driver can
//! run before reaching for `fsm`.

use crate::block::Clue;
use crate::cell::{Cell, Line};

/// Solve a line to the limit of what `method` can prove, or `Err(())` if no
/// arrangement of `clue` is consistent with `cells` (the contradiction
/// signal; the caller attaches axis/index).
pub fn solve_line(method: super::Method, clue: &Clue, cells: &[Cell]) -> Result<Line, ()> {
    match method {
        super::Method::Overlap => overlap::solve(clue, cells),
        super::Method::Fsm
        | super::Method::Bgu
        | super::Method::Efficient
        | super::Method::BguColor
        | super::Method::EfficientColor
        | super::Method::Blot
        | super::Method::BlotColor => fsm::solve(clue, cells),
    }
}

pub mod fsm {
    use super::{Cell, Clue, Line};

    /// `block_floor[j]` is the minimal index (0-based, inclusive) at which
    /// the first `j` blocks can possibly finish.
    struct Solver<'a> {
        clue: &'a Clue,
        cells: &'a [Cell],
        block_floor: Vec<isize>,
        memo: Vec<Option<bool>>,
        accumulated: Vec<u32>,
        k: usize,
    }

    pub fn solve(clue: &Clue, cells: &[Cell]) -> Result<Line, ()> {
        if cells.is_empty() {
            return if clue.is_empty() { Ok(Line::new()) } else { Err(()) };
        }

        let k = clue.blocks.len();
        let mut block_floor: Vec<isize> = vec![0; k + 1];
        for (j, &sum) in clue.partial_sums().iter().enumerate() {
            block_floor[j + 1] = sum as isize - 1;
        }

        let mut solver = Solver {
            clue,
            cells,
            block_floor,
            memo: vec![None; (cells.len() + 1) * (k + 1)],
            accumulated: vec![0; cells.len()],
            k,
        };

        let last = cells.len() as isize - 1;
        if solver.reachable(last, k) {
            let refined: Option<Line> = solver
                .accumulated
                .iter()
                .zip(cells.iter())
                .map(|(&bits, &original)| original.intersect(Cell::from_bits(bits)))
                .collect();
            refined.ok_or(())
        } else {
            Err(())
        }
    }

    impl<'a> Solver<'a> {
        fn memo_index(&self, position: isize, block: usize) -> usize {
            ((position + 1) as usize) * (self.k + 1) + block
        }

        fn reachable(&mut self, position: isize, block: usize) -> bool {
            if position < 0 {
                return block == 0;
            }
            let idx = self.memo_index(position, block);
            if let Some(cached) = self.memo[idx] {
                return cached;
            }
            let result = self.fill(position, block);
            self.memo[idx] = Some(result);
            result
        }

        fn fill(&mut self, position: isize, block: usize) -> bool {
            if position < self.block_floor[block] {
                return false;
            }
            // deliberately not short-circuited
            let blank = self.fill_blank(position, block);
            let colored = self.fill_color(position, block);
            blank | colored
        }

        fn color_at(&self, position: isize) -> Cell {
            self.cells[position as usize]
        }

        fn mark(&mut self, position: isize, bit: u32) {
            self.accumulated[position as usize] |= bit;
        }

        fn fill_blank(&mut self, position: isize, block: usize) -> bool {
            if !self.color_at(position).can_be_space() {
                return false;
            }
            if self.reachable(position - 1, block) {
                self.mark(position, crate::cell::SPACE);
                true
            } else {
                false
            }
        }

        fn needs_trailing_gap(&self, block: usize) -> bool {
            if block == self.clue.blocks.len() {
                return false;
            }
            block > 0 && self.clue.blocks[block - 1].color() == self.clue.blocks[block].color()
        }

        fn fill_color(&mut self, position: isize, block: usize) -> bool {
            if block == 0 {
                return false;
            }
            let current = self.clue.blocks[block - 1];
            let color = current.color();
            let mut size = current.size() as isize;
            let trailing_gap = self.needs_trailing_gap(block);
            if trailing_gap {
                size += 1;
            }

            let start = position - size + 1;
            if start < 0 {
                return false;
            }

            let run_end = if trailing_gap { position - 1 } else { position };
            if trailing_gap && !self.color_at(position).can_be_space() {
                return false;
            }
            if !(start..=run_end).all(|p| self.color_at(p).contains(color)) {
                return false;
            }

            if self.reachable(start - 1, block - 1) {
                if trailing_gap {
                    self.mark(position, crate::cell::SPACE);
                }
                for p in start..=run_end {
                    self.mark(p, color);
                }
                true
            } else {
                false
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::solve;
        use crate::block::{Block, Clue};
        use crate::cell::{Cell, Line, BOX, SPACE};

        fn mono(sizes: &[usize]) -> Clue {
            Clue::new(sizes.iter().map(|&s| Block::mono(s)).collect())
        }

        fn line(symbols: &str) -> Line {
            symbols
                .chars()
                .map(|c| match c {
                    '.' => Cell::blank(),
                    '#' => Cell::filled(),
                    '?' => Cell::unknown(&[SPACE, BOX]),
                    _ => panic!("bad symbol {}", c),
                })
                .collect()
        }

        fn expect(sizes: &[usize], input: &str, output: &str) {
            let result = solve(&mono(sizes), &line(input)).unwrap();
            assert_eq!(result, line(output));
        }

        #[test]
        fn empty_clue_forces_space() {
            expect(&[], "???", "...");
        }

        #[test]
        fn single_block_fills_unknown() {
            expect(&[3], "???", "###");
        }

        #[test]
        fn overlap_forces_middle() {
            expect(&[2], "???", "?#?");
        }

        #[test]
        fn respects_known_space() {
            expect(&[2], ".??", ".##");
        }

        #[test]
        fn two_blocks_overlap() {
            expect(&[4, 2], "????????", "???#????");
        }

        #[test]
        fn already_solved_consistent_is_unchanged() {
            expect(&[1, 1], "#.#", "#.#");
        }

        #[test]
        fn already_solved_inconsistent_errors() {
            let result = solve(&mono(&[1]), &line("##"));
            assert!(result.is_err());
        }

        #[test]
        fn infeasible_within_capacity_errors() {
            let result = solve(&mono(&[3]), &line(".##"));
            assert!(result.is_err());
        }

        #[test]
        fn idempotent() {
            let clue = mono(&[1, 1, 5]);
            let input = line("...#..?????....?????#?");
            let once = solve(&clue, &input).unwrap();
            let twice = solve(&clue, &once).unwrap();
            assert_eq!(once, twice);
        }

        #[test]
        fn colored_two_blocks_distinct_colors() {
            let clue = Clue::new(vec![Block::new(1, 4), Block::new(1, 8)]);
            let all = Cell::unknown(&[1, 4, 8]);
            let result = solve(&clue, &[all, all]).unwrap();
            let expected: Line = vec![Cell::singleton(4), Cell::singleton(8)].into();
            assert_eq!(result, expected);
        }

        #[test]
        fn colored_same_color_needs_gap() {
            let clue = Clue::new(vec![Block::new(1, 4), Block::new(1, 4)]);
            let all = Cell::unknown(&[1, 4]);
            let result = solve(&clue, &[all, all, all]).unwrap();
            let expected: Line = vec![Cell::singleton(4), Cell::singleton(1), Cell::singleton(4)].into();
            assert_eq!(result, expected);
        }
    }
}

pub mod overlap {
    use super::{Cell, Clue, Line};
    use crate::block::Block;

    /// Leftmost/rightmost justification: every cell covered by a block's
    /// position range under *both* the earliest-possible and
    /// latest-possible packing must be that block's color in every valid
    /// arrangement.
    pub fn solve(clue: &Clue, cells: &[Cell]) -> Result<Line, ()> {
        if clue.is_empty() {
            return Ok(cells.iter().copied().collect());
        }

        let n = cells.len();
        let leftmost = earliest_starts(&clue.blocks);
        let rightmost = latest_starts(&clue.blocks, n);

        let mut refined: Line = cells.iter().copied().collect();
        for (i, block) in clue.blocks.iter().enumerate() {
            let (Some(l), Some(r)) = (leftmost[i], rightmost[i]) else {
                continue;
            };
            let forced_start = r.max(l);
            let forced_end = (l + block.size()).min(r + block.size());
            if forced_start >= forced_end {
                continue;
            }
            let singleton = Cell::singleton(block.color());
            for cell in refined.iter_mut().take(forced_end).skip(forced_start) {
                *cell = cell.intersect(singleton).ok_or(())?;
            }
        }
        Ok(refined)
    }

    /// Earliest start index for each block, packing greedily from the left.
    fn earliest_starts(blocks: &[Block]) -> Vec<Option<usize>> {
        let mut starts = Vec::with_capacity(blocks.len());
        let mut cursor = 0usize;
        let mut prev: Option<Block> = None;
        for &block in blocks {
            if let Some(p) = prev {
                if p.color() == block.color() {
                    cursor += 1;
                }
            }
            starts.push(Some(cursor));
            cursor += block.size();
            prev = Some(block);
        }
        starts
    }

    /// Latest start index for each block, packing greedily from the right.
    fn latest_starts(blocks: &[Block], len: usize) -> Vec<Option<usize>> {
        let reversed: Vec<Block> = blocks.iter().rev().copied().collect();
        let from_right_end = earliest_starts(&reversed);
        let n = blocks.len();
        (0..n)
            .map(|i| {
                let rev_i = n - 1 - i;
                from_right_end[rev_i].and_then(|end_from_right| {
                    let end_exclusive = end_from_right + blocks[i].size();
                    len.checked_sub(end_exclusive)
                })
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::solve;
        use crate::block::{Block, Clue};
        use crate::cell::{Cell, Line, BOX, SPACE};

        fn mono(sizes: &[usize]) -> Clue {
            Clue::new(sizes.iter().map(|&s| Block::mono(s)).collect())
        }

        fn unknown_line(n: usize) -> Line {
            vec![Cell::unknown(&[SPACE, BOX]); n].into()
        }

        #[test]
        fn forces_guaranteed_overlap() {
            let result = solve(&mono(&[2]), &unknown_line(3)).unwrap();
            assert_eq!(result[1], Cell::filled());
        }

        #[test]
        fn no_overlap_leaves_cells_unknown() {
            let result = solve(&mono(&[1]), &unknown_line(3)).unwrap();
            assert!(result.iter().all(|c| !c.is_solved()));
        }

        #[test]
        fn empty_clue_is_a_no_op() {
            let input = unknown_line(3);
            let result = solve(&mono(&[]), &input).unwrap();
            assert_eq!(result, input);
        }
    }
}
