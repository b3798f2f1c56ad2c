//! Clues: ordered sequences of blocks describing one row or column.
//!
//! Generalizes the split `Block`/`Description` trait and its two
//! implementors (a binary block type, a colored block type) into one
//! concrete `Block`/`Clue` pair, since the unified `Cell` bitmask (see
//! `crate::cell`) no longer needs a trait to abstract over monochrome vs.
//! colored: a monochrome block is simply a `Block` colored `BOX`.

use std::fmt;

use crate::cell::{ColorId, BOX};

/// One contiguous run of filled cells of a single color.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Block {
    size: usize,
    color: ColorId,
}

impl Block {
    pub const fn new(size: usize, color: ColorId) -> Self {
        Self { size, color }
    }

    /// A monochrome block (always `BOX`-colored).
    pub const fn mono(size: usize) -> Self {
        Self::new(size, BOX)
    }

    pub const fn size(self) -> usize {
        self.size
    }

    pub const fn color(self) -> ColorId {
        self.color
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.size)
    }
}

/// An ordered list of blocks describing one row or column. An empty clue
/// means the whole line is blank.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct Clue {
    pub blocks: Vec<Block>,
}

impl Clue {
    pub fn new(blocks: Vec<Block>) -> Self {
        // zero-length blocks carry no information and would otherwise
        // shift the mandatory-gap arithmetic in `partial_sums`
        Self {
            blocks: blocks.into_iter().filter(|b| b.size > 0).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// For each prefix of blocks, the minimal number of cells needed to
    /// place that prefix packed as tightly as legal (one mandatory gap
    /// between same-colored neighbors, zero between different colors).
    /// Ported from `block::multicolor::ColoredBlock::partial_sums`.
    pub fn partial_sums(&self) -> Vec<usize> {
        let mut sums = Vec::with_capacity(self.blocks.len());
        let mut prev: Option<Block> = None;
        for &block in &self.blocks {
            let current = match prev {
                Some(p) => {
                    let sum = p.size() + block.size();
                    if p.color() == block.color() {
                        sum + 1
                    } else {
                        sum
                    }
                }
                None => block.size(),
            };
            sums.push(current);
            prev = Some(Block::new(current, block.color()));
        }
        sums
    }

    /// Minimum number of cells this clue needs to fit in a line.
    pub fn min_length(&self) -> usize {
        self.partial_sums().last().copied().unwrap_or(0)
    }

    /// Total filled cells, grouped by color (for `ClueMismatch` checks).
    pub fn totals_by_color(&self) -> hashbrown::HashMap<ColorId, usize> {
        let mut totals = hashbrown::HashMap::new();
        for block in &self.blocks {
            *totals.entry(block.color()).or_insert(0) += block.size();
        }
        totals
    }

    pub fn colors(&self) -> impl Iterator<Item = ColorId> + '_ {
        self.blocks.iter().map(|b| b.color())
    }
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self.blocks.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

pub mod palette {
    //! A minimal name -> `ColorId` palette for mapping a human-readable
    //! color name to its bitmask id. Rendering concerns (rgb value, display
    //! symbol) are out of scope here; only the stable id assignment
    //! survives, using the same "next power of two" allocation scheme a
    //! bitmask-backed color palette needs regardless of language.

    use super::ColorId;
    use hashbrown::HashMap;

    pub const SPACE_ID: ColorId = crate::cell::SPACE;
    pub const BOX_ID: ColorId = crate::cell::BOX;

    #[derive(Debug, Clone)]
    pub struct ColorPalette {
        ids: HashMap<String, ColorId>,
        default_color: Option<String>,
    }

    impl Default for ColorPalette {
        fn default() -> Self {
            let mut ids = HashMap::new();
            let _ = ids.insert("white".to_string(), SPACE_ID);
            Self {
                ids,
                default_color: None,
            }
        }
    }

    impl ColorPalette {
        /// A two-color (SPACE/BOX) palette for monochrome boards.
        pub fn monochrome(white_name: &str, black_name: &str) -> Self {
            let mut this = Self::default();
            let _ = this.ids.remove("white");
            let _ = this.ids.insert(white_name.to_string(), SPACE_ID);
            let _ = this.ids.insert(black_name.to_string(), BOX_ID);
            this.default_color = Some(black_name.to_string());
            this
        }

        /// Register a new color, assigning it the next free bit.
        pub fn add(&mut self, name: &str) -> ColorId {
            if let Some(&id) = self.ids.get(name) {
                return id;
            }
            let max = self.ids.values().copied().max().unwrap_or(0);
            let id = if max == 0 { SPACE_ID } else { max * 2 };
            let _ = self.ids.insert(name.to_string(), id);
            id
        }

        pub fn id_by_name(&self, name: &str) -> Option<ColorId> {
            self.ids.get(name).copied()
        }

        pub fn set_default(&mut self, name: &str) -> bool {
            if self.ids.contains_key(name) {
                self.default_color = Some(name.to_string());
                true
            } else {
                false
            }
        }

        pub fn get_default(&self) -> Option<String> {
            self.default_color.clone()
        }

        pub fn all_ids(&self) -> Vec<ColorId> {
            let mut ids: Vec<_> = self.ids.values().copied().collect();
            ids.sort_unstable();
            ids
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sums_empty() {
        let c = Clue::new(vec![]);
        assert_eq!(c.partial_sums(), Vec::<usize>::new());
    }

    #[test]
    fn partial_sums_single() {
        let c = Clue::new(vec![Block::mono(5)]);
        assert_eq!(c.partial_sums(), vec![5]);
    }

    #[test]
    fn partial_sums_same_color_needs_gap() {
        let c = Clue::new(vec![Block::mono(1), Block::mono(2), Block::mono(3)]);
        assert_eq!(c.partial_sums(), vec![1, 4, 8]);
    }

    #[test]
    fn partial_sums_different_colors_can_touch() {
        let c = Clue::new(vec![
            Block::new(1, 1 << 1),
            Block::new(2, 1 << 1),
            Block::new(3, 1 << 2),
        ]);
        assert_eq!(c.partial_sums(), vec![1, 4, 7]);
    }

    #[test]
    fn min_length_matches_last_partial_sum() {
        let c = Clue::new(vec![Block::mono(2), Block::mono(2)]);
        assert_eq!(c.min_length(), 5);
    }

    #[test]
    fn palette_assigns_increasing_powers_of_two() {
        let mut p = palette::ColorPalette::default();
        let r = p.add("red");
        let g = p.add("green");
        assert_eq!(r, 2);
        assert_eq!(g, 4);
        assert_eq!(p.id_by_name("white"), Some(1));
    }
}
