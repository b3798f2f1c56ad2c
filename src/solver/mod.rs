//! Dispatch and drivers for line solving, propagation, and contradiction
//! probing.
//!
//! `Method` is a fixed tagged enum rather than a trait object: every variant
//! the line solver supports is known up front, so dispatch is a `match`
//! (see `line::solve_line`) instead of dynamic dispatch through a
//! `LineSolver` trait. `Bgu`/`Efficient`/their color-aware counterparts all
//! resolve to the same `fsm` implementation (the unified `Cell` bitmask
//! already handles monochrome and colored lines identically, so there is no
//! separate color-specific code path left to name differently). `Blot`/
//! `BlotColor` are kept as distinct tags for interface stability but, absent
//! a concretely grounded blotted-block algorithm, also resolve to `fsm` for
//! now (blotted lengths are not yet modeled as variable-size blocks).

pub mod line;
pub mod probing;
pub mod propagation;

/// Which line-solving technique to run. Interchangeable at the line-solver
/// boundary: every variant obeys the same soundness contract, they differ
/// only in how much of that contract they can prove per call.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Method {
    /// Leftmost/rightmost justification. Fast, incomplete.
    Overlap,
    /// Full forward/backward reachability. Complete for a single line.
    Fsm,
    Bgu,
    Efficient,
    BguColor,
    EfficientColor,
    Blot,
    BlotColor,
}

impl Default for Method {
    fn default() -> Self {
        Self::Fsm
    }
}
