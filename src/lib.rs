#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(unused_qualifications, unused_import_braces)]

pub mod block;
pub mod board;
pub(crate) mod cache;
pub mod cell;
pub mod error;
pub mod solver;

pub use block::{Block, Clue};
pub use board::{Board, Point};
pub use cell::{Cell, ColorId, Line};
pub use error::{Axis, SolveError};
pub use solver::probing::ContradictionSolver;
pub use solver::propagation::PropagationDriver;
pub use solver::Method;
