// Engine error type
//
// Path searches never fail: an unreachable goal is an empty path. Errors are
// reserved for configuration problems and malformed caller state.

use thiserror::Error;

use crate::types::Coord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("grid must be at least 3x3 including the border, got {rows}x{cols}")]
    GridTooSmall { rows: i32, cols: i32 },

    #[error("grid of {rows}x{cols} exceeds the limit of {max} cells")]
    GridTooLarge { rows: i32, cols: i32, max: usize },

    /// Both dimensions odd: the interior has no Hamiltonian cycle
    #[error("hamiltonian cycle requires an even number of rows or columns, got {rows}x{cols}")]
    OddDimensions { rows: i32, cols: i32 },

    #[error("cycle construction needs a body of at least 3 cells, got {0}")]
    BodyTooShort(usize),

    #[error("longest path covered {covered} of {size} interior cells, no cycle built")]
    IncompleteCycle { covered: usize, size: usize },

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("cannot place food at {0:?}")]
    InvalidFood(Coord),
}
