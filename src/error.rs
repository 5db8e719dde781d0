//! Error types for every layer of the solver.
//!
//! Exhausting the search space is not an error; it is reported as
//! [`GlobalSolution::NotFound`](crate::search::GlobalSolution).

use thiserror::Error;

/// Failures raised by a puzzle's move model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// A move id outside `[0, move_count)`.
    #[error("invalid move id {id}: expected a value in 0..{move_count}")]
    InvalidMove { id: u32, move_count: u32 },
    /// A state whose shape does not belong to the puzzle it was applied to.
    #[error("state does not match puzzle: {0}")]
    ShapeMismatch(String),
}

/// Failures while reading a cube description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported cube size {0} (expected 1..=16)")]
    UnsupportedSize(usize),
    #[error("unknown colour '{token}' on line {line}")]
    UnknownColor { token: String, line: usize },
    #[error("line {line}: expected {expected} colours, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} rows of colours, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("invalid move '{0}' in scramble")]
    BadMove(String),
}

/// Failures while encoding or decoding a candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("record marked not-found carries a path of length {0}")]
    PathWithoutSolution(usize),
}

/// Failures of the inter-process transport. Always fatal for the run.
#[derive(Debug, Error)]
pub enum CommError {
    #[error("rank {rank} is out of range for a world of {size}")]
    BadRank { rank: usize, size: usize },
    #[error("no route from rank {from} to rank {to}")]
    NoRoute { from: usize, to: usize },
    #[error("peer rank {0} disconnected")]
    Disconnected(usize),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("frame of {0} bytes exceeds the transport limit")]
    FrameTooLarge(usize),
    #[error("broadcast root {0} supplied no payload")]
    MissingPayload(usize),
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error returned by a solve run.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Comm(#[from] CommError),
    #[error("rank {rank} reported a path that does not solve the cube")]
    InvalidCandidate { rank: usize },
    #[error("worker thread panicked")]
    WorkerPanicked,
}
