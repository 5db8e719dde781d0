//! Parallel and distributed breadth-first search for shortest cube solutions.
//!
//! - [`puzzle`]: the [`Puzzle`](puzzle::Puzzle) abstraction, the N×N×N cube
//!   and an explicit test graph
//! - [`search`]: one process's worker pool over a shared frontier and
//!   visited set
//! - [`distributed`]: partitioning across ranks and candidate election
//! - [`error`]: error types for every layer

pub mod distributed;
pub mod error;
pub mod puzzle;
pub mod search;

pub use distributed::{Communicator, LocalCluster, TcpCommunicator};
pub use error::{CodecError, CommError, ParseError, PuzzleError, SolveError};
pub use puzzle::{CubeMove, CubePuzzle, CubeState, GraphPuzzle, Puzzle};
pub use search::{GlobalSolution, SearchConfig, SearchStatistics, SolutionCandidate};
