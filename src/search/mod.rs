//! Concurrent breadth-first search within one process
//!
//! - [`visited`]: the claim-once set that keeps every state out of the
//!   frontier after its first discovery
//! - [`frontier`]: the shared level-ordered FIFO
//! - [`worker`]: the thread pool that drives the search
//! - [`result`]: candidates, solutions and statistics

pub mod config;
pub mod frontier;
pub mod result;
pub mod visited;
pub mod worker;

pub use config::SearchConfig;
pub use frontier::{Frontier, Pop};
pub use result::{
    DistributedResult, FrontierEntry, GlobalSolution, LocalResult, SearchStatistics,
    SolutionCandidate, Termination,
};
pub use visited::VisitedSet;
pub use worker::{run_local_search, search_local};
