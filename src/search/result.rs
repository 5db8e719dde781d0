//! Search result types and statistics

use std::fmt;
use std::time::Duration;

/// A reached state together with the moves that reached it.
///
/// Each entry owns its path; extending it clones the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry<S, M> {
    pub state: S,
    pub path: Vec<M>,
}

impl<S, M: Copy> FrontierEntry<S, M> {
    pub fn root(state: S) -> Self {
        Self {
            state,
            path: Vec::new(),
        }
    }

    /// The entry one move further along.
    pub fn child(&self, state: S, mv: M) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(mv);
        Self { state, path }
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// The best solution one process found, or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionCandidate<S, M> {
    Found { state: S, path: Vec<M> },
    NotFound,
}

impl<S, M> SolutionCandidate<S, M> {
    pub fn is_found(&self) -> bool {
        matches!(self, SolutionCandidate::Found { .. })
    }

    pub fn path(&self) -> Option<&[M]> {
        match self {
            SolutionCandidate::Found { path, .. } => Some(path),
            SolutionCandidate::NotFound => None,
        }
    }

    pub fn path_len(&self) -> Option<usize> {
        self.path().map(<[M]>::len)
    }
}

impl<S, M> From<FrontierEntry<S, M>> for SolutionCandidate<S, M> {
    fn from(entry: FrontierEntry<S, M>) -> Self {
        SolutionCandidate::Found {
            state: entry.state,
            path: entry.path,
        }
    }
}

/// The answer every rank agrees on after aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalSolution<S, M> {
    Found { rank: usize, state: S, path: Vec<M> },
    NotFound,
}

impl<S, M> GlobalSolution<S, M> {
    pub fn is_found(&self) -> bool {
        matches!(self, GlobalSolution::Found { .. })
    }

    pub fn path(&self) -> Option<&[M]> {
        match self {
            GlobalSolution::Found { path, .. } => Some(path),
            GlobalSolution::NotFound => None,
        }
    }

    pub fn path_len(&self) -> Option<usize> {
        self.path().map(<[M]>::len)
    }
}

impl<S, M: fmt::Display> GlobalSolution<S, M> {
    /// Human-readable move listing.
    pub fn format_steps(&self) -> String {
        match self {
            GlobalSolution::Found { path, .. } if path.is_empty() => {
                "Already solved.\n".to_string()
            }
            GlobalSolution::Found { path, .. } => {
                let mut s = String::from("Solution Steps:\n");
                for (i, mv) in path.iter().enumerate() {
                    s.push_str(&format!("Step {}: {}\n", i + 1, mv));
                }
                s
            }
            GlobalSolution::NotFound => "No solution found.\n".to_string(),
        }
    }
}

/// Why a local search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// A solved state was dequeued.
    Solved,
    /// Every reachable state was expanded.
    Exhausted,
    /// Every state within the depth limit was expanded.
    DepthLimit,
    /// The wall-clock budget ran out.
    TimedOut,
    /// This rank had nothing to search.
    #[default]
    Idle,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Solved => write!(f, "solved"),
            Termination::Exhausted => write!(f, "exhausted"),
            Termination::DepthLimit => write!(f, "depth limit"),
            Termination::TimedOut => write!(f, "timed out"),
            Termination::Idle => write!(f, "idle"),
        }
    }
}

/// Statistics from one process's local search
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Why the search stopped
    pub termination: Termination,
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Number of worker threads used
    pub threads: usize,
    /// States popped and tested
    pub states_expanded: u64,
    /// States claimed in the visited set and pushed to the frontier
    pub states_enqueued: u64,
    /// Successors discarded because they were already claimed
    pub duplicates_discarded: u64,
    /// Deepest BFS level dequeued
    pub depth_reached: usize,
    /// States expanded by each worker
    pub per_worker_expanded: Vec<u64>,
}

impl SearchStatistics {
    pub fn idle() -> Self {
        Self::default()
    }

    /// States expanded per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.states_expanded as f64 / secs
        }
    }

    /// Share of generated successors that were duplicates (0.0 to 1.0)
    pub fn duplicate_rate(&self) -> f64 {
        let generated = self.states_enqueued + self.duplicates_discarded;
        if generated == 0 {
            0.0
        } else {
            self.duplicates_discarded as f64 / generated as f64
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Termination: {}\n", self.termination));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Threads: {}\n", self.threads));
        s.push_str(&format!("States expanded: {}\n", self.states_expanded));
        s.push_str(&format!("States enqueued: {}\n", self.states_enqueued));
        s.push_str(&format!(
            "Duplicates discarded: {} ({:.2}%)\n",
            self.duplicates_discarded,
            self.duplicate_rate() * 100.0
        ));
        s.push_str(&format!("Depth reached: {}\n", self.depth_reached));
        s.push_str(&format!("Throughput: {:.0} states/sec\n", self.throughput()));
        s
    }
}

/// Outcome of one process's worker pool.
#[derive(Debug, Clone)]
pub struct LocalResult<S, M> {
    pub candidate: SolutionCandidate<S, M>,
    pub statistics: SearchStatistics,
}

/// Outcome of a distributed search as seen from one rank.
#[derive(Debug, Clone)]
pub struct DistributedResult<S, M> {
    /// Identical on every rank.
    pub solution: GlobalSolution<S, M>,
    /// This rank's own candidate before aggregation.
    pub local_candidate: SolutionCandidate<S, M>,
    pub local_statistics: SearchStatistics,
    pub rank: usize,
    pub world_size: usize,
}
