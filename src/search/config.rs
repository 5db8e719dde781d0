//! Configuration for a local search.

use std::time::Duration;

/// Configuration for one process's worker pool.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of worker threads to spawn.
    pub num_threads: usize,
    /// Wall-clock budget; when exceeded the pool is asked to stop.
    pub timeout: Option<Duration>,
    /// Do not expand states at this depth or deeper.
    pub max_depth: Option<usize>,
    /// Log level advances and per-worker totals.
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            timeout: None,
            max_depth: None,
            verbose: false,
        }
    }
}

impl SearchConfig {
    /// Set the number of worker threads (at least one).
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    /// Set the wall-clock budget for the pool.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set or clear the wall-clock budget.
    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop expanding states at `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set or clear the depth limit.
    pub fn with_max_depth_option(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable verbose logging of level advances and worker totals.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// True if states at `depth` may still be expanded.
    pub fn may_expand(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}
