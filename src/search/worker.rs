//! Worker pool for one process's breadth-first search
//!
//! Each worker loops: pop an entry, test it, expand it. Successors that win
//! their claim in the [`VisitedSet`] are pushed to the shared [`Frontier`].
//! The first solved state dequeued is recorded and every sibling is asked to
//! stop; otherwise the pool drains once the frontier reports exhaustion.

use crate::error::{PuzzleError, SolveError};
use crate::puzzle::Puzzle;
use crate::search::config::SearchConfig;
use crate::search::frontier::{Frontier, Pop};
use crate::search::result::{
    FrontierEntry, LocalResult, SearchStatistics, SolutionCandidate, Termination,
};
use crate::search::visited::VisitedSet;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How long an idle worker sleeps before re-checking the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// First-writer-wins slot for the process's solution.
struct SolutionSlot<S, M> {
    entry: OnceLock<FrontierEntry<S, M>>,
}

impl<S, M> SolutionSlot<S, M> {
    fn new() -> Self {
        Self {
            entry: OnceLock::new(),
        }
    }

    /// Record `entry` unless a solution is already recorded.
    fn try_record(&self, entry: FrontierEntry<S, M>) -> bool {
        self.entry.set(entry).is_ok()
    }

    fn into_candidate(self) -> SolutionCandidate<S, M> {
        match self.entry.into_inner() {
            Some(entry) => entry.into(),
            None => SolutionCandidate::NotFound,
        }
    }
}

/// State shared by every worker of one pool.
struct Pool<'a, P: Puzzle> {
    puzzle: &'a P,
    frontier: Frontier<P::State, P::Move>,
    visited: VisitedSet<P::State>,
    solution: SolutionSlot<P::State, P::Move>,
    config: &'a SearchConfig,
    deadline: Option<Instant>,
    timed_out: AtomicBool,
    depth_limited: AtomicBool,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTotals {
    expanded: u64,
    enqueued: u64,
    duplicates: u64,
    max_depth: usize,
}

/// Search from `initial` with a single process.
pub fn search_local<P: Puzzle>(
    puzzle: &P,
    initial: &P::State,
    config: &SearchConfig,
) -> Result<LocalResult<P::State, P::Move>, SolveError> {
    let visited = VisitedSet::new();
    visited.try_mark(initial);
    run_local_search(puzzle, vec![FrontierEntry::root(initial.clone())], visited, config)
}

/// Run the worker pool over `seeds`.
///
/// Every seed must already be marked in `visited`; seeds must share one depth.
pub fn run_local_search<P: Puzzle>(
    puzzle: &P,
    seeds: Vec<FrontierEntry<P::State, P::Move>>,
    visited: VisitedSet<P::State>,
    config: &SearchConfig,
) -> Result<LocalResult<P::State, P::Move>, SolveError> {
    let start_time = Instant::now();
    let num_threads = config.num_threads.max(1);

    if seeds.is_empty() {
        return Ok(LocalResult {
            candidate: SolutionCandidate::NotFound,
            statistics: SearchStatistics {
                threads: num_threads,
                ..SearchStatistics::idle()
            },
        });
    }

    let seed_count = seeds.len() as u64;
    let pool = Pool {
        puzzle,
        frontier: Frontier::new(seeds),
        visited,
        solution: SolutionSlot::new(),
        config,
        deadline: config.timeout.map(|t| start_time + t),
        timed_out: AtomicBool::new(false),
        depth_limited: AtomicBool::new(false),
    };

    log::debug!(
        "starting pool: {} threads, {} seeds at depth {}",
        num_threads,
        seed_count,
        pool.frontier.depth()
    );

    let outcomes: Vec<thread::Result<Result<WorkerTotals, PuzzleError>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..num_threads)
            .map(|worker_id| {
                let pool = &pool;
                scope.spawn(move || run_worker(worker_id, pool))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join()).collect()
    });

    let mut per_worker = Vec::with_capacity(num_threads);
    for outcome in outcomes {
        let totals = outcome.map_err(|_| SolveError::WorkerPanicked)??;
        per_worker.push(totals);
    }

    let timed_out = pool.timed_out.load(Ordering::SeqCst);
    let depth_limited = pool.depth_limited.load(Ordering::SeqCst);
    let candidate = pool.solution.into_candidate();

    let termination = if candidate.is_found() {
        Termination::Solved
    } else if timed_out {
        Termination::TimedOut
    } else if depth_limited {
        Termination::DepthLimit
    } else {
        Termination::Exhausted
    };

    let statistics = SearchStatistics {
        termination,
        elapsed_time: start_time.elapsed(),
        threads: num_threads,
        states_expanded: per_worker.iter().map(|t| t.expanded).sum(),
        states_enqueued: seed_count + per_worker.iter().map(|t| t.enqueued).sum::<u64>(),
        duplicates_discarded: per_worker.iter().map(|t| t.duplicates).sum(),
        depth_reached: per_worker.iter().map(|t| t.max_depth).max().unwrap_or(0),
        per_worker_expanded: per_worker.iter().map(|t| t.expanded).collect(),
    };

    if config.verbose {
        log::info!(
            "pool finished ({}): {} expanded, {} enqueued, depth {}",
            statistics.termination,
            statistics.states_expanded,
            statistics.states_enqueued,
            statistics.depth_reached
        );
    }

    Ok(LocalResult {
        candidate,
        statistics,
    })
}

fn run_worker<P: Puzzle>(
    worker_id: usize,
    pool: &Pool<'_, P>,
) -> Result<WorkerTotals, PuzzleError> {
    let mut totals = WorkerTotals::default();

    loop {
        if pool.deadline.is_some_and(|d| Instant::now() >= d) {
            if !pool.timed_out.swap(true, Ordering::SeqCst) {
                log::warn!("search budget exhausted, stopping workers");
            }
            pool.frontier.request_stop();
            break;
        }

        let (entry, in_flight) = match pool.frontier.wait_pop(POLL_INTERVAL) {
            Pop::Ready(entry, in_flight) => (entry, in_flight),
            Pop::Pending => continue,
            Pop::Exhausted | Pop::Stopped => break,
        };

        totals.expanded += 1;
        totals.max_depth = totals.max_depth.max(entry.depth());

        if pool.puzzle.is_solved(&entry.state) {
            let depth = entry.depth();
            if pool.solution.try_record(entry) {
                log::debug!("worker {} found a solution at depth {}", worker_id, depth);
            }
            pool.frontier.request_stop();
            break;
        }

        if !pool.config.may_expand(entry.depth()) {
            pool.depth_limited.store(true, Ordering::Relaxed);
            continue;
        }

        for mv in pool.puzzle.legal_moves(&entry.state) {
            let next = match pool.puzzle.apply(&entry.state, mv) {
                Ok(next) => next,
                Err(err) => {
                    pool.frontier.request_stop();
                    return Err(err);
                }
            };
            if pool.visited.try_mark(&next) {
                pool.frontier.push(entry.child(next, mv));
                totals.enqueued += 1;
            } else {
                totals.duplicates += 1;
            }
        }

        drop(in_flight);
    }

    if pool.config.verbose {
        log::debug!(
            "worker {} stopped after expanding {} states",
            worker_id,
            totals.expanded
        );
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{CubePuzzle, GraphPuzzle};

    #[test]
    fn test_already_solved_start() {
        let puzzle = CubePuzzle::new(3).unwrap();
        let config = SearchConfig::default().with_threads(4);
        let result = search_local(&puzzle, &puzzle.solved_state(), &config).unwrap();

        assert_eq!(result.candidate.path_len(), Some(0));
        assert_eq!(result.statistics.termination, Termination::Solved);
        assert_eq!(result.statistics.states_expanded, 1);
    }

    #[test]
    fn test_line_graph_shortest_path() {
        let graph = GraphPuzzle::line(12);
        for threads in [1, 2, 8] {
            let config = SearchConfig::default().with_threads(threads);
            let result = search_local(&graph, &0, &config).unwrap();
            assert_eq!(result.candidate.path_len(), Some(11), "threads = {}", threads);
        }
    }

    #[test]
    fn test_exhaustion_without_goal() {
        // Two disconnected cycles; the goal sits on the one we cannot reach.
        let graph = GraphPuzzle::new(
            vec![vec![1], vec![2], vec![0], vec![4], vec![3]],
            [4],
        );
        let config = SearchConfig::default().with_threads(3);
        let result = search_local(&graph, &0, &config).unwrap();

        assert_eq!(result.candidate, SolutionCandidate::NotFound);
        assert_eq!(result.statistics.termination, Termination::Exhausted);
        assert_eq!(result.statistics.states_enqueued, 3);
        assert_eq!(result.statistics.states_expanded, 3);
    }

    #[test]
    fn test_depth_limit() {
        let graph = GraphPuzzle::line(10);
        let config = SearchConfig::default().with_threads(2).with_max_depth(4);
        let result = search_local(&graph, &0, &config).unwrap();

        assert!(!result.candidate.is_found());
        assert_eq!(result.statistics.termination, Termination::DepthLimit);
        assert_eq!(result.statistics.depth_reached, 4);
    }

    #[test]
    fn test_timeout_stops_pool() {
        // A 4x4x4 cube scrambled deep enough that the budget runs out first.
        let puzzle = CubePuzzle::new(4).unwrap();
        let (start, _) = puzzle.random_scramble(30, 5);
        let config = SearchConfig::default()
            .with_threads(2)
            .with_timeout(Duration::from_millis(200));
        let result = search_local(&puzzle, &start, &config).unwrap();

        assert!(!result.candidate.is_found());
        assert_eq!(result.statistics.termination, Termination::TimedOut);
        assert!(result.statistics.elapsed_time < Duration::from_secs(10));
    }

    #[test]
    fn test_empty_seeds_idle() {
        let graph = GraphPuzzle::line(3);
        let config = SearchConfig::default().with_threads(2);
        let result = run_local_search(&graph, Vec::new(), VisitedSet::new(), &config).unwrap();
        assert_eq!(result.statistics.termination, Termination::Idle);
        assert!(!result.candidate.is_found());
    }

    #[test]
    fn test_per_worker_totals_add_up() {
        let graph = GraphPuzzle::line(30);
        let config = SearchConfig::default().with_threads(4);
        let result = search_local(&graph, &0, &config).unwrap();
        let stats = &result.statistics;
        assert_eq!(stats.per_worker_expanded.len(), 4);
        assert_eq!(stats.per_worker_expanded.iter().sum::<u64>(), stats.states_expanded);
    }
}
