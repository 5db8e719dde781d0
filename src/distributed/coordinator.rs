//! Distributed search coordinator.
//!
//! Ranks split the root's first-level expansions round-robin and search
//! their slices independently. When every local pool has stopped, each
//! non-root rank sends its candidate to rank 0, which elects the shortest
//! (lowest rank on ties), verifies it by replaying the moves, and broadcasts
//! the winner so every rank returns the same answer.

use crate::distributed::codec::CandidateRecord;
use crate::distributed::comm::{Communicator, LocalCluster};
use crate::error::{PuzzleError, SolveError};
use crate::puzzle::Puzzle;
use crate::search::config::SearchConfig;
use crate::search::result::{
    DistributedResult, FrontierEntry, GlobalSolution, LocalResult, SearchStatistics,
    SolutionCandidate, Termination,
};
use crate::search::visited::VisitedSet;
use crate::search::worker::run_local_search;
use std::thread;
use std::time::Instant;

/// Rank that collects candidates and broadcasts the winner.
pub const ROOT_RANK: usize = 0;

/// The first-level entries owned by `rank` in a world of `size`.
///
/// Expansion `i` of the root belongs to rank `i % size`.
pub fn partition<P: Puzzle>(
    puzzle: &P,
    root: &P::State,
    rank: usize,
    size: usize,
) -> Result<Vec<FrontierEntry<P::State, P::Move>>, PuzzleError> {
    let size = size.max(1);
    let root_entry = FrontierEntry::root(root.clone());
    puzzle
        .legal_moves(root)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % size == rank)
        .map(|(_, mv)| Ok(root_entry.child(puzzle.apply(root, mv)?, mv)))
        .collect()
}

/// Pick the winning candidate: shortest path, then lowest rank.
///
/// Returns the index into `candidates`, or `None` if nobody found one.
pub fn aggregate<S, M>(candidates: &[(usize, SolutionCandidate<S, M>)]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, (rank, candidate))| candidate.path_len().map(|len| (len, *rank, i)))
        .min()
        .map(|(_, _, i)| i)
}

/// Run one rank of a distributed search.
///
/// Every rank must call this with the same puzzle, initial state and world.
/// All ranks return the same [`GlobalSolution`].
pub fn search<P: Puzzle, C: Communicator>(
    puzzle: &P,
    initial: &P::State,
    config: &SearchConfig,
    comm: &mut C,
) -> Result<DistributedResult<P::State, P::Move>, SolveError> {
    let rank = comm.rank();
    let world_size = comm.size();

    let local = if puzzle.is_solved(initial) {
        solved_at_root(initial, rank, config)
    } else {
        let (seeds, visited) = local_slice(puzzle, initial, rank, world_size)?;
        if config.verbose {
            log::info!("rank {}/{} searching {} seeds", rank, world_size, seeds.len());
        }
        run_local_search(puzzle, seeds, visited, config)?
    };

    let solution = if rank == ROOT_RANK {
        collect_and_elect(puzzle, initial, &local.candidate, comm)?
    } else {
        let record = to_record(puzzle, rank, local.candidate.path())?;
        comm.send(ROOT_RANK, &record.encode()?)?;
        let winner = CandidateRecord::decode(&comm.broadcast(ROOT_RANK, None)?)?;
        replay(puzzle, initial, &winner)?
    };

    if config.verbose {
        match solution.path_len() {
            Some(len) => log::info!("rank {} agrees on a {}-move solution", rank, len),
            None => log::info!("rank {} agrees no solution was found", rank),
        }
    }

    Ok(DistributedResult {
        solution,
        local_candidate: local.candidate,
        local_statistics: local.statistics,
        rank,
        world_size,
    })
}

/// Run `processes` ranks on threads in this process and return rank 0's view.
pub fn solve_local_cluster<P: Puzzle>(
    puzzle: &P,
    initial: &P::State,
    config: &SearchConfig,
    processes: usize,
) -> Result<DistributedResult<P::State, P::Move>, SolveError> {
    let mut results = run_local_cluster(puzzle, initial, config, processes)?;
    Ok(results.swap_remove(ROOT_RANK))
}

/// Run `processes` ranks on threads and return every rank's result, by rank.
pub fn run_local_cluster<P: Puzzle>(
    puzzle: &P,
    initial: &P::State,
    config: &SearchConfig,
    processes: usize,
) -> Result<Vec<DistributedResult<P::State, P::Move>>, SolveError> {
    let cluster = LocalCluster::new(processes);

    let outcomes: Vec<thread::Result<Result<DistributedResult<P::State, P::Move>, SolveError>>> =
        thread::scope(|scope| {
            let handles: Vec<_> = cluster
                .into_iter()
                .map(|mut comm| scope.spawn(move || search(puzzle, initial, config, &mut comm)))
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

    outcomes
        .into_iter()
        .map(|outcome| outcome.map_err(|_| SolveError::WorkerPanicked).and_then(|result| result))
        .collect()
}

/// This rank's seeds with a fresh visited set that already holds the root
/// and every seed. Duplicate first-level states are dropped.
fn local_slice<P: Puzzle>(
    puzzle: &P,
    initial: &P::State,
    rank: usize,
    size: usize,
) -> Result<(Vec<FrontierEntry<P::State, P::Move>>, VisitedSet<P::State>), PuzzleError> {
    let visited = VisitedSet::new();
    visited.try_mark(initial);
    let seeds = partition(puzzle, initial, rank, size)?
        .into_iter()
        .filter(|entry| visited.try_mark(&entry.state))
        .collect();
    Ok((seeds, visited))
}

/// Local outcome when the initial state is already solved.
///
/// Only the root reports it, so exactly one zero-length candidate exists.
fn solved_at_root<S: Clone, M>(
    initial: &S,
    rank: usize,
    config: &SearchConfig,
) -> LocalResult<S, M> {
    let start_time = Instant::now();
    let threads = config.num_threads.max(1);
    if rank != ROOT_RANK {
        return LocalResult {
            candidate: SolutionCandidate::NotFound,
            statistics: SearchStatistics {
                threads,
                ..SearchStatistics::idle()
            },
        };
    }
    LocalResult {
        candidate: SolutionCandidate::Found {
            state: initial.clone(),
            path: Vec::new(),
        },
        statistics: SearchStatistics {
            termination: Termination::Solved,
            elapsed_time: start_time.elapsed(),
            threads,
            states_expanded: 1,
            states_enqueued: 1,
            ..SearchStatistics::idle()
        },
    }
}

fn collect_and_elect<P: Puzzle, C: Communicator>(
    puzzle: &P,
    initial: &P::State,
    own: &SolutionCandidate<P::State, P::Move>,
    comm: &mut C,
) -> Result<GlobalSolution<P::State, P::Move>, SolveError> {
    let mut candidates = Vec::with_capacity(comm.size());
    candidates.push((ROOT_RANK, own.clone()));

    for peer in (0..comm.size()).filter(|&peer| peer != ROOT_RANK) {
        let record = CandidateRecord::decode(&comm.recv(peer)?)?;
        if record.rank as usize != peer {
            return Err(SolveError::InvalidCandidate { rank: peer });
        }
        let candidate = match replay(puzzle, initial, &record)? {
            GlobalSolution::Found { state, path, .. } => SolutionCandidate::Found { state, path },
            GlobalSolution::NotFound => SolutionCandidate::NotFound,
        };
        candidates.push((peer, candidate));
    }

    let winner = match aggregate(&candidates) {
        Some(i) => {
            let (rank, candidate) = candidates.swap_remove(i);
            match candidate {
                SolutionCandidate::Found { state, path } => {
                    GlobalSolution::Found { rank, state, path }
                }
                SolutionCandidate::NotFound => GlobalSolution::NotFound,
            }
        }
        None => GlobalSolution::NotFound,
    };

    let record = match &winner {
        GlobalSolution::Found { rank, path, .. } => {
            log::info!("elected rank {}'s {}-move solution", rank, path.len());
            to_record(puzzle, *rank, Some(path.as_slice()))?
        }
        GlobalSolution::NotFound => {
            log::info!("no rank found a solution");
            to_record(puzzle, ROOT_RANK, None)?
        }
    };
    comm.broadcast(ROOT_RANK, Some(record.encode()?.as_slice()))?;

    Ok(winner)
}

fn to_record<P: Puzzle>(
    puzzle: &P,
    rank: usize,
    path: Option<&[P::Move]>,
) -> Result<CandidateRecord, SolveError> {
    let rank = u32::try_from(rank).map_err(|_| SolveError::InvalidCandidate { rank })?;
    Ok(match path {
        Some(path) => {
            CandidateRecord::found(rank, path.iter().map(|&mv| puzzle.move_id(mv)).collect())
        }
        None => CandidateRecord::not_found(rank),
    })
}

/// Rebuild the state a record's moves reach from `initial`, rejecting
/// records whose path does not end in a solved state.
fn replay<P: Puzzle>(
    puzzle: &P,
    initial: &P::State,
    record: &CandidateRecord,
) -> Result<GlobalSolution<P::State, P::Move>, SolveError> {
    if !record.found {
        return Ok(GlobalSolution::NotFound);
    }
    let rank = record.rank as usize;
    let path = record
        .moves
        .iter()
        .map(|&id| puzzle.move_from_id(id))
        .collect::<Result<Vec<_>, _>>()?;
    let state = puzzle.apply_path(initial, &path)?;
    if !puzzle.is_solved(&state) {
        return Err(SolveError::InvalidCandidate { rank });
    }
    Ok(GlobalSolution::Found { rank, state, path })
}
