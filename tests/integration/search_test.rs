use cubesearch::puzzle::{CubePuzzle, GraphPuzzle, Puzzle};
use cubesearch::search::{SearchConfig, SolutionCandidate, Termination, search_local};
use std::collections::{HashSet, VecDeque};

/// Plain single-threaded BFS, used as the reference distance.
fn reference_distance<P: Puzzle>(puzzle: &P, start: &P::State, limit: usize) -> Option<usize> {
    let mut seen = HashSet::from([start.clone()]);
    let mut queue = VecDeque::from([(start.clone(), 0usize)]);
    while let Some((state, depth)) = queue.pop_front() {
        if puzzle.is_solved(&state) {
            return Some(depth);
        }
        if depth == limit {
            continue;
        }
        for mv in puzzle.legal_moves(&state) {
            let next = puzzle.apply(&state, mv).unwrap();
            if seen.insert(next.clone()) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    None
}

/// Square grid with edges in all four directions.
fn grid(side: usize, goals: Vec<usize>) -> GraphPuzzle {
    let edges = (0..side * side)
        .map(|node| {
            let (row, col) = (node / side, node % side);
            let mut out = Vec::new();
            if row > 0 {
                out.push(node - side);
            }
            if row + 1 < side {
                out.push(node + side);
            }
            if col > 0 {
                out.push(node - 1);
            }
            if col + 1 < side {
                out.push(node + 1);
            }
            out
        })
        .collect();
    GraphPuzzle::new(edges, goals)
}

#[test]
fn test_cube_shortest_path_matches_reference() {
    let puzzle = CubePuzzle::new(3).unwrap();
    // Each triple is one counter-clockwise turn, undone by a single move.
    let start = puzzle.scramble(&[1, 1, 1, 4, 4, 4, 2, 2, 2]).unwrap();
    let expected = reference_distance(&puzzle, &start, 5).unwrap();
    assert_eq!(expected, 3);

    for threads in [1, 2, 4, 8] {
        let config = SearchConfig::default().with_threads(threads);
        let result = search_local(&puzzle, &start, &config).unwrap();
        assert_eq!(
            result.candidate.path_len(),
            Some(expected),
            "threads = {}",
            threads
        );
    }
}

#[test]
fn test_single_quarter_turn_needs_three_moves() {
    let puzzle = CubePuzzle::new(3).unwrap();
    let start = puzzle.scramble(&[0]).unwrap();
    let config = SearchConfig::default().with_threads(4);
    let result = search_local(&puzzle, &start, &config).unwrap();

    let path = result.candidate.path().unwrap();
    assert_eq!(path.len(), 3);
    assert!(path.iter().all(|mv| mv.face == 0));
}

#[test]
fn test_repeated_runs_agree_on_length() {
    let puzzle = CubePuzzle::new(2).unwrap();
    let start = puzzle.scramble(&[0, 0, 0, 3, 3, 3]).unwrap();
    let config = SearchConfig::default().with_threads(6);

    let lengths: Vec<Option<usize>> = (0..5)
        .map(|_| search_local(&puzzle, &start, &config).unwrap().candidate.path_len())
        .collect();
    assert!(lengths[0].is_some());
    assert!(lengths.iter().all(|len| *len == lengths[0]));
}

#[test]
fn test_returned_path_solves_start() {
    let puzzle = CubePuzzle::new(3).unwrap();
    let start = puzzle.scramble(&[5, 5, 5, 0, 0, 0]).unwrap();
    let config = SearchConfig::default().with_threads(4);
    let result = search_local(&puzzle, &start, &config).unwrap();

    match result.candidate {
        SolutionCandidate::Found { state, path } => {
            let replayed = puzzle.apply_path(&start, &path).unwrap();
            assert!(puzzle.is_solved(&replayed));
            assert_eq!(replayed, state);
        }
        SolutionCandidate::NotFound => panic!("expected a solution"),
    }
}

#[test]
fn test_already_solved_has_empty_path() {
    for size in [1, 2, 3, 5] {
        let puzzle = CubePuzzle::new(size).unwrap();
        let config = SearchConfig::default().with_threads(3);
        let result = search_local(&puzzle, &puzzle.solved_state(), &config).unwrap();
        assert_eq!(result.candidate.path_len(), Some(0), "size = {}", size);
    }
}

#[test]
fn test_every_reachable_state_enqueued_once() {
    let graph = grid(20, Vec::new());
    for threads in [1, 4, 8] {
        let config = SearchConfig::default().with_threads(threads);
        let result = search_local(&graph, &0, &config).unwrap();
        let stats = &result.statistics;

        assert_eq!(result.candidate, SolutionCandidate::NotFound);
        assert_eq!(stats.termination, Termination::Exhausted);
        assert_eq!(stats.states_enqueued, graph.reachable_count(0) as u64);
        assert_eq!(stats.states_expanded, stats.states_enqueued);
        // 2 * 20 * 19 undirected edges, each seen from both ends, minus the
        // 399 edges that discovered a new node.
        assert_eq!(stats.duplicates_discarded, 2 * 2 * 20 * 19 - 399);
    }
}

#[test]
fn test_unreachable_goal_terminates() {
    // A ring of 36 nodes; the goal is an isolated 37th node.
    let mut edges: Vec<Vec<usize>> = (0..36).map(|n| vec![(n + 1) % 36, (n + 35) % 36]).collect();
    edges.push(Vec::new());
    let graph = GraphPuzzle::new(edges, [36]);

    let config = SearchConfig::default().with_threads(4);
    let result = search_local(&graph, &0, &config).unwrap();
    assert!(!result.candidate.is_found());
    assert_eq!(result.statistics.termination, Termination::Exhausted);
    assert_eq!(result.statistics.states_expanded, 36);
}

#[test]
fn test_graph_distance_matches_reference() {
    let goal = 12 * 7 + 9;
    let graph = grid(12, vec![goal]);
    let expected = graph.distance_to_goal(0).unwrap();
    assert_eq!(expected, 16);

    let config = SearchConfig::default().with_threads(8);
    let result = search_local(&graph, &0, &config).unwrap();
    assert_eq!(result.candidate.path_len(), Some(expected));
}
