use cubesearch::distributed::{
    self, CandidateRecord, Communicator, LocalCluster, TcpCommunicator, aggregate,
    run_local_cluster, solve_local_cluster,
};
use cubesearch::puzzle::{CubePuzzle, GraphPuzzle, Puzzle};
use cubesearch::search::{GlobalSolution, SearchConfig, SolutionCandidate, search_local};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

#[test]
fn test_rank_count_does_not_change_length() {
    let puzzle = CubePuzzle::new(3).unwrap();
    let start = puzzle.scramble(&[3, 3, 3, 4, 4, 4, 0, 0, 0]).unwrap();
    let config = SearchConfig::default().with_threads(2);

    let single = search_local(&puzzle, &start, &config).unwrap();
    let expected = single.candidate.path_len().unwrap();

    for processes in [1, 2, 3, 4, 6, 7] {
        let result = solve_local_cluster(&puzzle, &start, &config, processes).unwrap();
        assert_eq!(
            result.solution.path_len(),
            Some(expected),
            "processes = {}",
            processes
        );
        let path = result.solution.path().unwrap();
        assert!(puzzle.is_solved(&puzzle.apply_path(&start, path).unwrap()));
    }
}

#[test]
fn test_every_rank_sees_the_same_solution() {
    let puzzle = CubePuzzle::new(2).unwrap();
    let start = puzzle.scramble(&[2, 2, 2, 5, 5, 5]).unwrap();
    let config = SearchConfig::default().with_threads(2);

    let results = run_local_cluster(&puzzle, &start, &config, 4).unwrap();
    assert_eq!(results.len(), 4);
    for result in &results {
        assert_eq!(result.solution, results[0].solution);
    }

    // The winner's own candidate is no longer than anyone else's.
    let best = results[0].solution.path_len().unwrap();
    for result in &results {
        if let Some(len) = result.local_candidate.path_len() {
            assert!(len >= best);
        }
    }
}

#[test]
fn test_already_solved_reported_by_root() {
    let puzzle = CubePuzzle::new(4).unwrap();
    let config = SearchConfig::default().with_threads(1);
    let result = solve_local_cluster(&puzzle, &puzzle.solved_state(), &config, 5).unwrap();

    assert!(matches!(
        result.solution,
        GlobalSolution::Found { rank: 0, ref path, .. } if path.is_empty()
    ));
}

#[test]
fn test_no_rank_finds_unreachable_goal() {
    let graph = GraphPuzzle::new(
        vec![vec![1, 2, 3], vec![0, 2], vec![0, 1], vec![0], vec![]],
        [4],
    );
    let config = SearchConfig::default().with_threads(2);
    let results = run_local_cluster(&graph, &0, &config, 3).unwrap();
    assert!(results
        .iter()
        .all(|result| result.solution == GlobalSolution::NotFound));
}

#[test]
fn test_aggregation_with_mixed_candidates() {
    let lengths = [None, Some(12), None, Some(9), None, Some(9), Some(15)];
    let candidates: Vec<(usize, SolutionCandidate<(), u32>)> = lengths
        .iter()
        .enumerate()
        .map(|(rank, len)| {
            let candidate = match len {
                Some(len) => SolutionCandidate::Found {
                    state: (),
                    path: vec![0; *len],
                },
                None => SolutionCandidate::NotFound,
            };
            (rank, candidate)
        })
        .collect();

    let winner = aggregate(&candidates).unwrap();
    assert_eq!(candidates[winner].0, 3);
    assert_eq!(candidates[winner].1.path_len(), Some(9));

    let nobody: Vec<(usize, SolutionCandidate<(), u32>)> = (0..5)
        .map(|rank| (rank, SolutionCandidate::NotFound))
        .collect();
    assert_eq!(aggregate(&nobody), None);
}

#[test]
fn test_search_over_tcp() {
    let puzzle = CubePuzzle::new(3).unwrap();
    let start = puzzle.scramble(&[1, 1, 1, 2, 2, 2]).unwrap();
    let config = SearchConfig::default().with_threads(2);
    let size = 3;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let peers: Vec<_> = (1..size)
        .map(|rank| {
            let puzzle = puzzle.clone();
            let start = start.clone();
            let config = config.clone();
            thread::spawn(move || {
                let mut comm =
                    TcpCommunicator::connect(addr, rank, size, Duration::from_secs(5)).unwrap();
                distributed::search(&puzzle, &start, &config, &mut comm).unwrap()
            })
        })
        .collect();

    let mut root = TcpCommunicator::accept_peers(&listener, size).unwrap();
    let result = distributed::search(&puzzle, &start, &config, &mut root).unwrap();
    assert_eq!(result.solution.path_len(), Some(2));

    for peer in peers {
        let peer_result = peer.join().unwrap();
        assert_eq!(peer_result.solution, result.solution);
    }
}

#[test]
fn test_idle_rank_still_learns_the_answer() {
    let graph = GraphPuzzle::line(6);
    let config = SearchConfig::default().with_threads(1);
    let mut members = LocalCluster::new(2).into_members();
    let mut peer = members.pop().unwrap();
    let mut root = members.pop().unwrap();
    assert_eq!((root.rank(), peer.rank()), (0, 1));

    let (result, peer_result) = thread::scope(|scope| {
        // The start node has a single move, so rank 1 gets no seeds.
        let handle = scope.spawn(|| distributed::search(&graph, &0, &config, &mut peer).unwrap());
        let result = distributed::search(&graph, &0, &config, &mut root).unwrap();
        (result, handle.join().unwrap())
    });

    assert_eq!(result.solution.path_len(), Some(5));
    assert!(!peer_result.local_candidate.is_found());
    assert_eq!(peer_result.solution, result.solution);
}

#[test]
fn test_forged_wire_record_rejected() {
    let graph = GraphPuzzle::line(4);
    let config = SearchConfig::default().with_threads(1);
    let mut members = LocalCluster::new(2).into_members();
    let mut peer = members.pop().unwrap();
    let mut root = members.pop().unwrap();

    let forged = CandidateRecord::found(1, vec![0, 0]).encode().unwrap();
    peer.send(0, &forged).unwrap();

    assert!(distributed::search(&graph, &0, &config, &mut root).is_err());
}
