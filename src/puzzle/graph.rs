//! Explicit state graphs
//!
//! A [`GraphPuzzle`] spells out every edge, which makes exact shortest-path
//! distances and reachable-set sizes easy to know ahead of a search.

use crate::error::PuzzleError;
use crate::puzzle::{Puzzle, check_move_id};
use std::collections::{BTreeSet, VecDeque};

/// Directed graph over nodes `0..node_count` with a set of goal nodes.
///
/// Move `i` from a node follows that node's `i`-th outgoing edge. A move id
/// beyond a node's out-degree but below the graph-wide maximum is a
/// self-loop.
#[derive(Debug, Clone)]
pub struct GraphPuzzle {
    edges: Vec<Vec<usize>>,
    goals: BTreeSet<usize>,
    max_degree: u32,
}

impl GraphPuzzle {
    /// Build a graph from its adjacency list. Edges to unknown nodes are dropped.
    pub fn new(edges: Vec<Vec<usize>>, goals: impl IntoIterator<Item = usize>) -> Self {
        let node_count = edges.len();
        let edges: Vec<Vec<usize>> = edges
            .into_iter()
            .map(|out| out.into_iter().filter(|&to| to < node_count).collect())
            .collect();
        let max_degree = edges.iter().map(|out| out.len()).max().unwrap_or(0) as u32;
        Self {
            edges,
            goals: goals.into_iter().filter(|&g| g < node_count).collect(),
            max_degree,
        }
    }

    /// Undirected path `0 - 1 - ... - (len-1)` with the goal at the far end.
    pub fn line(len: usize) -> Self {
        let edges = (0..len)
            .map(|i| {
                let mut out = Vec::new();
                if i > 0 {
                    out.push(i - 1);
                }
                if i + 1 < len {
                    out.push(i + 1);
                }
                out
            })
            .collect();
        Self::new(edges, len.checked_sub(1))
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Exact BFS distance from `start` to the nearest goal, single-threaded.
    /// `None` if no goal is reachable or `start` is not a node.
    pub fn distance_to_goal(&self, start: usize) -> Option<usize> {
        if start >= self.node_count() {
            return None;
        }
        let mut seen = vec![false; self.edges.len()];
        let mut queue = VecDeque::from([(start, 0usize)]);
        seen[start] = true;
        while let Some((node, dist)) = queue.pop_front() {
            if self.goals.contains(&node) {
                return Some(dist);
            }
            for &next in &self.edges[node] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back((next, dist + 1));
                }
            }
        }
        None
    }

    /// Number of nodes reachable from `start`, including `start`. Zero when
    /// `start` is not a node.
    pub fn reachable_count(&self, start: usize) -> usize {
        if start >= self.node_count() {
            return 0;
        }
        let mut seen = vec![false; self.edges.len()];
        let mut stack = vec![start];
        seen[start] = true;
        let mut count = 0;
        while let Some(node) = stack.pop() {
            count += 1;
            for &next in &self.edges[node] {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        count
    }
}

impl Puzzle for GraphPuzzle {
    type State = usize;
    type Move = u32;

    fn move_count(&self) -> u32 {
        self.max_degree
    }

    fn legal_moves(&self, state: &usize) -> Vec<u32> {
        let degree = self.edges.get(*state).map_or(0, |out| out.len());
        (0..degree as u32).collect()
    }

    fn apply(&self, state: &usize, mv: u32) -> Result<usize, PuzzleError> {
        check_move_id(mv, self.max_degree)?;
        let out = self.edges.get(*state).ok_or_else(|| {
            PuzzleError::ShapeMismatch(format!(
                "node {} not in a graph of {} nodes",
                state,
                self.edges.len()
            ))
        })?;
        Ok(out.get(mv as usize).copied().unwrap_or(*state))
    }

    fn is_solved(&self, state: &usize) -> bool {
        self.goals.contains(state)
    }

    fn move_id(&self, mv: u32) -> u32 {
        mv
    }

    fn move_from_id(&self, id: u32) -> Result<u32, PuzzleError> {
        check_move_id(id, self.max_degree)?;
        Ok(id)
    }
}
