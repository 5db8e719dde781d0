//! State and move abstractions consumed by the search engine
//!
//! The engine knows nothing about cubes. Any puzzle that can enumerate its
//! moves, apply one purely, and recognise a solved state can be searched.
//!
//! - [`cube`]: the N×N×N cube
//! - [`graph`]: an explicit state graph, handy for small exact experiments

pub mod cube;
pub mod graph;

pub use cube::{Color, CubeMove, CubePuzzle, CubeState};
pub use graph::GraphPuzzle;

use crate::error::PuzzleError;
use std::fmt::Debug;
use std::hash::Hash;

/// A puzzle whose state graph is explored breadth-first.
pub trait Puzzle: Sync {
    /// A full configuration. Immutable once built; moves produce new values.
    type State: Clone + Eq + Hash + Send + Sync + Debug;
    /// A single transformation of a state.
    type Move: Copy + Eq + Send + Sync + Debug;

    /// Number of distinct move ids; valid ids are `0..move_count()`.
    fn move_count(&self) -> u32;

    /// Moves available from `state`, in move-id order.
    fn legal_moves(&self, state: &Self::State) -> Vec<Self::Move>;

    /// Apply `mv` to `state`, producing the successor.
    fn apply(&self, state: &Self::State, mv: Self::Move) -> Result<Self::State, PuzzleError>;

    /// True iff `state` is a goal.
    fn is_solved(&self, state: &Self::State) -> bool;

    /// Wire identity of a move.
    fn move_id(&self, mv: Self::Move) -> u32;

    /// Inverse of [`Puzzle::move_id`].
    fn move_from_id(&self, id: u32) -> Result<Self::Move, PuzzleError>;

    /// Replay `path` from `state`.
    fn apply_path(
        &self,
        state: &Self::State,
        path: &[Self::Move],
    ) -> Result<Self::State, PuzzleError> {
        let mut current = state.clone();
        for &mv in path {
            current = self.apply(&current, mv)?;
        }
        Ok(current)
    }
}

/// Reject ids outside `0..move_count`.
pub(crate) fn check_move_id(id: u32, move_count: u32) -> Result<(), PuzzleError> {
    if id < move_count {
        Ok(())
    } else {
        Err(PuzzleError::InvalidMove { id, move_count })
    }
}
