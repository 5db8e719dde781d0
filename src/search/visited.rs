//! Concurrent visited set
//!
//! [`VisitedSet::try_mark`] is the only gate in front of the frontier: a state
//! is pushed by whichever worker claims it first, and by nobody else.

use dashmap::DashSet;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// States already claimed during one search run.
#[derive(Debug)]
pub struct VisitedSet<S: Eq + Hash> {
    seen: DashSet<S, FxBuildHasher>,
    claims: AtomicU64,
    rejections: AtomicU64,
}

impl<S: Eq + Hash + Clone> VisitedSet<S> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: DashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
            claims: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    /// Claim `state`. Returns true if it was absent and is now marked.
    ///
    /// The insert alone decides the claim, under one shard lock; the
    /// `contains` lookup only skips cloning states that are already known.
    pub fn try_mark(&self, state: &S) -> bool {
        if self.seen.contains(state) {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        if self.seen.insert(state.clone()) {
            self.claims.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    pub fn contains(&self, state: &S) -> bool {
        self.seen.contains(state)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Successful claims so far.
    pub fn claims(&self) -> u64 {
        self.claims.load(Ordering::Relaxed)
    }

    /// Claims refused because the state was already present.
    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }
}

impl<S: Eq + Hash + Clone> Default for VisitedSet<S> {
    fn default() -> Self {
        Self::new()
    }
}
