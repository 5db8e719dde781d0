//! Shared FIFO frontier for one process's worker pool
//!
//! Entries are kept in two queues: the level being expanded and the level
//! being built. A worker pops from the current level; successors go to the
//! next one. The levels swap only once the current level is empty and no
//! popped entry is still being expanded, so every depth-`d` state is
//! dequeued before any depth-`d + 1` state.
//!
//! Termination falls out of the same bookkeeping: when both queues are empty
//! and nothing is in flight, no entry can ever arrive again.

use crate::search::result::FrontierEntry;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

struct Levels<S, M> {
    current: VecDeque<FrontierEntry<S, M>>,
    next: VecDeque<FrontierEntry<S, M>>,
    depth: usize,
    in_flight: usize,
    pushed: u64,
}

/// Result of asking the frontier for work.
pub enum Pop<'a, S, M> {
    /// An entry to expand. Drop the guard once its successors are pushed.
    Ready(FrontierEntry<S, M>, InFlight<'a, S, M>),
    /// Nothing to pop yet, but an in-flight expansion may still add entries.
    Pending,
    /// Nothing left and nothing can arrive.
    Exhausted,
    /// A stop was requested.
    Stopped,
}

/// Marks one popped entry as being expanded.
pub struct InFlight<'a, S, M> {
    frontier: &'a Frontier<S, M>,
}

impl<S, M> Drop for InFlight<'_, S, M> {
    fn drop(&mut self) {
        let mut levels = self.frontier.levels.lock();
        levels.in_flight -= 1;
        if levels.in_flight == 0 && levels.current.is_empty() {
            self.frontier.ready.notify_all();
        }
    }
}

/// Thread-safe level-ordered FIFO of frontier entries.
pub struct Frontier<S, M> {
    levels: Mutex<Levels<S, M>>,
    ready: Condvar,
    stop: AtomicBool,
}

impl<S, M> Frontier<S, M> {
    /// A frontier whose first level holds `seeds`, all at the same depth.
    pub fn new(seeds: Vec<FrontierEntry<S, M>>) -> Self {
        let depth = seeds.first().map_or(0, |entry| entry.path.len());
        let pushed = seeds.len() as u64;
        Self {
            levels: Mutex::new(Levels {
                current: seeds.into(),
                next: VecDeque::new(),
                depth,
                in_flight: 0,
                pushed,
            }),
            ready: Condvar::new(),
            stop: AtomicBool::new(false),
        }
    }

    /// Queue an entry for the level after the one being expanded.
    pub fn push(&self, entry: FrontierEntry<S, M>) {
        let mut levels = self.levels.lock();
        levels.next.push_back(entry);
        levels.pushed += 1;
    }

    /// Pop without waiting.
    pub fn try_pop(&self) -> Pop<'_, S, M> {
        if self.is_stopped() {
            return Pop::Stopped;
        }
        let mut levels = self.levels.lock();
        self.pop_locked(&mut levels)
    }

    /// Pop, waiting up to `timeout` while other workers are still expanding.
    ///
    /// Returns [`Pop::Pending`] only if the wait timed out.
    pub fn wait_pop(&self, timeout: Duration) -> Pop<'_, S, M> {
        let mut levels = self.levels.lock();
        loop {
            match self.pop_locked(&mut levels) {
                Pop::Pending => {
                    if self.ready.wait_for(&mut levels, timeout).timed_out() {
                        return self.pop_locked(&mut levels);
                    }
                }
                other => return other,
            }
        }
    }

    fn pop_locked(&self, levels: &mut MutexGuard<'_, Levels<S, M>>) -> Pop<'_, S, M> {
        if self.is_stopped() {
            return Pop::Stopped;
        }
        if levels.current.is_empty() {
            if levels.in_flight > 0 {
                return Pop::Pending;
            }
            if levels.next.is_empty() {
                self.ready.notify_all();
                return Pop::Exhausted;
            }
            let levels = &mut **levels;
            std::mem::swap(&mut levels.current, &mut levels.next);
            levels.depth += 1;
            log::debug!(
                "frontier advanced to depth {} ({} entries)",
                levels.depth,
                levels.current.len()
            );
            self.ready.notify_all();
        }
        match levels.current.pop_front() {
            Some(entry) => {
                levels.in_flight += 1;
                Pop::Ready(entry, InFlight { frontier: self })
            }
            None => Pop::Exhausted,
        }
    }

    /// Ask every worker to stop at its next pop, and wake any that wait.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let _levels = self.levels.lock();
        self.ready.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Depth of the level currently being expanded.
    pub fn depth(&self) -> usize {
        self.levels.lock().depth
    }

    /// Entries waiting in either level.
    pub fn len(&self) -> usize {
        let levels = self.levels.lock();
        levels.current.len() + levels.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries ever queued, seeds included.
    pub fn pushed(&self) -> u64 {
        self.levels.lock().pushed
    }
}
