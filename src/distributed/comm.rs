//! Message passing between cooperating search processes.
//!
//! Ranks share no memory; the only traffic is one candidate record from
//! every non-root rank to the root, and one broadcast back.

use crate::error::CommError;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Point-to-point and broadcast messaging between ranks `0..size`.
pub trait Communicator {
    /// This process's rank.
    fn rank(&self) -> usize;

    /// Number of cooperating processes.
    fn size(&self) -> usize;

    /// Send one message to `to`.
    fn send(&mut self, to: usize, payload: &[u8]) -> Result<(), CommError>;

    /// Receive the next message from `from`, blocking until it arrives.
    fn recv(&mut self, from: usize) -> Result<Vec<u8>, CommError>;

    /// Deliver the root's payload to every rank.
    ///
    /// The root must pass `Some`; other ranks pass `None` and get the root's
    /// bytes back.
    fn broadcast(&mut self, root: usize, payload: Option<&[u8]>) -> Result<Vec<u8>, CommError> {
        let size = self.size();
        if root >= size {
            return Err(CommError::BadRank { rank: root, size });
        }
        if self.rank() != root {
            return self.recv(root);
        }

        let payload = payload.ok_or(CommError::MissingPayload(root))?;
        for peer in (0..size).filter(|&peer| peer != root) {
            self.send(peer, payload)?;
        }
        Ok(payload.to_vec())
    }
}

/// One rank of an in-process cluster.
///
/// Every ordered pair of ranks has its own channel, so `recv(from)` only ever
/// sees messages sent by `from`.
pub struct LocalCommunicator {
    rank: usize,
    to_ranks: Vec<Sender<Vec<u8>>>,
    from_ranks: Vec<Receiver<Vec<u8>>>,
}

/// The communicators of an in-process cluster, one per rank.
///
/// Hand each one to a separate thread; dropping a communicator disconnects
/// it from its peers.
pub struct LocalCluster {
    members: Vec<LocalCommunicator>,
}

impl LocalCluster {
    /// Wire up `size` ranks (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut senders: Vec<Vec<Sender<Vec<u8>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut receivers: Vec<Vec<Receiver<Vec<u8>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for from in 0..size {
            for to in 0..size {
                let (tx, rx) = unbounded();
                senders[from].push(tx);
                receivers[to].push(rx);
            }
        }

        let members = senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (to_ranks, from_ranks))| LocalCommunicator {
                rank,
                to_ranks,
                from_ranks,
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Split into per-rank communicators, ordered by rank.
    pub fn into_members(self) -> Vec<LocalCommunicator> {
        self.members
    }
}

impl IntoIterator for LocalCluster {
    type Item = LocalCommunicator;
    type IntoIter = std::vec::IntoIter<LocalCommunicator>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl LocalCommunicator {
    fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank < self.to_ranks.len() {
            Ok(())
        } else {
            Err(CommError::BadRank {
                rank,
                size: self.to_ranks.len(),
            })
        }
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.to_ranks.len()
    }

    fn send(&mut self, to: usize, payload: &[u8]) -> Result<(), CommError> {
        self.check_rank(to)?;
        self.to_ranks[to]
            .send(payload.to_vec())
            .map_err(|_| CommError::Disconnected(to))
    }

    fn recv(&mut self, from: usize) -> Result<Vec<u8>, CommError> {
        self.check_rank(from)?;
        self.from_ranks[from]
            .recv()
            .map_err(|_| CommError::Disconnected(from))
    }
}
