//! Search split across cooperating processes
//!
//! - [`codec`]: the versioned candidate record exchanged between ranks
//! - [`comm`]: the [`Communicator`] seam and an in-process cluster
//! - [`tcp`]: a multi-process transport over TCP
//! - [`coordinator`]: partitioning, local search, election and broadcast

pub mod codec;
pub mod comm;
pub mod coordinator;
pub mod tcp;

pub use codec::{CandidateRecord, RECORD_VERSION};
pub use comm::{Communicator, LocalCluster, LocalCommunicator};
pub use coordinator::{
    ROOT_RANK, aggregate, partition, run_local_cluster, search, solve_local_cluster,
};
pub use tcp::TcpCommunicator;
