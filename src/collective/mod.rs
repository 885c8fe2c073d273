// src/collective/mod.rs

//! Blocking collective operations over a fixed worker group.
//!
//! The refinement step runs single-program-multiple-data: every worker
//! executes the same step and meets its peers at a handful of collective
//! operations. Each operation is all-or-nothing — a worker that issues it
//! does not proceed until every other worker has also reached and completed
//! it, and no worker may skip or retry one without deadlocking the group.
//!
//! Rank 0 is the coordinator: it is the only rank that observes gathered
//! data and the only rank that sources a broadcast.

mod local;
mod sync;

pub use local::{local_group, LocalCollective};
pub use sync::synchronize;

use crate::error::Result;

/// The rank that merges gathered results and sources broadcasts.
pub const COORDINATOR_RANK: usize = 0;

/// A handle to one worker's membership in a fixed collective group.
///
/// Payloads are `u32` words; the step's assignment and indifference vectors
/// both travel as word arrays.
pub trait Collective {
    /// This worker's rank, in `[0, world_size)`.
    fn rank(&self) -> usize;

    /// The fixed number of workers in the group.
    fn world_size(&self) -> usize;

    /// Block until every worker in the group has entered the barrier.
    fn barrier(&self) -> Result<()>;

    /// Variable-length gather. The coordinator receives every worker's
    /// buffer, indexed by rank (its own included); other ranks receive
    /// `None`. Buffers may be empty.
    fn gather(&self, local: &[u32]) -> Result<Option<Vec<Vec<u32>>>>;

    /// Gather a single word per worker. The coordinator receives the words
    /// ordered by rank; other ranks receive `None`.
    fn gather_one(&self, value: u32) -> Result<Option<Vec<u32>>> {
        let chunks = self.gather(&[value])?;
        Ok(chunks.map(|chunks| chunks.into_iter().flatten().collect()))
    }

    /// Broadcast from the coordinator. `buf` must be `Some` on the
    /// coordinator and is ignored elsewhere; every rank returns the
    /// coordinator's buffer.
    fn broadcast(&self, buf: Option<Vec<u32>>) -> Result<Vec<u32>>;
}
