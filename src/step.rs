// src/step.rs

//! One full refinement step: plan, compute, synchronize.
//!
//! Every worker calls [`refine_step`] with the same inputs. Each plans its
//! own shard of the user population, re-evaluates those users against every
//! cluster, then meets its peers to merge and redistribute the results. On
//! return, every worker holds the complete, identical new assignment and
//! indifference vectors — the step either finishes for everybody or fails
//! for everybody.

use crate::collective::{synchronize, Collective};
use crate::error::Result;
use crate::executor::run_shard;
use crate::oracle::{ClusterId, TrainingErrorOracle};
use crate::plan::plan_shard;

/// The fully materialized output of a refinement step, identical across
/// workers on return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// New cluster assignment for every user.
    pub participation: Vec<ClusterId>,
    /// For every user who kept their assignment: whether that was a tie
    /// with another cluster rather than a unique optimum. Meaningless for
    /// users who moved (always false there).
    pub indifference: Vec<bool>,
}

/// Run one refinement step over the whole user population.
///
/// `participation` is the current assignment of every user and is only
/// read; the new assignment comes back in the output. All workers must pass
/// equal-length participation vectors and the same `num_clusters`.
pub fn refine_step<O, C>(
    oracle: &O,
    comm: &C,
    participation: &[ClusterId],
    num_clusters: usize,
) -> Result<StepOutput>
where
    O: TrainingErrorOracle + ?Sized,
    C: Collective + ?Sized,
{
    let total = participation.len();
    let range = plan_shard(total, comm.world_size(), comm.rank());

    tracing::debug!(
        rank = comm.rank(),
        start = range.start,
        len = range.len,
        "computing shard reassignments"
    );

    let local = run_shard(oracle, participation, range, num_clusters)?;

    let new_participation = synchronize(comm, &local.assignments, total)?;

    let local_indiff: Vec<u32> = local.indifference.iter().map(|&tied| u32::from(tied)).collect();
    let indifference = synchronize(comm, &local_indiff, total)?
        .into_iter()
        .map(|word| word != 0)
        .collect();

    Ok(StepOutput {
        participation: new_participation,
        indifference,
    })
}
