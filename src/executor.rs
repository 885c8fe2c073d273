// src/executor.rs

//! Applies the reassignment solver across one worker's shard.

use crate::error::{RefineError, Result};
use crate::oracle::{ClusterId, TrainingErrorOracle};
use crate::plan::ShardRange;
use crate::solver::reassign_user;

/// Shard-local results, indexed parallel to the shard: entry `i` describes
/// user `range.start + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardResult {
    pub assignments: Vec<ClusterId>,
    pub indifference: Vec<bool>,
}

/// Re-evaluate every user in `range`, in increasing user-id order.
///
/// `participation` is the current full-length assignment vector; only the
/// entries inside `range` are read. Users have no cross-dependencies, so an
/// empty shard simply yields empty vectors.
///
/// # Errors
///
/// Returns `RefineError::Allocation` if the shard buffers cannot be
/// obtained. That condition is fatal to the step: a worker that cannot hold
/// its own results has nothing to contribute to the merge.
pub fn run_shard<O>(
    oracle: &O,
    participation: &[ClusterId],
    range: ShardRange,
    num_clusters: usize,
) -> Result<ShardResult>
where
    O: TrainingErrorOracle + ?Sized,
{
    debug_assert!(range.end() <= participation.len());

    let mut assignments = Vec::new();
    assignments
        .try_reserve_exact(range.len)
        .map_err(|_| RefineError::allocation("shard assignments", range.len))?;
    let mut indifference = Vec::new();
    indifference
        .try_reserve_exact(range.len)
        .map_err(|_| RefineError::allocation("shard indifference", range.len))?;

    for user in range.iter() {
        let decision = reassign_user(oracle, user, participation[user], num_clusters);
        assignments.push(decision.cluster);
        indifference.push(decision.indifferent);
    }

    Ok(ShardResult {
        assignments,
        indifference,
    })
}
