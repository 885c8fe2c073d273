// src/collective/sync.rs

//! Merge-and-redistribute of shard-local results.
//!
//! Turns the workers' independently produced, variably sized local buffers
//! into one globally ordered vector of length `total_len` that every worker
//! holds on return:
//!
//! 1. barrier — nobody communicates before everybody has computed;
//! 2. size exchange — each worker reports its shard length;
//! 3. offset computation — the coordinator prefix-sums the reported sizes
//!    into per-rank write offsets, trusting only the sizes, never a
//!    recomputed partition;
//! 4. gather — each worker's buffer lands at its offset in the merge buffer;
//! 5. broadcast — the merged vector goes back out to every rank.
//!
//! The merge buffer lives on the coordinator only and only for the duration
//! of this call.

use super::{Collective, COORDINATOR_RANK};
use crate::error::{RefineError, Result};

/// Gather every worker's `local` buffer, merge in rank order, and broadcast
/// the merged vector of length `total_len` to every worker.
///
/// # Errors
///
/// Fails with `CollectiveMismatch` when the reported sizes do not sum to
/// `total_len` or a gathered buffer disagrees with its reported size, with
/// `Allocation` when the merge buffer cannot be obtained, and with
/// `WorkerUnreachable` when a peer has gone away. All are fatal to the step.
pub fn synchronize<C>(comm: &C, local: &[u32], total_len: usize) -> Result<Vec<u32>>
where
    C: Collective + ?Sized,
{
    comm.barrier()?;

    let sizes = comm.gather_one(local.len() as u32)?;
    let chunks = comm.gather(local)?;

    let merged = if comm.rank() == COORDINATOR_RANK {
        let sizes =
            sizes.ok_or_else(|| RefineError::collective("coordinator missing gathered sizes"))?;
        let chunks =
            chunks.ok_or_else(|| RefineError::collective("coordinator missing gathered chunks"))?;
        Some(merge(&sizes, &chunks, total_len)?)
    } else {
        None
    };

    let global = comm.broadcast(merged)?;
    if global.len() != total_len {
        return Err(RefineError::collective_mismatch(total_len, global.len()));
    }

    tracing::debug!(
        rank = comm.rank(),
        total_len,
        "shard results synchronized"
    );

    Ok(global)
}

/// Place each rank's chunk at the write offset derived from the reported
/// sizes. Runs on the coordinator only.
fn merge(sizes: &[u32], chunks: &[Vec<u32>], total_len: usize) -> Result<Vec<u32>> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut next = 0usize;
    for &size in sizes {
        offsets.push(next);
        next += size as usize;
    }
    if next != total_len {
        return Err(RefineError::collective_mismatch(total_len, next));
    }

    let mut merged = Vec::new();
    merged
        .try_reserve_exact(total_len)
        .map_err(|_| RefineError::allocation("merge buffer", total_len))?;
    merged.resize(total_len, 0);

    for (rank, chunk) in chunks.iter().enumerate() {
        let expected = sizes[rank] as usize;
        if chunk.len() != expected {
            return Err(RefineError::collective_mismatch(expected, chunk.len()));
        }
        merged[offsets[rank]..offsets[rank] + expected].copy_from_slice(chunk);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::local_group;
    use std::thread;

    #[test]
    fn test_merge_places_chunks_at_offsets() {
        let sizes = vec![2, 0, 3];
        let chunks = vec![vec![1, 2], vec![], vec![3, 4, 5]];
        let merged = merge(&sizes, &chunks, 5).unwrap();
        assert_eq!(merged, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge_rejects_bad_total() {
        let sizes = vec![2, 2];
        let chunks = vec![vec![1, 2], vec![3, 4]];
        let err = merge(&sizes, &chunks, 5).unwrap_err();
        assert!(matches!(
            err,
            RefineError::CollectiveMismatch {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_merge_rejects_lying_chunk() {
        let sizes = vec![2, 2];
        let chunks = vec![vec![1, 2], vec![3]];
        let err = merge(&sizes, &chunks, 4).unwrap_err();
        assert!(matches!(err, RefineError::CollectiveMismatch { .. }));
    }

    #[test]
    fn test_single_worker_roundtrip() {
        let group = local_group(1);
        let out = synchronize(&group[0], &[4, 5, 6], 3).unwrap();
        assert_eq!(out, vec![4, 5, 6]);
    }

    #[test]
    fn test_uneven_shards_merge_in_rank_order() {
        let group = local_group(3);
        let locals = [vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];

        thread::scope(|s| {
            let mut handles = Vec::new();
            for (comm, local) in group.iter().zip(&locals) {
                handles.push(s.spawn(move || synchronize(comm, local, 10).unwrap()));
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap(), (0..10).collect::<Vec<u32>>());
            }
        });
    }

    #[test]
    fn test_empty_shards_tolerated() {
        let group = local_group(4);
        let locals = [vec![1], vec![2], Vec::new(), Vec::new()];

        thread::scope(|s| {
            let mut handles = Vec::new();
            for (comm, local) in group.iter().zip(&locals) {
                handles.push(s.spawn(move || synchronize(comm, local, 2).unwrap()));
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap(), vec![1, 2]);
            }
        });
    }

    #[test]
    fn test_zero_length_everything() {
        let group = local_group(2);

        thread::scope(|s| {
            let mut handles = Vec::new();
            for comm in &group {
                handles.push(s.spawn(move || synchronize(comm, &[], 0).unwrap()));
            }
            for handle in handles {
                assert!(handle.join().unwrap().is_empty());
            }
        });
    }
}
