// src/plan.rs

//! Shard planning: contiguous, size-balanced ranges over the user population.
//!
//! Each worker owns one contiguous range of user ids per step. The ranges
//! partition `[0, N)` with no gaps and no overlaps, and the first `N % P`
//! ranks each carry one extra user over the floor share. Planning is a pure
//! function of `(N, P, rank)` and is recomputed at the start of every step.

/// A contiguous sub-range of user ids owned by one worker for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRange {
    /// First user id in the range (inclusive).
    pub start: usize,
    /// Number of users in the range.
    pub len: usize,
}

impl ShardRange {
    /// Create a new shard range.
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last user id in the range.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether the range owns no users. Empty shards are valid and must be
    /// tolerated by the executor and the synchronizer.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if a user id falls in this range.
    pub fn contains(&self, user: usize) -> bool {
        user >= self.start && user < self.end()
    }

    /// Iterate over the user ids in this range, in increasing order.
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// Compute the shard owned by `rank` out of `num_workers` for a population
/// of `total` users.
///
/// Workers with rank below `total % num_workers` receive one user more than
/// the floor division share, so shard sizes differ by at most one.
pub fn plan_shard(total: usize, num_workers: usize, rank: usize) -> ShardRange {
    debug_assert!(num_workers > 0, "worker pool must not be empty");
    debug_assert!(rank < num_workers, "rank {rank} out of {num_workers}");

    let base = total / num_workers;
    let remainder = total % num_workers;
    let mut len = base + usize::from(rank < remainder);
    let start = base * rank + rank.min(remainder);

    // The highest rank must own through the end of the population no matter
    // what. The primary formula is exhaustively verified to cover the tail,
    // so this branch firing means the formula has regressed.
    if rank == num_workers - 1 && start + len != total {
        tracing::warn!(
            rank,
            start,
            len,
            total,
            "shard formula under-covered the tail; forcing coverage"
        );
        len = total - start;
    }

    ShardRange::new(start, len)
}

/// Compute every rank's shard for a population of `total` users.
pub fn plan_all(total: usize, num_workers: usize) -> Vec<ShardRange> {
    (0..num_workers)
        .map(|rank| plan_shard(total, num_workers, rank))
        .collect()
}
