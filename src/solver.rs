// src/solver.rs

//! Per-user reassignment: pick the cluster with the smallest training error.
//!
//! The decision scores every candidate cluster once, then resolves ties
//! deterministically: only a strictly smaller error displaces the running
//! best, so the lowest-index cluster wins among strict improvements and the
//! user's current cluster wins any tie it attains. A user who stays put is
//! additionally flagged as indifferent when another cluster matches the
//! minimum, so the outer convergence loop can tell a settled user from one
//! stuck on a plateau.

use crate::oracle::{ClusterId, TrainingErrorOracle, UserId};

/// The outcome of re-evaluating one user against every cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    /// The cluster that best explains the user.
    pub cluster: ClusterId,
    /// True only when the user stayed in its current cluster because of a
    /// tie in minimal error with at least one other cluster.
    pub indifferent: bool,
}

/// Decide the new cluster assignment for `user`, currently in `current`.
///
/// The oracle is invoked exactly once per (user, cluster) pair.
pub fn reassign_user<O>(
    oracle: &O,
    user: UserId,
    current: ClusterId,
    num_clusters: usize,
) -> Reassignment
where
    O: TrainingErrorOracle + ?Sized,
{
    debug_assert!(num_clusters > 0, "cluster count must be positive");
    debug_assert!(
        (current as usize) < num_clusters,
        "current cluster {current} out of {num_clusters}"
    );

    // Error row for this user, one score per candidate cluster. Lives only
    // for the duration of this decision.
    let mut errors = Vec::with_capacity(num_clusters);
    for cluster in 0..num_clusters {
        errors.push(oracle.score(user, cluster as ClusterId));
    }

    // Full scan for the minimum, seeded with the current cluster so that a
    // tie with it never moves the user.
    let mut best = errors[current as usize];
    let mut chosen = current;
    for (cluster, &error) in errors.iter().enumerate() {
        if error < best {
            best = error;
            chosen = cluster as ClusterId;
        }
    }

    // Second pass: a user who stayed is indifferent when any other cluster
    // attains the same minimal error.
    let mut indifferent = false;
    if chosen == current {
        indifferent = errors
            .iter()
            .enumerate()
            .any(|(cluster, &error)| cluster as ClusterId != current && error == best);
    }

    Reassignment {
        cluster: chosen,
        indifferent,
    }
}
