// src/oracle.rs

//! The training-error scoring boundary.
//!
//! The refinement step never inspects the training data or the per-cluster
//! model weights directly; it only asks the oracle how well a cluster's
//! model explains a user. The model store stays entirely behind this seam.

/// Index of a user in `[0, N)`, N being the training population size.
pub type UserId = usize;

/// Index of a cluster in `[0, K)`, K being the configured cluster count.
pub type ClusterId = u32;

/// Scores a (user, cluster) pair against the per-cluster model.
///
/// Implementations must be pure functions of the training data and model
/// weights, which are immutable for the duration of a step, and must be
/// callable from every worker independently. The returned value must be
/// finite for every in-range pair; the step does not sanitize non-finite
/// scores.
pub trait TrainingErrorOracle {
    /// Training error of assigning `user` to `cluster`.
    fn score(&self, user: UserId, cluster: ClusterId) -> f64;
}

impl<F> TrainingErrorOracle for F
where
    F: Fn(UserId, ClusterId) -> f64,
{
    fn score(&self, user: UserId, cluster: ClusterId) -> f64 {
        self(user, cluster)
    }
}
