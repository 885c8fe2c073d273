// src/lib.rs

//! Cluster Refinement Runtime - Core Library
//!
//! This crate implements one refinement step of a distributed
//! clustering-based recommender: every worker re-evaluates which cluster
//! best explains each user in its shard of the population, then the workers
//! merge and redistribute the full result so each one ends the step holding
//! an identical, complete assignment.
//!
//! The training-error function, the sparse data structures behind it, and
//! the outer convergence loop live outside this crate; they plug in through
//! the [`TrainingErrorOracle`] and [`Collective`] seams.

pub mod collective;
pub mod config;
pub mod error;
pub mod executor;
pub mod oracle;
pub mod plan;
pub mod solver;
pub mod step;

// Re-export commonly used types for convenience
pub use collective::{local_group, synchronize, Collective, LocalCollective};
pub use config::RefineConfig;
pub use error::{RefineError, Result};
pub use executor::{run_shard, ShardResult};
pub use oracle::{ClusterId, TrainingErrorOracle, UserId};
pub use plan::{plan_all, plan_shard, ShardRange};
pub use solver::{reassign_user, Reassignment};
pub use step::{refine_step, StepOutput};
