// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefineError {

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to allocate {what} ({len} elements)")]
    Allocation {
        what: &'static str,
        len: usize,
    },

    #[error("Collective size mismatch: expected {expected} elements, got {actual}")]
    CollectiveMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("Worker {rank} is unreachable")]
    WorkerUnreachable {
        rank: usize,
    },

    #[error("Collective error: {message}")]
    Collective {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, RefineError>;

// Convenience constructors
impl RefineError {

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn allocation(what: &'static str, len: usize) -> Self {
        Self::Allocation { what, len }
    }

    pub fn collective_mismatch(expected: usize, actual: usize) -> Self {
        Self::CollectiveMismatch { expected, actual }
    }

    pub fn worker_unreachable(rank: usize) -> Self {
        Self::WorkerUnreachable { rank }
    }

    pub fn collective(message: impl Into<String>) -> Self {
        Self::Collective {
            message: message.into(),
        }
    }
}
