//! Error types for the flight task layer

use thiserror::Error;

/// Core error type for task-layer operations
#[derive(Error, Debug)]
pub enum TaskError {
    /// A property path that is not part of the catalog
    #[error("Unknown simulator property: {0}")]
    UnknownProperty(String),

    /// A read-only property was listed where a command is written
    #[error("Property is read-only: {0}")]
    ReadOnlyProperty(&'static str),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Agent id not managed by the environment
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Task name not present in the registry
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// Failure reported by the simulator backend
    #[error("Simulator error: {0}")]
    Simulator(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for task-layer operations
pub type Result<T> = std::result::Result<T, TaskError>;
