//! Core task-layer traits and types for simulator-driven flight control
//!
//! A task turns raw simulator state into a bounded observation, decodes a
//! multi-discrete policy action into simulator commands, folds an ordered
//! chain of termination conditions into one done signal and sums a list of
//! reward terms into one scalar.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod error;
pub mod observation;
pub mod reward;
pub mod task;
pub mod termination;

#[cfg(test)]
mod testing;

// Re-export core traits and types
pub use action::{ActionChannel, ContinuousCommand, MultiDiscreteAction, MultiDiscreteSpace};
pub use catalog::{Access, Property};
pub use config::{
    ActionBins, DataLossMode, ObservationConfig, RewardConfig, TaskConfig, TerminationConfig,
};
pub use environment::{read_properties, AgentId, Simulator, TaskEnvironment};
pub use error::{Result, TaskError};
pub use observation::{BoxObservationSpace, ChannelScale, ObservationNormalizer, VectorObservation};
pub use reward::{Reward, RewardTerm, RewardTerms, RewardTrajectory};
pub use task::{Task, TaskDescriptor, TaskVariables};
pub use termination::{
    Termination, TerminationCondition, TerminationConditions, TerminationInfo, TerminationOutcome,
    TerminationReason,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        MultiDiscreteAction, Property, Result, Reward, Simulator, Task, TaskConfig,
        TaskEnvironment, Termination, TerminationInfo, VectorObservation,
    };
}
