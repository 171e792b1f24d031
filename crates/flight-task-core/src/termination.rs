//! Termination conditions and their ordered, short-circuiting aggregation
//!
//! Conditions run strictly in declared order. The first one that reports
//! done stops the evaluation, so the order is the priority policy: the
//! reason it records is the reason the episode ended.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AgentId, Result, TaskDescriptor, TaskEnvironment};

/// Cause recorded by the condition that ended an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Heading target not reached by the check time
    UnreachHeading,
    /// Airframe entered an unrecoverable state
    ExtremeState,
    /// Pilot load factor limit exceeded
    Overload,
    /// Altitude fell to the floor
    LowAltitude,
    /// Step budget exhausted
    Timeout,
}

/// Per-call accumulator threaded through the condition chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminationInfo {
    /// Step the check was made at
    pub current_step: usize,
    /// Cause of termination; absent unless a condition fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
    /// Completed target changes, filled when the episode ends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_turn_counts: Option<usize>,
    /// Final step index, filled when the episode ends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_step: Option<usize>,
    /// Condition-specific extras
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TerminationInfo {
    /// Fresh accumulator for a step
    #[must_use]
    pub fn new(current_step: usize) -> Self {
        Self {
            current_step,
            ..Self::default()
        }
    }

    /// Attach a condition-specific value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Verdict of a single condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationOutcome {
    /// Whether the episode should end
    pub done: bool,
    /// Whether the ending counts as a success
    pub success: bool,
}

impl TerminationOutcome {
    /// Episode continues
    pub const CONTINUE: Self = Self { done: false, success: true };

    /// Episode ends in failure
    pub const FAILURE: Self = Self { done: true, success: false };
}

/// Pluggable predicate deciding whether and why an episode ends
///
/// A condition that reports done is expected to set
/// [`TerminationInfo::termination`] before returning. It must not assume a
/// rank in the chain.
pub trait TerminationCondition: Send {
    /// Name of the condition
    fn name(&self) -> &str;

    /// Evaluate the condition for the current step
    fn get_termination(
        &mut self,
        task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome>;

    /// Clear per-episode state
    fn reset(&mut self) {}
}

/// Aggregated verdict of the whole chain
#[derive(Debug, Clone, PartialEq)]
pub struct Termination {
    /// OR of the evaluated conditions' done flags
    pub done: bool,
    /// AND of the evaluated conditions' success flags
    pub success: bool,
    /// Accumulated info
    pub info: TerminationInfo,
}

/// Ordered chain of termination conditions
#[derive(Default)]
pub struct TerminationConditions {
    conditions: Vec<Box<dyn TerminationCondition>>,
}

impl TerminationConditions {
    /// Create from conditions in priority order
    #[must_use]
    pub fn new(conditions: Vec<Box<dyn TerminationCondition>>) -> Self {
        Self { conditions }
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Names of the conditions in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name()).collect()
    }

    /// Evaluate conditions in order, stopping at the first that reports done
    pub fn evaluate(
        &mut self,
        task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        mut info: TerminationInfo,
    ) -> Result<Termination> {
        let mut done = false;
        let mut success = true;
        info.current_step = env.current_step();
        info.termination = None;

        for condition in &mut self.conditions {
            let outcome = condition.get_termination(task, env, agent_id, &mut info)?;
            done = done || outcome.done;
            success = success && outcome.success;

            if done {
                info.heading_turn_counts = Some(env.heading_turn_counts());
                info.end_step = Some(env.current_step());
                debug!(
                    condition = condition.name(),
                    agent_id,
                    reason = ?info.termination,
                    step = env.current_step(),
                    "episode terminated"
                );
                break;
            }
        }

        Ok(Termination { done, success, info })
    }

    /// Reset every condition
    pub fn reset(&mut self) {
        for condition in &mut self.conditions {
            condition.reset();
        }
    }
}
