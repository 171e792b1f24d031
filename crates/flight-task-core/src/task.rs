//! Task definition: variable lists, declared spaces and the per-step
//! operations the episode loop calls

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    AgentId, BoxObservationSpace, ContinuousCommand, MultiDiscreteAction, MultiDiscreteSpace,
    Property, Result, Reward, TaskConfig, TaskEnvironment, TaskError, Termination,
    TerminationInfo, VectorObservation,
};

/// Ordered simulator property lists of a task
///
/// Position is load-bearing: index `i` of `state` is observation channel
/// `i`, and index `i` of `action` receives command value `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVariables {
    /// Properties read into the observation
    pub state: Vec<Property>,
    /// Properties receiving decoded commands
    pub action: Vec<Property>,
    /// Properties read for rendering and recording
    pub render: Vec<Property>,
}

impl TaskVariables {
    /// Check the lists are usable
    pub fn validate(&self) -> Result<()> {
        for (name, list) in [("state", &self.state), ("action", &self.action), ("render", &self.render)] {
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|p| !seen.insert(**p)) {
                return Err(TaskError::InvalidConfig(format!(
                    "{name} variables list {dup} more than once"
                )));
            }
        }
        if let Some(prop) = self.action.iter().find(|p| !p.is_writable()) {
            return Err(TaskError::ReadOnlyProperty(prop.path()));
        }
        Ok(())
    }

    /// Resolve lists given as simulator paths
    pub fn from_paths(state: &[&str], action: &[&str], render: &[&str]) -> Result<Self> {
        let resolve = |paths: &[&str]| -> Result<Vec<Property>> {
            paths.iter().map(|p| p.parse()).collect()
        };
        let variables = Self {
            state: resolve(state)?,
            action: resolve(action)?,
            render: resolve(render)?,
        };
        variables.validate()?;
        Ok(variables)
    }
}

/// Immutable description of a task shared with its reward terms and
/// termination conditions
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    config: TaskConfig,
    variables: TaskVariables,
    observation_space: BoxObservationSpace,
    action_space: MultiDiscreteSpace,
}

impl TaskDescriptor {
    /// Validate and bundle the pieces of a task
    ///
    /// The observation box must have one component per state variable and
    /// the action space one channel per action variable.
    pub fn new(
        config: TaskConfig,
        variables: TaskVariables,
        observation_space: BoxObservationSpace,
        action_space: MultiDiscreteSpace,
    ) -> Result<Self> {
        config.validate()?;
        variables.validate()?;
        if observation_space.dim() != variables.state.len() {
            return Err(TaskError::DimensionMismatch {
                expected: variables.state.len(),
                actual: observation_space.dim(),
            });
        }
        if action_space.dim() != variables.action.len() {
            return Err(TaskError::DimensionMismatch {
                expected: variables.action.len(),
                actual: action_space.dim(),
            });
        }
        Ok(Self {
            config,
            variables,
            observation_space,
            action_space,
        })
    }

    /// Task configuration
    #[must_use]
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Property lists
    #[must_use]
    pub fn variables(&self) -> &TaskVariables {
        &self.variables
    }

    /// Declared observation space
    #[must_use]
    pub fn observation_space(&self) -> &BoxObservationSpace {
        &self.observation_space
    }

    /// Declared action space
    #[must_use]
    pub fn action_space(&self) -> &MultiDiscreteSpace {
        &self.action_space
    }

    /// Pair decoded command values with the action variables
    pub fn command_pairs(&self, command: &ContinuousCommand) -> Result<Vec<(Property, f64)>> {
        if command.0.len() != self.variables.action.len() {
            return Err(TaskError::DimensionMismatch {
                expected: self.variables.action.len(),
                actual: command.0.len(),
            });
        }
        Ok(self
            .variables
            .action
            .iter()
            .copied()
            .zip(command.0.iter().copied())
            .collect())
    }
}

/// One control problem: spaces, observation building, action decoding,
/// termination and reward
pub trait Task: Send {
    /// Registry name of the task
    fn name(&self) -> &str;

    /// Number of controllable agents
    fn num_agents(&self) -> usize {
        1
    }

    /// Static description of the task
    fn descriptor(&self) -> &TaskDescriptor;

    /// Declared observation space
    fn observation_space(&self) -> &BoxObservationSpace {
        self.descriptor().observation_space()
    }

    /// Declared action space
    fn action_space(&self) -> &MultiDiscreteSpace {
        self.descriptor().action_space()
    }

    /// Build the normalized observation of an agent
    fn get_obs(&mut self, env: &dyn TaskEnvironment, agent_id: &AgentId) -> Result<VectorObservation>;

    /// Decode a discrete action into simulator command values
    fn normalize_action(
        &self,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
        action: &MultiDiscreteAction,
    ) -> Result<ContinuousCommand>;

    /// Aggregate the termination conditions
    fn get_termination(
        &mut self,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: TerminationInfo,
    ) -> Result<Termination>;

    /// Sum the reward terms
    fn get_reward(&mut self, env: &dyn TaskEnvironment, agent_id: &AgentId) -> Result<Reward>;

    /// Clear per-episode state of reward terms and termination conditions
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::descriptor;
    use crate::ActionChannel;

    #[test]
    fn test_read_only_action_variable() {
        let variables = TaskVariables {
            state: vec![Property::DeltaAltitude],
            action: vec![Property::AttitudeRollRad],
            render: vec![],
        };
        let err = variables.validate().unwrap_err();
        assert!(matches!(err, TaskError::ReadOnlyProperty("attitude/roll-rad")));
    }

    #[test]
    fn test_duplicate_variable() {
        let variables = TaskVariables {
            state: vec![Property::DeltaAltitude, Property::DeltaAltitude],
            action: vec![],
            render: vec![],
        };
        assert!(matches!(variables.validate(), Err(TaskError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_paths_rejects_unknown_property() {
        let err = TaskVariables::from_paths(&["position/h-sl-m", "position/h-agl-ft"], &[], &[])
            .unwrap_err();
        assert!(matches!(err, TaskError::UnknownProperty(ref p) if p == "position/h-agl-ft"));
    }

    #[test]
    fn test_space_must_match_variables() {
        let variables = TaskVariables {
            state: vec![Property::DeltaAltitude, Property::DeltaHeading],
            action: vec![Property::FcsThrottleCmdNorm],
            render: vec![],
        };
        let err = TaskDescriptor::new(
            TaskConfig::default(),
            variables,
            BoxObservationSpace::uniform(3, -1.0, 1.0).unwrap(),
            MultiDiscreteSpace::new(vec![ActionChannel::ranged(30, 0.4, 0.9)]).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_command_pairs() {
        let task = descriptor();
        let pairs = task.command_pairs(&ContinuousCommand(vec![0.5])).unwrap();
        assert_eq!(pairs, vec![(Property::FcsThrottleCmdNorm, 0.5)]);
        assert!(task.command_pairs(&ContinuousCommand(vec![0.5, 0.1])).is_err());
    }
}
