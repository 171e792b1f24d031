//! Single-agent episode driver
//!
//! Owns one task and one simulator and runs the per-step sequence:
//! decode the action, write commands, advance the simulator, build the
//! observation, check termination, then sum the reward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use flight_task_core::{
    read_properties, AgentId, MultiDiscreteAction, Property, Result, Reward, Simulator, Task,
    TaskEnvironment, TaskError, TerminationInfo, TerminationReason, VectorObservation,
};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the step
    pub observation: VectorObservation,
    /// Summed reward of the step
    pub reward: Reward,
    /// Whether the episode ended
    pub done: bool,
    /// Whether the ending counts as a success
    pub success: bool,
    /// Termination info of the step
    pub info: TerminationInfo,
}

/// Bookkeeping of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode ID
    pub id: Uuid,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Why the episode ended, if it has
    pub termination: Option<TerminationReason>,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: Option<DateTime<Utc>>,
}

/// Per-agent episode state the task is evaluated against
#[derive(Debug)]
struct AgentState<S> {
    agent_id: String,
    sim: S,
    current_step: usize,
    heading_turn_counts: usize,
}

impl<S: Simulator> TaskEnvironment for AgentState<S> {
    fn current_step(&self) -> usize {
        self.current_step
    }

    fn heading_turn_counts(&self) -> usize {
        self.heading_turn_counts
    }

    fn record_heading_turn(&mut self) {
        self.heading_turn_counts += 1;
    }

    fn agent(&self, agent_id: &AgentId) -> Result<&dyn Simulator> {
        if agent_id == self.agent_id {
            Ok(&self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }

    fn agent_mut(&mut self, agent_id: &AgentId) -> Result<&mut dyn Simulator> {
        if agent_id == self.agent_id {
            Ok(&mut self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }
}

/// Environment loop for a single-agent task
pub struct SingleControlEnv<S> {
    task: Box<dyn Task>,
    state: AgentState<S>,
    agent_interaction_steps: usize,
    episode: Option<EpisodeSummary>,
}

impl<S: Simulator> SingleControlEnv<S> {
    /// Simulator steps per agent step unless overridden
    pub const DEFAULT_INTERACTION_STEPS: usize = 12;

    /// Create a driver for a single-agent task
    pub fn new(task: Box<dyn Task>, sim: S, agent_id: impl Into<String>) -> Result<Self> {
        if task.num_agents() != 1 {
            return Err(TaskError::InvalidConfig(format!(
                "task {} manages {} agents, expected 1",
                task.name(),
                task.num_agents()
            )));
        }
        Ok(Self {
            task,
            state: AgentState {
                agent_id: agent_id.into(),
                sim,
                current_step: 0,
                heading_turn_counts: 0,
            },
            agent_interaction_steps: Self::DEFAULT_INTERACTION_STEPS,
            episode: None,
        })
    }

    /// Set how many simulator steps run per agent step
    pub fn with_interaction_steps(mut self, steps: usize) -> Result<Self> {
        if steps == 0 {
            return Err(TaskError::InvalidConfig("agent_interaction_steps must be positive".into()));
        }
        self.agent_interaction_steps = steps;
        Ok(self)
    }

    /// The driven task
    #[must_use]
    pub fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }

    /// The agent's simulator
    #[must_use]
    pub fn simulator(&self) -> &S {
        &self.state.sim
    }

    /// Mutable access to the agent's simulator
    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.state.sim
    }

    /// Steps elapsed in the current episode
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    /// Target changes completed in the current episode
    #[must_use]
    pub fn heading_turn_counts(&self) -> usize {
        self.state.heading_turn_counts
    }

    /// Bookkeeping of the current or last episode
    #[must_use]
    pub fn episode(&self) -> Option<&EpisodeSummary> {
        self.episode.as_ref()
    }

    /// Start a new episode from the given initial conditions
    pub fn reset(&mut self, initial_conditions: &[(Property, f64)]) -> Result<VectorObservation> {
        self.state.sim.set_property_values(initial_conditions)?;
        self.state.current_step = 0;
        self.state.heading_turn_counts = 0;
        self.task.reset();

        let id = Uuid::new_v4();
        debug!(%id, agent_id = %self.state.agent_id, "episode reset");
        self.episode = Some(EpisodeSummary {
            id,
            total_reward: 0.0,
            steps: 0,
            termination: None,
            start_time: Utc::now(),
            end_time: None,
        });

        self.task.get_obs(&self.state, &self.state.agent_id)
    }

    /// Apply an action and advance the episode by one agent step
    pub fn step(&mut self, action: &MultiDiscreteAction) -> Result<StepResult> {
        let agent_id = self.state.agent_id.clone();

        let command = self.task.normalize_action(&self.state, &agent_id, action)?;
        let pairs = self.task.descriptor().command_pairs(&command)?;
        self.state.sim.set_property_values(&pairs)?;
        for _ in 0..self.agent_interaction_steps {
            self.state.sim.run()?;
        }
        self.state.current_step += 1;

        let observation = self.task.get_obs(&self.state, &agent_id)?;
        let info = TerminationInfo::new(self.state.current_step);
        let termination = self.task.get_termination(&mut self.state, &agent_id, info)?;
        let reward = self.task.get_reward(&self.state, &agent_id)?;

        if let Some(episode) = self.episode.as_mut() {
            episode.total_reward += reward.0;
            episode.steps = self.state.current_step;
            if termination.done {
                episode.termination = termination.info.termination;
                episode.end_time = Some(Utc::now());
                info!(
                    id = %episode.id,
                    steps = episode.steps,
                    total_reward = episode.total_reward,
                    reason = ?episode.termination,
                    "episode finished"
                );
            }
        }

        Ok(StepResult {
            observation,
            reward,
            done: termination.done,
            success: termination.success,
            info: termination.info,
        })
    }

    /// Read the task's render variables
    pub fn render_state(&self) -> Result<Vec<f64>> {
        read_properties(&self.state.sim, &self.task.descriptor().variables().render)
    }
}
