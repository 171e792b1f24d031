//! Heading-control task with a multi-discrete action space
//!
//! The agent holds a target heading, altitude and speed. Targets change
//! every time one is reached (see [`UnreachHeading`]).

use tracing::debug;

use flight_task_core::{
    read_properties, ActionChannel, ActionBins, AgentId, BoxObservationSpace, ChannelScale,
    ContinuousCommand, MultiDiscreteAction, MultiDiscreteSpace, ObservationNormalizer, Property,
    Result, Reward, RewardTerms, Task, TaskConfig, TaskDescriptor, TaskEnvironment, TaskVariables,
    Termination, TerminationConditions, TerminationInfo, VectorObservation,
};

use crate::rewards::{AltitudeReward, HeadingReward, TimeoutReward};
use crate::seeded_rng;
use crate::terminations::{ExtremeState, LowAltitude, Overload, Timeout, UnreachHeading};

const OBSERVATION_RNG_STREAM: u64 = 1;

/// Heading-control task
pub struct HeadingTask {
    descriptor: TaskDescriptor,
    normalizer: ObservationNormalizer,
    rewards: RewardTerms,
    terminations: TerminationConditions,
}

impl HeadingTask {
    /// Registry name
    pub const NAME: &'static str = "heading";

    /// Observation bound, applied symmetrically to every component
    pub const OBSERVATION_BOUND: f64 = 10.0;

    /// Throttle command range
    pub const THROTTLE_RANGE: (f64, f64) = (0.4, 0.9);

    /// Build the task; configuration errors surface here, never per step
    pub fn new(config: TaskConfig) -> Result<Self> {
        config.validate()?;
        let variables = Self::load_variables();
        let observation_space = Self::load_observation_space(variables.state.len())?;
        let action_space = Self::load_action_space(&config.action_bins)?;

        let normalizer = ObservationNormalizer::new(
            Self::observation_scales(),
            observation_space.clone(),
            config.observation.clone(),
            seeded_rng(config.seed, OBSERVATION_RNG_STREAM),
        )?;

        let rewards = RewardTerms::new(vec![
            Box::new(HeadingReward::new(&config)),
            Box::new(AltitudeReward::new(&config)),
            Box::new(TimeoutReward::new(&config)),
        ]);
        let terminations = TerminationConditions::new(vec![
            Box::new(UnreachHeading::new(&config)),
            Box::new(ExtremeState::new(&config)),
            Box::new(Overload::new(&config)),
            Box::new(LowAltitude::new(&config)),
            Box::new(Timeout::new(&config)),
        ]);

        let descriptor = TaskDescriptor::new(config, variables, observation_space, action_space)?;
        debug!(
            rewards = ?rewards.names(),
            terminations = ?terminations.names(),
            obs_dim = descriptor.observation_space().dim(),
            nvec = ?descriptor.action_space().nvec(),
            "heading task constructed"
        );

        Ok(Self {
            descriptor,
            normalizer,
            rewards,
            terminations,
        })
    }

    /// Property lists of the task
    #[must_use]
    pub fn load_variables() -> TaskVariables {
        TaskVariables {
            state: vec![
                Property::DeltaAltitude,
                Property::DeltaHeading,
                Property::DeltaVelocitiesU,
                Property::PositionHSlM,
                Property::AttitudePitchRad,
                Property::AttitudeRollRad,
                Property::VelocitiesUMps,
                Property::VelocitiesVMps,
                Property::VelocitiesWMps,
                Property::VelocitiesPRadSec,
                Property::VelocitiesQRadSec,
                Property::VelocitiesRRadSec,
                Property::FcsLeftAileronPosNorm,
                Property::FcsRightAileronPosNorm,
                Property::FcsElevatorPosNorm,
                Property::FcsRudderPosNorm,
                Property::AeroBetaDeg,
            ],
            action: vec![
                Property::FcsAileronCmdNorm,
                Property::FcsElevatorCmdNorm,
                Property::FcsRudderCmdNorm,
                Property::FcsThrottleCmdNorm,
            ],
            render: vec![
                Property::PositionLongGcDeg,
                Property::PositionLatGeodDeg,
                Property::PositionHSlM,
                Property::AttitudeRollRad,
                Property::AttitudePitchRad,
                Property::AttitudeHeadingTrueRad,
            ],
        }
    }

    /// Observation box for `dim` state variables
    pub fn load_observation_space(dim: usize) -> Result<BoxObservationSpace> {
        BoxObservationSpace::uniform(dim, -Self::OBSERVATION_BOUND, Self::OBSERVATION_BOUND)
    }

    /// Aileron, elevator and rudder over [-1, 1]; throttle over
    /// [`Self::THROTTLE_RANGE`]
    pub fn load_action_space(bins: &ActionBins) -> Result<MultiDiscreteSpace> {
        let (throttle_low, throttle_high) = Self::THROTTLE_RANGE;
        MultiDiscreteSpace::new(vec![
            ActionChannel::symmetric(bins.aileron),
            ActionChannel::symmetric(bins.elevator),
            ActionChannel::symmetric(bins.rudder),
            ActionChannel::ranged(bins.throttle, throttle_low, throttle_high),
        ])
    }

    /// Per-channel scales, positionally matching the state variables
    #[must_use]
    pub fn observation_scales() -> Vec<ChannelScale> {
        use ChannelScale::{DegreesToRadians, Divide, Identity};
        vec![
            Divide(1000.0),   // delta altitude, km
            DegreesToRadians, // delta heading
            Divide(340.0),    // delta speed, mach
            Divide(5000.0),   // altitude, 5 km
            Identity,         // pitch
            Identity,         // roll
            Divide(340.0),    // body u
            Divide(340.0),    // body v
            Divide(340.0),    // body w
            Identity,         // p
            Identity,         // q
            Identity,         // r
            Identity,         // left aileron
            Identity,         // right aileron
            Identity,         // elevator
            Identity,         // rudder
            DegreesToRadians, // sideslip
        ]
    }
}

impl Task for HeadingTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn get_obs(&mut self, env: &dyn TaskEnvironment, agent_id: &AgentId) -> Result<VectorObservation> {
        let raw = read_properties(env.agent(agent_id)?, &self.descriptor.variables().state)?;
        self.normalizer.normalize(&raw)
    }

    fn normalize_action(
        &self,
        _env: &dyn TaskEnvironment,
        _agent_id: &AgentId,
        action: &MultiDiscreteAction,
    ) -> Result<ContinuousCommand> {
        self.descriptor.action_space().decode(action)
    }

    fn get_termination(
        &mut self,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: TerminationInfo,
    ) -> Result<Termination> {
        self.terminations.evaluate(&self.descriptor, env, agent_id, info)
    }

    fn get_reward(&mut self, env: &dyn TaskEnvironment, agent_id: &AgentId) -> Result<Reward> {
        self.rewards.evaluate(&self.descriptor, env, agent_id)
    }

    fn reset(&mut self) {
        self.rewards.reset();
        self.terminations.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{env_with, AGENT};
    use approx::assert_relative_eq;
    use flight_task_core::{DataLossMode, TaskError, TerminationReason};
    use std::f64::consts::PI;

    fn task() -> HeadingTask {
        HeadingTask::new(TaskConfig::default()).unwrap()
    }

    #[test]
    fn test_declared_shapes_match_pipeline() {
        let task = task();
        assert_eq!(task.num_agents(), 1);
        assert_eq!(task.observation_space().dim(), 17);
        assert_eq!(HeadingTask::observation_scales().len(), 17);
        assert_eq!(task.action_space().nvec(), vec![41, 41, 41, 30]);
        assert_eq!(task.descriptor().variables().action.len(), 4);
    }

    #[test]
    fn test_delta_altitude_scaling() {
        let mut task = task();
        let env = env_with(&[(Property::DeltaAltitude, 1000.0)]);
        let obs = task.get_obs(&env, AGENT).unwrap();
        assert_eq!(obs.len(), 17);
        assert_eq!(obs.data[0], 1.0);
    }

    #[test]
    fn test_angle_channels_in_radians() {
        let mut task = task();
        let env = env_with(&[(Property::DeltaHeading, 90.0), (Property::AeroBetaDeg, -180.0)]);
        let obs = task.get_obs(&env, AGENT).unwrap();
        assert_relative_eq!(obs.data[1], PI / 2.0);
        assert_relative_eq!(obs.data[16], -PI);
    }

    #[test]
    fn test_far_out_of_range_values_are_clipped() {
        let mut task = task();
        let env = env_with(&[
            (Property::DeltaAltitude, 50_000.0),
            (Property::VelocitiesPRadSec, -50_000.0),
        ]);
        let obs = task.get_obs(&env, AGENT).unwrap();
        assert_eq!(obs.data[0], 10.0);
        assert_eq!(obs.data[9], -10.0);
        assert!(task.observation_space().contains(&obs));
    }

    #[test]
    fn test_get_obs_is_idempotent() {
        let mut task = task();
        let env = env_with(&[
            (Property::DeltaAltitude, 123.0),
            (Property::DeltaHeading, -33.0),
            (Property::PositionHSlM, 6096.0),
            (Property::VelocitiesUMps, 240.0),
        ]);
        let first = task.get_obs(&env, AGENT).unwrap();
        let second = task.get_obs(&env, AGENT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_enabled_data_loss_changes_observation() {
        let mut config = TaskConfig {
            seed: Some(5),
            ..TaskConfig::default()
        };
        config.observation.data_loss = DataLossMode::Enabled;
        config.observation.data_loss_prop = 1.0;
        let mut task = HeadingTask::new(config).unwrap();
        let env = env_with(&[(Property::DeltaAltitude, 1000.0)]);
        assert_eq!(task.get_obs(&env, AGENT).unwrap().data, vec![0.0; 17]);
    }

    #[test]
    fn test_throttle_decoding() {
        let task = task();
        let env = env_with(&[]);
        let top = task
            .normalize_action(&env, AGENT, &vec![20, 20, 20, 29].into())
            .unwrap();
        assert_eq!(top.as_slice(), &[0.0, 0.0, 0.0, 0.9]);
        let bottom = task
            .normalize_action(&env, AGENT, &vec![0, 40, 0, 0].into())
            .unwrap();
        assert_eq!(bottom.as_slice(), &[-1.0, 1.0, -1.0, 0.4]);
    }

    #[test]
    fn test_action_arity_is_checked() {
        let task = task();
        let err = task
            .normalize_action(&env_with(&[]), AGENT, &vec![1, 2].into())
            .unwrap_err();
        assert!(matches!(err, TaskError::DimensionMismatch { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_termination_priority() {
        let mut task = task();
        // low altitude and timeout both hold; low altitude is declared first
        let mut env = env_with(&[(Property::PositionHSlM, 1000.0)]);
        env.current_step = 500;
        let result = task
            .get_termination(&mut env, AGENT, TerminationInfo::default())
            .unwrap();
        assert!(result.done);
        assert!(!result.success);
        assert_eq!(result.info.termination, Some(TerminationReason::LowAltitude));
        assert_eq!(result.info.end_step, Some(500));
    }

    #[test]
    fn test_not_terminal_in_level_flight() {
        let mut task = task();
        let mut env = env_with(&[
            (Property::PositionHSlM, 6000.0),
            (Property::HeadingCheckTime, 30.0),
        ]);
        let result = task
            .get_termination(&mut env, AGENT, TerminationInfo::default())
            .unwrap();
        assert!(!result.done);
        assert_eq!(result.info.termination, None);
    }

    #[test]
    fn test_reward_sums_terms() {
        let mut task = task();
        let mut env = env_with(&[(Property::PositionHSlM, 6000.0)]);
        env.current_step = 500;
        let reward = task.get_reward(&env, AGENT).unwrap();
        // on target: heading 1.0, altitude 0.0, timeout 10.0
        assert_relative_eq!(reward.value(), 11.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = TaskConfig::default();
        config.action_bins.throttle = 1;
        assert!(HeadingTask::new(config).is_err());
    }

    #[test]
    fn test_negative_increment_fails_at_construction() {
        let mut config = TaskConfig::default();
        config.termination.increment_size = vec![-0.5];
        let err = HeadingTask::new(config).err().unwrap();
        assert!(matches!(err, TaskError::InvalidConfig(_)));
    }
}
