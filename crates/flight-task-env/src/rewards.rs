//! Reward terms of the heading task

use flight_task_core::{
    read_properties, AgentId, Property, Result, Reward, RewardTerm, RewardTrajectory, TaskConfig,
    TaskDescriptor, TaskEnvironment,
};

/// Gaussian-shaped closeness of an error to zero
fn closeness(error: f64, scale: f64) -> f64 {
    (-(error / scale).powi(2)).exp()
}

/// Rewards tracking heading, altitude and speed targets with wings level
///
/// Geometric mean of four Gaussian closeness factors.
#[derive(Debug, Clone)]
pub struct HeadingReward {
    trajectory: RewardTrajectory,
}

impl HeadingReward {
    /// Heading error scale (deg)
    pub const HEADING_ERROR_SCALE: f64 = 5.0;
    /// Altitude error scale (m)
    pub const ALTITUDE_ERROR_SCALE: f64 = 15.24;
    /// Roll error scale (rad)
    pub const ROLL_ERROR_SCALE: f64 = 0.35;
    /// Speed error scale (m/s)
    pub const SPEED_ERROR_SCALE: f64 = 24.0;

    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            trajectory: RewardTrajectory::new(config.reward.scale("HeadingReward")),
        }
    }

    /// Recorded contributions of an agent
    #[must_use]
    pub fn history(&self, agent_id: &AgentId) -> &[f64] {
        self.trajectory.history(agent_id)
    }
}

impl RewardTerm for HeadingReward {
    fn name(&self) -> &str {
        "HeadingReward"
    }

    fn get_reward(
        &mut self,
        _task: &TaskDescriptor,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
    ) -> Result<Reward> {
        let values = read_properties(
            env.agent(agent_id)?,
            &[
                Property::DeltaHeading,
                Property::DeltaAltitude,
                Property::AttitudeRollRad,
                Property::DeltaVelocitiesU,
            ],
        )?;
        let r_heading = closeness(values[0], Self::HEADING_ERROR_SCALE);
        let r_alt = closeness(values[1], Self::ALTITUDE_ERROR_SCALE);
        let r_roll = closeness(values[2], Self::ROLL_ERROR_SCALE);
        let r_speed = closeness(values[3], Self::SPEED_ERROR_SCALE);

        let reward = (r_heading * r_alt * r_roll * r_speed).powf(0.25);
        Ok(self.trajectory.process(reward, agent_id))
    }

    fn reset(&mut self) {
        self.trajectory.clear();
    }
}

/// Penalises sinking below a safe altitude and flying below a danger
/// altitude
#[derive(Debug, Clone)]
pub struct AltitudeReward {
    safe_altitude: f64,
    danger_altitude: f64,
    kv: f64,
    trajectory: RewardTrajectory,
}

impl AltitudeReward {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            safe_altitude: config.reward.safe_altitude_km,
            danger_altitude: config.reward.danger_altitude_km,
            kv: config.reward.kv,
            trajectory: RewardTrajectory::new(config.reward.scale("AltitudeReward")),
        }
    }

    /// Raw penalty for an altitude (km) and sink rate (mach)
    #[must_use]
    pub fn penalty(&self, ego_z: f64, ego_vz: f64) -> f64 {
        let mut p_v = 0.0;
        if ego_z <= self.safe_altitude {
            p_v = -(ego_vz / self.kv * (self.safe_altitude - ego_z) / self.safe_altitude).clamp(0.0, 1.0);
        }
        let mut p_h = 0.0;
        if ego_z <= self.danger_altitude {
            p_h = (ego_z / self.danger_altitude).clamp(0.0, 1.0) - 1.0 - 1.0;
        }
        p_v + p_h
    }
}

impl RewardTerm for AltitudeReward {
    fn name(&self) -> &str {
        "AltitudeReward"
    }

    fn get_reward(
        &mut self,
        _task: &TaskDescriptor,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
    ) -> Result<Reward> {
        let values = read_properties(
            env.agent(agent_id)?,
            &[Property::PositionHSlM, Property::VelocitiesVDownMps],
        )?;
        let ego_z = values[0] / 1000.0;
        let ego_vz = values[1] / 340.0;
        let reward = self.penalty(ego_z, ego_vz);
        Ok(self.trajectory.process(reward, agent_id))
    }

    fn reset(&mut self) {
        self.trajectory.clear();
    }
}

/// Pays a bonus once the episode reaches its step budget
#[derive(Debug, Clone)]
pub struct TimeoutReward {
    max_steps: usize,
    bonus: f64,
    trajectory: RewardTrajectory,
}

impl TimeoutReward {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            bonus: config.reward.timeout_bonus,
            trajectory: RewardTrajectory::new(config.reward.scale("TimeoutReward")),
        }
    }
}

impl RewardTerm for TimeoutReward {
    fn name(&self) -> &str {
        "TimeoutReward"
    }

    fn get_reward(
        &mut self,
        _task: &TaskDescriptor,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
    ) -> Result<Reward> {
        let reward = if env.current_step() >= self.max_steps { self.bonus } else { 0.0 };
        Ok(self.trajectory.process(reward, agent_id))
    }

    fn reset(&mut self) {
        self.trajectory.clear();
    }
}
