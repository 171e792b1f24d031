//! Termination conditions of the heading task

use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use flight_task_core::{
    read_properties, AgentId, Property, Result, TaskConfig, TaskDescriptor, TaskEnvironment,
    TerminationCondition, TerminationInfo, TerminationOutcome, TerminationReason,
};

use crate::seeded_rng;

const TARGET_RNG_STREAM: u64 = 2;

/// Ends the episode when the heading target is missed at a check, and
/// issues a new target when it is met
///
/// Each new target is a uniform draw around the current one whose width
/// grows with the number of targets already reached.
#[derive(Debug, Clone)]
pub struct UnreachHeading {
    heading_tolerance: f64,
    check_interval: f64,
    max_heading_increment: f64,
    max_altitude_increment: f64,
    max_velocities_u_increment: f64,
    increment_size: Vec<f64>,
    rng: StdRng,
}

impl UnreachHeading {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        let t = &config.termination;
        Self {
            heading_tolerance: t.heading_tolerance_deg,
            check_interval: t.check_interval_sec,
            max_heading_increment: t.max_heading_increment_deg,
            max_altitude_increment: t.max_altitude_increment_ft,
            max_velocities_u_increment: t.max_velocities_u_increment_mps,
            increment_size: t.increment_size.clone(),
            rng: seeded_rng(config.seed, TARGET_RNG_STREAM),
        }
    }

    fn retarget(
        &mut self,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        check_time: f64,
    ) -> Result<()> {
        let turns = env.heading_turn_counts();
        // past the schedule the widest increment is reused
        let delta = self
            .increment_size
            .get(turns)
            .or_else(|| self.increment_size.last())
            .copied()
            .unwrap_or(1.0);
        let delta_heading = self.rng.gen_range(-delta..=delta) * self.max_heading_increment;
        let delta_altitude = self.rng.gen_range(-delta..=delta) * self.max_altitude_increment;
        let delta_velocities_u = self.rng.gen_range(-delta..=delta) * self.max_velocities_u_increment;

        let sim = env.agent_mut(agent_id)?;
        let targets = read_properties(
            &*sim,
            &[
                Property::TargetHeadingDeg,
                Property::TargetAltitudeFt,
                Property::TargetVelocitiesUMps,
            ],
        )?;
        let new_heading = (targets[0] + delta_heading).rem_euclid(360.0);
        let new_altitude = targets[1] + delta_altitude;
        let new_velocities_u = targets[2] + delta_velocities_u;
        sim.set_property_values(&[
            (Property::TargetHeadingDeg, new_heading),
            (Property::TargetAltitudeFt, new_altitude),
            (Property::TargetVelocitiesUMps, new_velocities_u),
            (Property::HeadingCheckTime, check_time + self.check_interval),
        ])?;
        env.record_heading_turn();

        info!(
            agent_id,
            turn = env.heading_turn_counts(),
            new_heading,
            new_altitude,
            new_velocities_u,
            "target changed"
        );
        Ok(())
    }
}

impl TerminationCondition for UnreachHeading {
    fn name(&self) -> &str {
        "UnreachHeading"
    }

    fn get_termination(
        &mut self,
        _task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome> {
        let values = read_properties(
            env.agent(agent_id)?,
            &[
                Property::SimulationSimTimeSec,
                Property::HeadingCheckTime,
                Property::DeltaHeading,
            ],
        )?;
        let (sim_time, check_time, delta_heading) = (values[0], values[1], values[2]);
        if sim_time < check_time {
            return Ok(TerminationOutcome::CONTINUE);
        }

        if delta_heading.abs() > self.heading_tolerance {
            info.termination = Some(TerminationReason::UnreachHeading);
            info.heading_turn_counts = Some(env.heading_turn_counts());
            info.insert("heading_error_deg", delta_heading);
            info!(agent_id, step = env.current_step(), delta_heading, "unreached heading");
            return Ok(TerminationOutcome::FAILURE);
        }

        self.retarget(env, agent_id, check_time)?;
        Ok(TerminationOutcome::CONTINUE)
    }
}

/// Ends the episode when the simulator flags an extreme state
#[derive(Debug, Clone, Default)]
pub struct ExtremeState;

impl ExtremeState {
    /// Create from the task configuration
    #[must_use]
    pub fn new(_config: &TaskConfig) -> Self {
        Self
    }
}

impl TerminationCondition for ExtremeState {
    fn name(&self) -> &str {
        "ExtremeState"
    }

    fn get_termination(
        &mut self,
        _task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome> {
        let flag = env.agent(agent_id)?.get_property_value(Property::DetectExtremeState)?;
        if flag == 0.0 {
            return Ok(TerminationOutcome::CONTINUE);
        }
        info.termination = Some(TerminationReason::ExtremeState);
        info!(agent_id, step = env.current_step(), "extreme state");
        Ok(TerminationOutcome::FAILURE)
    }
}

/// Ends the episode when any pilot load factor exceeds its limit
#[derive(Debug, Clone)]
pub struct Overload {
    limits: [f64; 3],
    grace_sec: f64,
}

impl Overload {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        let t = &config.termination;
        Self {
            limits: [t.acceleration_limit_x, t.acceleration_limit_y, t.acceleration_limit_z],
            grace_sec: t.overload_grace_sec,
        }
    }
}

impl TerminationCondition for Overload {
    fn name(&self) -> &str {
        "Overload"
    }

    fn get_termination(
        &mut self,
        _task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome> {
        let values = read_properties(
            env.agent(agent_id)?,
            &[
                Property::SimulationSimTimeSec,
                Property::AccelerationsNPilotXNorm,
                Property::AccelerationsNPilotYNorm,
                Property::AccelerationsNPilotZNorm,
            ],
        )?;
        // load factors spike while the airframe settles after initialisation
        if values[0] <= self.grace_sec {
            return Ok(TerminationOutcome::CONTINUE);
        }
        let overloaded = values[1..]
            .iter()
            .zip(&self.limits)
            .any(|(n, limit)| n.abs() > *limit);
        if !overloaded {
            return Ok(TerminationOutcome::CONTINUE);
        }
        info.termination = Some(TerminationReason::Overload);
        info!(agent_id, step = env.current_step(), "acceleration overload");
        Ok(TerminationOutcome::FAILURE)
    }
}

/// Ends the episode when the aircraft descends to the altitude floor
#[derive(Debug, Clone)]
pub struct LowAltitude {
    altitude_limit: f64,
}

impl LowAltitude {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            altitude_limit: config.termination.altitude_limit_m,
        }
    }
}

impl TerminationCondition for LowAltitude {
    fn name(&self) -> &str {
        "LowAltitude"
    }

    fn get_termination(
        &mut self,
        _task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome> {
        let altitude = env.agent(agent_id)?.get_property_value(Property::PositionHSlM)?;
        if altitude > self.altitude_limit {
            return Ok(TerminationOutcome::CONTINUE);
        }
        info.termination = Some(TerminationReason::LowAltitude);
        info!(agent_id, step = env.current_step(), altitude, "altitude too low");
        Ok(TerminationOutcome::FAILURE)
    }
}

/// Ends the episode when the step budget is exhausted
#[derive(Debug, Clone)]
pub struct Timeout {
    max_steps: usize,
}

impl Timeout {
    /// Create from the task configuration
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            max_steps: config.max_steps,
        }
    }
}

impl TerminationCondition for Timeout {
    fn name(&self) -> &str {
        "Timeout"
    }

    fn get_termination(
        &mut self,
        _task: &TaskDescriptor,
        env: &mut dyn TaskEnvironment,
        agent_id: &AgentId,
        info: &mut TerminationInfo,
    ) -> Result<TerminationOutcome> {
        if env.current_step() < self.max_steps {
            return Ok(TerminationOutcome::CONTINUE);
        }
        info.termination = Some(TerminationReason::Timeout);
        info!(agent_id, step = env.current_step(), "step limit reached");
        Ok(TerminationOutcome::FAILURE)
    }
}
