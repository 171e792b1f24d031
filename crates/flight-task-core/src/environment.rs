//! Boundary traits between tasks, the simulator and the episode loop

use crate::{Property, Result, TaskError};

/// Identifier of a controllable agent
pub type AgentId = str;

/// Per-agent flight-dynamics simulator
///
/// Treated as an opaque stateful oracle: named property reads and writes
/// plus a step function. Implementations must return values in the order
/// the properties were requested, one value per property.
pub trait Simulator: Send {
    /// Read several properties in order
    fn get_property_values(&self, props: &[Property]) -> Result<Vec<f64>>;

    /// Write several properties
    fn set_property_values(&mut self, values: &[(Property, f64)]) -> Result<()>;

    /// Advance simulated time by one integration step
    fn run(&mut self) -> Result<()>;

    /// Read a single property
    fn get_property_value(&self, prop: Property) -> Result<f64> {
        let values = self.get_property_values(&[prop])?;
        values
            .first()
            .copied()
            .ok_or(TaskError::DimensionMismatch { expected: 1, actual: 0 })
    }

    /// Write a single property
    fn set_property_value(&mut self, prop: Property, value: f64) -> Result<()> {
        self.set_property_values(&[(prop, value)])
    }
}

/// View of the episode loop that tasks, reward terms and termination
/// conditions are evaluated against
pub trait TaskEnvironment {
    /// Steps elapsed in the current episode
    fn current_step(&self) -> usize;

    /// Number of target changes the agent has completed this episode
    fn heading_turn_counts(&self) -> usize;

    /// Record that a new heading target was issued
    fn record_heading_turn(&mut self);

    /// Simulator of the given agent
    fn agent(&self, agent_id: &AgentId) -> Result<&dyn Simulator>;

    /// Mutable simulator of the given agent
    fn agent_mut(&mut self, agent_id: &AgentId) -> Result<&mut dyn Simulator>;
}

/// Read properties and check the simulator honoured the length contract
pub fn read_properties(sim: &dyn Simulator, props: &[Property]) -> Result<Vec<f64>> {
    let values = sim.get_property_values(props)?;
    if values.len() != props.len() {
        return Err(TaskError::DimensionMismatch {
            expected: props.len(),
            actual: values.len(),
        });
    }
    Ok(values)
}
