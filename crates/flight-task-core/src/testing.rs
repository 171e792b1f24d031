//! Fixtures shared by the unit tests

use std::collections::HashMap;

use crate::{
    ActionChannel, AgentId, BoxObservationSpace, MultiDiscreteSpace, Property, Result, Simulator,
    TaskConfig, TaskDescriptor, TaskEnvironment, TaskError, TaskVariables,
};

#[derive(Debug, Default)]
pub struct MockSim {
    pub values: HashMap<Property, f64>,
}

impl Simulator for MockSim {
    fn get_property_values(&self, props: &[Property]) -> Result<Vec<f64>> {
        Ok(props
            .iter()
            .map(|p| self.values.get(p).copied().unwrap_or_default())
            .collect())
    }

    fn set_property_values(&mut self, values: &[(Property, f64)]) -> Result<()> {
        self.values.extend(values.iter().copied());
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockEnv {
    pub current_step: usize,
    pub heading_turn_counts: usize,
    pub sim: MockSim,
}

impl TaskEnvironment for MockEnv {
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
        if agent_id == "A0100" {
            Ok(&self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }

    fn agent_mut(&mut self, agent_id: &AgentId) -> Result<&mut dyn Simulator> {
        if agent_id == "A0100" {
            Ok(&mut self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }
}

pub fn descriptor() -> TaskDescriptor {
    TaskDescriptor::new(
        TaskConfig::default(),
        TaskVariables {
            state: vec![Property::DeltaAltitude],
            action: vec![Property::FcsThrottleCmdNorm],
            render: vec![Property::PositionHSlM],
        },
        BoxObservationSpace::uniform(1, -10.0, 10.0).unwrap(),
        MultiDiscreteSpace::new(vec![ActionChannel::ranged(30, 0.4, 0.9)]).unwrap(),
    )
    .unwrap()
}
