//! Fixtures shared by the unit tests

use flight_task_core::{AgentId, Property, Result, Simulator, TaskEnvironment, TaskError};

use crate::PropertyTable;

pub const AGENT: &str = "A0100";

#[derive(Debug)]
pub struct TestEnv {
    pub current_step: usize,
    pub heading_turn_counts: usize,
    pub sim: PropertyTable,
}

impl TaskEnvironment for TestEnv {
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
        if agent_id == AGENT {
            Ok(&self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }

    fn agent_mut(&mut self, agent_id: &AgentId) -> Result<&mut dyn Simulator> {
        if agent_id == AGENT {
            Ok(&mut self.sim)
        } else {
            Err(TaskError::UnknownAgent(agent_id.to_string()))
        }
    }
}

pub fn env_with(values: &[(Property, f64)]) -> TestEnv {
    let sim = PropertyTable::new(1.0 / 60.0)
        .expect("valid dt")
        .with_values(values.iter().copied());
    TestEnv {
        current_step: 0,
        heading_turn_counts: 0,
        sim,
    }
}
