//! Reward signals, reward terms and their aggregation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::{AgentId, Result, TaskDescriptor, TaskEnvironment};

/// Reward signal from the environment
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::Mul<f64> for Reward {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl std::iter::Sum for Reward {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, r| acc + r)
    }
}

/// One shaping term contributing to the step reward
pub trait RewardTerm: Send {
    /// Name of the term, also the key of its scale in the configuration
    fn name(&self) -> &str;

    /// Contribution of this term for the current step
    fn get_reward(
        &mut self,
        task: &TaskDescriptor,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
    ) -> Result<Reward>;

    /// Clear per-episode state
    fn reset(&mut self) {}
}

/// Per-agent history of scaled contributions, owned by a single term
#[derive(Debug, Clone, Default)]
pub struct RewardTrajectory {
    scale: f64,
    by_agent: HashMap<String, Vec<f64>>,
}

impl RewardTrajectory {
    /// Create a trajectory that scales every contribution
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            by_agent: HashMap::new(),
        }
    }

    /// Scale a raw contribution and record it for the agent
    pub fn process(&mut self, raw: f64, agent_id: &AgentId) -> Reward {
        let reward = raw * self.scale;
        self.by_agent
            .entry(agent_id.to_string())
            .or_default()
            .push(reward);
        Reward(reward)
    }

    /// Recorded contributions of an agent
    #[must_use]
    pub fn history(&self, agent_id: &AgentId) -> &[f64] {
        self.by_agent
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Forget all recorded contributions
    pub fn clear(&mut self) {
        self.by_agent.clear();
    }
}

/// Ordered collection of reward terms summed into one scalar
#[derive(Default)]
pub struct RewardTerms {
    terms: Vec<Box<dyn RewardTerm>>,
}

impl RewardTerms {
    /// Create from terms in evaluation order
    #[must_use]
    pub fn new(terms: Vec<Box<dyn RewardTerm>>) -> Self {
        Self { terms }
    }

    /// Number of terms
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether there are no terms
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Names of the terms in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.name()).collect()
    }

    /// Evaluate every term and sum the contributions
    pub fn evaluate(
        &mut self,
        task: &TaskDescriptor,
        env: &dyn TaskEnvironment,
        agent_id: &AgentId,
    ) -> Result<Reward> {
        let mut total = Reward::default();
        for term in &mut self.terms {
            let reward = term.get_reward(task, env, agent_id)?;
            trace!(term = term.name(), agent_id, reward = reward.0, "reward term");
            total = total + reward;
        }
        Ok(total)
    }

    /// Reset every term
    pub fn reset(&mut self) {
        for term in &mut self.terms {
            term.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{descriptor, MockEnv};
    use approx::assert_relative_eq;

    struct Constant {
        value: f64,
        trajectory: RewardTrajectory,
    }

    impl RewardTerm for Constant {
        fn name(&self) -> &str {
            "Constant"
        }

        fn get_reward(
            &mut self,
            _task: &TaskDescriptor,
            _env: &dyn TaskEnvironment,
            agent_id: &AgentId,
        ) -> Result<Reward> {
            Ok(self.trajectory.process(self.value, agent_id))
        }

        fn reset(&mut self) {
            self.trajectory.clear();
        }
    }

    #[test]
    fn test_reward_arithmetic() {
        let r = Reward::new(1.5) + Reward::from(0.5);
        assert_relative_eq!((r * 2.0).value(), 4.0);
        let total: Reward = vec![Reward(1.0), Reward(2.0)].into_iter().sum();
        assert_relative_eq!(f64::from(total), 3.0);
    }

    #[test]
    fn test_terms_are_summed() {
        let task = descriptor();
        let env = MockEnv::default();
        let mut terms = RewardTerms::new(vec![
            Box::new(Constant { value: 1.0, trajectory: RewardTrajectory::new(1.0) }),
            Box::new(Constant { value: -0.25, trajectory: RewardTrajectory::new(2.0) }),
        ]);
        let reward = terms.evaluate(&task, &env, "A0100").unwrap();
        assert_relative_eq!(reward.value(), 0.5);
        assert_eq!(terms.names(), vec!["Constant", "Constant"]);
    }

    #[test]
    fn test_empty_terms_give_zero() {
        let mut terms = RewardTerms::default();
        let reward = terms.evaluate(&descriptor(), &MockEnv::default(), "A0100").unwrap();
        assert_eq!(reward, Reward(0.0));
        assert!(terms.is_empty());
    }

    #[test]
    fn test_trajectory_is_keyed_by_agent() {
        let mut trajectory = RewardTrajectory::new(0.5);
        trajectory.process(2.0, "A0100");
        trajectory.process(4.0, "A0100");
        trajectory.process(8.0, "B0100");
        assert_eq!(trajectory.history("A0100"), &[1.0, 2.0]);
        assert_eq!(trajectory.history("B0100"), &[4.0]);
        assert!(trajectory.history("C0100").is_empty());
        trajectory.clear();
        assert!(trajectory.history("A0100").is_empty());
    }
}
