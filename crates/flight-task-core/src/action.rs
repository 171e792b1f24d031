//! Multi-discrete action space and its decoding into continuous commands

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Result, TaskError};

/// Raw policy action: one bin index per control channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultiDiscreteAction(pub Vec<usize>);

impl From<Vec<usize>> for MultiDiscreteAction {
    fn from(bins: Vec<usize>) -> Self {
        Self(bins)
    }
}

/// Decoded command values, one per action variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousCommand(pub Vec<f64>);

impl ContinuousCommand {
    /// Borrow the command values
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// One control channel: bin count and the continuous range its bins span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionChannel {
    /// Number of bins
    pub bins: usize,
    /// Value of bin 0
    pub low: f64,
    /// Value of the last bin
    pub high: f64,
}

impl ActionChannel {
    /// Channel over the symmetric range [-1, 1]
    #[must_use]
    pub fn symmetric(bins: usize) -> Self {
        Self { bins, low: -1.0, high: 1.0 }
    }

    /// Channel over an arbitrary range
    #[must_use]
    pub fn ranged(bins: usize, low: f64, high: f64) -> Self {
        Self { bins, low, high }
    }

    /// Map a bin index onto the channel range
    ///
    /// `index * (high - low) / (bins - 1) + low`; bin 0 yields `low` and the
    /// last bin yields `high`.
    pub fn decode(&self, index: usize) -> Result<f64> {
        if index >= self.bins {
            return Err(TaskError::InvalidAction(format!(
                "bin {index} out of range for a channel with {} bins",
                self.bins
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        let value = index as f64 * (self.high - self.low) / (self.bins - 1) as f64 + self.low;
        Ok(value)
    }
}

/// Fixed-arity multi-discrete action space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDiscreteSpace {
    channels: Vec<ActionChannel>,
}

impl MultiDiscreteSpace {
    /// Create a new space; every channel needs at least two bins and an
    /// ordered, finite range
    pub fn new(channels: Vec<ActionChannel>) -> Result<Self> {
        for (i, ch) in channels.iter().enumerate() {
            if ch.bins < 2 {
                return Err(TaskError::InvalidConfig(format!(
                    "action channel {i} needs at least 2 bins, got {}",
                    ch.bins
                )));
            }
            if !(ch.low.is_finite() && ch.high.is_finite() && ch.low < ch.high) {
                return Err(TaskError::InvalidConfig(format!(
                    "action channel {i} has invalid range [{}, {}]",
                    ch.low, ch.high
                )));
            }
        }
        Ok(Self { channels })
    }

    /// Channel definitions
    #[must_use]
    pub fn channels(&self) -> &[ActionChannel] {
        &self.channels
    }

    /// Bin count of each channel
    #[must_use]
    pub fn nvec(&self) -> Vec<usize> {
        self.channels.iter().map(|c| c.bins).collect()
    }

    /// Number of channels
    #[must_use]
    pub fn dim(&self) -> usize {
        self.channels.len()
    }

    /// Sample a uniformly random action
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MultiDiscreteAction {
        MultiDiscreteAction(self.channels.iter().map(|c| rng.gen_range(0..c.bins)).collect())
    }

    /// Check if an action is valid within this space
    #[must_use]
    pub fn contains(&self, action: &MultiDiscreteAction) -> bool {
        action.0.len() == self.channels.len()
            && action.0.iter().zip(&self.channels).all(|(i, c)| *i < c.bins)
    }

    /// Decode a discrete action into continuous command values
    pub fn decode(&self, action: &MultiDiscreteAction) -> Result<ContinuousCommand> {
        if action.0.len() != self.channels.len() {
            return Err(TaskError::DimensionMismatch {
                expected: self.channels.len(),
                actual: action.0.len(),
            });
        }
        action
            .0
            .iter()
            .zip(&self.channels)
            .map(|(index, channel)| channel.decode(*index))
            .collect::<Result<Vec<_>>>()
            .map(ContinuousCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn space() -> MultiDiscreteSpace {
        MultiDiscreteSpace::new(vec![
            ActionChannel::symmetric(41),
            ActionChannel::symmetric(41),
            ActionChannel::symmetric(41),
            ActionChannel::ranged(30, 0.4, 0.9),
        ])
        .unwrap()
    }

    #[test]
    fn test_throttle_endpoints() {
        let throttle = ActionChannel::ranged(30, 0.4, 0.9);
        assert_eq!(throttle.decode(0).unwrap(), 0.4);
        assert_eq!(throttle.decode(29).unwrap(), 0.9);
    }

    #[test]
    fn test_symmetric_channel() {
        let ch = ActionChannel::symmetric(41);
        assert_eq!(ch.decode(0).unwrap(), -1.0);
        assert_eq!(ch.decode(20).unwrap(), 0.0);
        assert_eq!(ch.decode(40).unwrap(), 1.0);
        assert_relative_eq!(ch.decode(30).unwrap(), 0.5);
    }

    #[test]
    fn test_decode_full_action() {
        let cmd = space().decode(&vec![0, 20, 40, 29].into()).unwrap();
        assert_eq!(cmd.as_slice(), &[-1.0, 0.0, 1.0, 0.9]);
    }

    #[test]
    fn test_arity_mismatch() {
        let err = space().decode(&vec![0, 0, 0].into()).unwrap_err();
        assert!(matches!(err, TaskError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_out_of_range_bin() {
        let err = space().decode(&vec![0, 0, 0, 30].into()).unwrap_err();
        assert!(matches!(err, TaskError::InvalidAction(_)));
    }

    #[test]
    fn test_rejects_degenerate_channels() {
        assert!(MultiDiscreteSpace::new(vec![ActionChannel::symmetric(1)]).is_err());
        assert!(MultiDiscreteSpace::new(vec![ActionChannel::ranged(5, 1.0, 1.0)]).is_err());
    }

    #[test]
    fn test_samples_are_contained() {
        let space = space();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert!(space.contains(&space.sample(&mut rng)));
        }
    }

    proptest! {
        #[test]
        fn prop_decoded_within_range(a in 0usize..41, e in 0usize..41, r in 0usize..41, t in 0usize..30) {
            let space = space();
            let cmd = space.decode(&MultiDiscreteAction(vec![a, e, r, t])).unwrap();
            for (value, ch) in cmd.as_slice().iter().zip(space.channels()) {
                prop_assert!(*value >= ch.low && *value <= ch.high);
            }
        }
    }
}
