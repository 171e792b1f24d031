//! Observation vectors, the bounded observation box and the normalization
//! pipeline that maps raw simulator readings into it

use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{trace, warn};

use crate::config::{DataLossMode, ObservationConfig};
use crate::{Result, TaskError};

/// Normalized observation handed to the policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    /// The observation data
    pub data: Vec<f64>,
}

impl VectorObservation {
    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the observation has no components
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the components
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Box observation space with independent per-component bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxObservationSpace {
    /// Lower bounds
    pub low: Vec<f64>,
    /// Upper bounds
    pub high: Vec<f64>,
}

impl BoxObservationSpace {
    /// Create a new box observation space
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(TaskError::DimensionMismatch {
                expected: low.len(),
                actual: high.len(),
            });
        }
        if low.iter().zip(&high).any(|(l, h)| !(l <= h)) {
            return Err(TaskError::InvalidConfig(
                "observation bounds must satisfy low <= high".into(),
            ));
        }
        Ok(Self { low, high })
    }

    /// Box of `dim` components sharing the same bounds
    pub fn uniform(dim: usize, low: f64, high: f64) -> Result<Self> {
        Self::new(vec![low; dim], vec![high; dim])
    }

    /// Number of components
    #[must_use]
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Shape of observations in this space
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        vec![self.dim()]
    }

    /// Clip every component into its bounds
    pub fn clip(&self, data: &mut [f64]) {
        for ((x, l), h) in data.iter_mut().zip(&self.low).zip(&self.high) {
            *x = x.clamp(*l, *h);
        }
    }

    /// Check if an observation lies inside the box
    #[must_use]
    pub fn contains(&self, obs: &VectorObservation) -> bool {
        obs.data.len() == self.low.len()
            && obs
                .data
                .iter()
                .zip(&self.low)
                .zip(&self.high)
                .all(|((x, l), h)| x >= l && x <= h)
    }
}

/// Fixed per-channel transform from a raw physical quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelScale {
    /// Passed through unchanged
    Identity,
    /// Divided by a scale constant
    Divide(f64),
    /// Degrees converted to radians
    DegreesToRadians,
}

impl ChannelScale {
    /// Apply the transform
    #[must_use]
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            Self::Identity => raw,
            Self::Divide(scale) => raw / scale,
            Self::DegreesToRadians => raw / 180.0 * PI,
        }
    }
}

/// Raw-to-normalized observation pipeline
///
/// Order of operations: optional noise, optional data-loss mask, per-channel
/// scale, then clipping to the declared box. Clipping is always applied.
#[derive(Debug, Clone)]
pub struct ObservationNormalizer {
    scales: Vec<ChannelScale>,
    space: BoxObservationSpace,
    config: ObservationConfig,
    rng: StdRng,
}

impl ObservationNormalizer {
    /// Create a normalizer; the channel count must match the box dimension
    pub fn new(
        scales: Vec<ChannelScale>,
        space: BoxObservationSpace,
        config: ObservationConfig,
        rng: StdRng,
    ) -> Result<Self> {
        if scales.len() != space.dim() {
            return Err(TaskError::DimensionMismatch {
                expected: space.dim(),
                actual: scales.len(),
            });
        }
        if let Some(&scale) = scales
            .iter()
            .find(|s| matches!(s, ChannelScale::Divide(d) if *d == 0.0 || !d.is_finite()))
        {
            return Err(TaskError::InvalidConfig(format!(
                "channel scale must be finite and non-zero, got {scale:?}"
            )));
        }
        Ok(Self {
            scales,
            space,
            config,
            rng,
        })
    }

    /// Number of channels
    #[must_use]
    pub fn channels(&self) -> usize {
        self.scales.len()
    }

    /// Declared output space
    #[must_use]
    pub fn space(&self) -> &BoxObservationSpace {
        &self.space
    }

    /// Map raw simulator readings into the observation box
    pub fn normalize(&mut self, raw: &[f64]) -> Result<VectorObservation> {
        if raw.len() != self.scales.len() {
            return Err(TaskError::DimensionMismatch {
                expected: self.scales.len(),
                actual: raw.len(),
            });
        }

        let mut values = raw.to_vec();
        if self.config.use_noise {
            self.add_noise(&mut values)?;
        }
        self.apply_data_loss(&mut values)?;

        let mut data: Vec<f64> = values
            .iter()
            .zip(&self.scales)
            .enumerate()
            .map(|(i, (x, scale))| {
                if x.is_nan() {
                    warn!(channel = i, "non-finite raw observation replaced with 0");
                    0.0
                } else {
                    scale.apply(*x)
                }
            })
            .collect();
        self.space.clip(&mut data);

        Ok(VectorObservation { data })
    }

    fn add_noise(&mut self, values: &mut [f64]) -> Result<()> {
        for (x, &std) in values.iter_mut().zip(&self.config.noise_std) {
            if std > 0.0 {
                let normal = Normal::new(0.0, std)
                    .map_err(|e| TaskError::InvalidConfig(e.to_string()))?;
                *x += normal.sample(&mut self.rng);
            }
        }
        Ok(())
    }

    fn apply_data_loss(&mut self, values: &mut [f64]) -> Result<()> {
        if self.config.data_loss == DataLossMode::Disabled {
            return Ok(());
        }
        let keep = Bernoulli::new(1.0 - self.config.data_loss_prop)
            .map_err(|e| TaskError::InvalidConfig(e.to_string()))?;
        let mask: Vec<bool> = (0..values.len()).map(|_| keep.sample(&mut self.rng)).collect();
        let dropped = mask.iter().filter(|kept| !**kept).count();

        if self.config.data_loss == DataLossMode::Enabled {
            for (x, kept) in values.iter_mut().zip(&mask) {
                if !kept {
                    *x = 0.0;
                }
            }
        }
        trace!(dropped, mode = ?self.config.data_loss, "data-loss mask drawn");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn normalizer(scales: Vec<ChannelScale>, config: ObservationConfig) -> ObservationNormalizer {
        let space = BoxObservationSpace::uniform(scales.len(), -10.0, 10.0).unwrap();
        ObservationNormalizer::new(scales, space, config, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_channel_scales() {
        assert_relative_eq!(ChannelScale::Divide(1000.0).apply(1000.0), 1.0);
        assert_relative_eq!(ChannelScale::DegreesToRadians.apply(180.0), PI);
        assert_relative_eq!(ChannelScale::Identity.apply(0.25), 0.25);
    }

    #[test]
    fn test_clip_to_bounds() {
        let mut n = normalizer(
            vec![ChannelScale::Divide(1000.0), ChannelScale::Identity],
            ObservationConfig::default(),
        );
        let obs = n.normalize(&[50_000.0, -50_000.0]).unwrap();
        assert_eq!(obs.data, vec![10.0, -10.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut n = normalizer(vec![ChannelScale::Identity; 3], ObservationConfig::default());
        let err = n.normalize(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, TaskError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_scale_count_must_match_space() {
        let space = BoxObservationSpace::uniform(4, -1.0, 1.0).unwrap();
        let err = ObservationNormalizer::new(
            vec![ChannelScale::Identity; 3],
            space,
            ObservationConfig::default(),
            StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_nan_becomes_zero() {
        let mut n = normalizer(vec![ChannelScale::Identity; 2], ObservationConfig::default());
        let obs = n.normalize(&[f64::NAN, f64::INFINITY]).unwrap();
        assert_eq!(obs.data, vec![0.0, 10.0]);
    }

    #[test]
    fn test_enabled_data_loss_zeroes_everything_at_probability_one() {
        let config = ObservationConfig {
            data_loss: DataLossMode::Enabled,
            data_loss_prop: 1.0,
            ..ObservationConfig::default()
        };
        let mut n = normalizer(vec![ChannelScale::Identity; 4], config);
        let obs = n.normalize(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(obs.data, vec![0.0; 4]);
    }

    #[test]
    fn test_inert_data_loss_leaves_values() {
        let config = ObservationConfig {
            data_loss: DataLossMode::Inert,
            data_loss_prop: 1.0,
            ..ObservationConfig::default()
        };
        let mut n = normalizer(vec![ChannelScale::Identity; 4], config);
        let obs = n.normalize(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(obs.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_noise_is_reproducible_for_a_seed() {
        let config = ObservationConfig {
            use_noise: true,
            noise_std: vec![1.0, 1.0],
            ..ObservationConfig::default()
        };
        let mut a = normalizer(vec![ChannelScale::Identity; 2], config.clone());
        let mut b = normalizer(vec![ChannelScale::Identity; 2], config);
        let obs_a = a.normalize(&[0.0, 0.0]).unwrap();
        assert_eq!(obs_a, b.normalize(&[0.0, 0.0]).unwrap());
        assert_ne!(obs_a.data, vec![0.0, 0.0]);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(BoxObservationSpace::new(vec![1.0], vec![0.0]).is_err());
        assert!(BoxObservationSpace::new(vec![0.0, 0.0], vec![1.0]).is_err());
    }

    proptest! {
        #[test]
        fn prop_output_stays_in_box(raw in prop::collection::vec(-1.0e9f64..1.0e9, 5)) {
            let mut n = normalizer(
                vec![
                    ChannelScale::Divide(1000.0),
                    ChannelScale::DegreesToRadians,
                    ChannelScale::Divide(340.0),
                    ChannelScale::Identity,
                    ChannelScale::Divide(5000.0),
                ],
                ObservationConfig::default(),
            );
            let obs = n.normalize(&raw).unwrap();
            prop_assert_eq!(obs.len(), 5);
            prop_assert!(n.space().contains(&obs));
        }
    }
}
