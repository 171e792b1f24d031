//! Task configuration
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides. Validation runs once when a task is constructed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::{Result, TaskError};

/// Immutable configuration shared by a task and its reward terms and
/// termination conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Episode step budget
    pub max_steps: usize,
    /// Seed for the task's random sources; entropy when absent
    pub seed: Option<u64>,
    /// Observation pipeline options
    pub observation: ObservationConfig,
    /// Discrete bin counts per control channel
    pub action_bins: ActionBins,
    /// Reward term parameters
    pub reward: RewardConfig,
    /// Termination condition parameters
    pub termination: TerminationConfig,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            max_steps: 500,
            seed: None,
            observation: ObservationConfig::default(),
            action_bins: ActionBins::default(),
            reward: RewardConfig::default(),
            termination: TerminationConfig::default(),
        }
    }
}

impl TaskConfig {
    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(TaskError::InvalidConfig("max_steps must be positive".into()));
        }
        self.observation.validate()?;
        self.action_bins.validate()?;
        self.reward.validate()?;
        self.termination.validate()
    }
}

/// How simulated data loss is handled when building observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLossMode {
    /// No mask is drawn
    #[default]
    Disabled,
    /// The mask is drawn and logged but not applied
    Inert,
    /// Masked raw channels are zeroed before scaling
    Enabled,
}

/// Observation pipeline options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Add Gaussian noise to raw channels
    pub use_noise: bool,
    /// Noise standard deviation for the leading raw channels
    pub noise_std: Vec<f64>,
    /// Data-loss handling
    pub data_loss: DataLossMode,
    /// Per-channel probability that a raw value is lost
    pub data_loss_prop: f64,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            use_noise: false,
            noise_std: vec![50.0, 0.0, 10.0, 10.0, 10.0],
            data_loss: DataLossMode::Disabled,
            data_loss_prop: 0.02,
        }
    }
}

impl ObservationConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.data_loss_prop) {
            return Err(TaskError::InvalidConfig(format!(
                "data_loss_prop must lie in [0, 1], got {}",
                self.data_loss_prop
            )));
        }
        if let Some(std) = self.noise_std.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(TaskError::InvalidConfig(format!(
                "noise_std entries must be finite and non-negative, got {std}"
            )));
        }
        Ok(())
    }
}

/// Bin counts of the four control channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionBins {
    /// Aileron bins
    pub aileron: usize,
    /// Elevator bins
    pub elevator: usize,
    /// Rudder bins
    pub rudder: usize,
    /// Throttle bins
    pub throttle: usize,
}

impl Default for ActionBins {
    fn default() -> Self {
        Self {
            aileron: 41,
            elevator: 41,
            rudder: 41,
            throttle: 30,
        }
    }
}

impl ActionBins {
    /// Bin counts in channel order: aileron, elevator, rudder, throttle
    #[must_use]
    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.aileron, self.elevator, self.rudder, self.throttle]
    }

    fn validate(&self) -> Result<()> {
        if self.to_vec().iter().any(|&n| n < 2) {
            return Err(TaskError::InvalidConfig(format!(
                "every action channel needs at least 2 bins, got {:?}",
                self.to_vec()
            )));
        }
        Ok(())
    }
}

/// Reward term parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Multiplicative scale per reward term name; 1.0 when absent
    pub scales: HashMap<String, f64>,
    /// Altitude below which sinking is penalised (km)
    pub safe_altitude_km: f64,
    /// Altitude below which a flat penalty applies (km)
    pub danger_altitude_km: f64,
    /// Sink-rate normaliser (mach)
    pub kv: f64,
    /// Reward paid once the step budget is reached
    pub timeout_bonus: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            scales: HashMap::new(),
            safe_altitude_km: 4.0,
            danger_altitude_km: 3.5,
            kv: 0.2,
            timeout_bonus: 10.0,
        }
    }
}

impl RewardConfig {
    /// Scale for the named reward term
    #[must_use]
    pub fn scale(&self, term: &str) -> f64 {
        self.scales.get(term).copied().unwrap_or(1.0)
    }

    fn validate(&self) -> Result<()> {
        if self.safe_altitude_km <= 0.0 || self.danger_altitude_km <= 0.0 || self.kv <= 0.0 {
            return Err(TaskError::InvalidConfig(
                "safe_altitude_km, danger_altitude_km and kv must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Termination condition parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationConfig {
    /// Altitude at or below which the episode ends (m)
    pub altitude_limit_m: f64,
    /// Pilot load factor limit along x (g)
    pub acceleration_limit_x: f64,
    /// Pilot load factor limit along y (g)
    pub acceleration_limit_y: f64,
    /// Pilot load factor limit along z (g)
    pub acceleration_limit_z: f64,
    /// Sim time before load factors are checked (s)
    pub overload_grace_sec: f64,
    /// Heading error tolerated at a check (deg)
    pub heading_tolerance_deg: f64,
    /// Sim time between heading checks (s)
    pub check_interval_sec: f64,
    /// Largest heading change of a new target (deg)
    pub max_heading_increment_deg: f64,
    /// Largest altitude change of a new target (ft)
    pub max_altitude_increment_ft: f64,
    /// Largest speed change of a new target (m/s)
    pub max_velocities_u_increment_mps: f64,
    /// Fraction of the largest change used for each successive target
    pub increment_size: Vec<f64>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            altitude_limit_m: 2500.0,
            acceleration_limit_x: 10.0,
            acceleration_limit_y: 10.0,
            acceleration_limit_z: 10.0,
            overload_grace_sec: 10.0,
            heading_tolerance_deg: 10.0,
            check_interval_sec: 30.0,
            max_heading_increment_deg: 180.0,
            max_altitude_increment_ft: 7000.0,
            max_velocities_u_increment_mps: 100.0,
            increment_size: vec![0.2, 0.4, 0.6, 0.8, 1.0],
        }
    }
}

impl TerminationConfig {
    fn validate(&self) -> Result<()> {
        if self.increment_size.is_empty() {
            return Err(TaskError::InvalidConfig("increment_size must not be empty".into()));
        }
        if let Some(size) = self.increment_size.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(TaskError::InvalidConfig(format!(
                "increment_size entries must be finite and non-negative, got {size}"
            )));
        }
        let non_negative = [
            ("heading_tolerance_deg", self.heading_tolerance_deg),
            ("max_heading_increment_deg", self.max_heading_increment_deg),
            ("max_altitude_increment_ft", self.max_altitude_increment_ft),
            ("max_velocities_u_increment_mps", self.max_velocities_u_increment_mps),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(TaskError::InvalidConfig(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
        if !self.check_interval_sec.is_finite() || self.check_interval_sec <= 0.0 {
            return Err(TaskError::InvalidConfig(format!(
                "check_interval_sec must be finite and positive, got {}",
                self.check_interval_sec
            )));
        }
        Ok(())
    }
}
