//! In-memory simulator backed by a property table
//!
//! Stands in for a flight-dynamics binding in tests, demos and when
//! replaying recorded states. Unset properties read as zero.

use std::collections::HashMap;
use std::fmt;

use flight_task_core::{Property, Result, Simulator, TaskError};

type Dynamics = Box<dyn FnMut(&mut HashMap<Property, f64>, f64) + Send>;

/// Property table with a fixed integration step
pub struct PropertyTable {
    values: HashMap<Property, f64>,
    dt: f64,
    dynamics: Option<Dynamics>,
}

impl PropertyTable {
    /// Create an empty table advancing `dt` seconds per `run`
    pub fn new(dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(TaskError::InvalidConfig(format!("dt must be positive, got {dt}")));
        }
        Ok(Self {
            values: HashMap::new(),
            dt,
            dynamics: None,
        })
    }

    /// Seed the table with initial values
    #[must_use]
    pub fn with_values(mut self, values: impl IntoIterator<Item = (Property, f64)>) -> Self {
        self.values.extend(values);
        self
    }

    /// Install a function applied to the table on every `run`
    #[must_use]
    pub fn with_dynamics<F>(mut self, dynamics: F) -> Self
    where
        F: FnMut(&mut HashMap<Property, f64>, f64) + Send + 'static,
    {
        self.dynamics = Some(Box::new(dynamics));
        self
    }

    /// Integration step in seconds
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl fmt::Debug for PropertyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyTable")
            .field("values", &self.values)
            .field("dt", &self.dt)
            .field("dynamics", &self.dynamics.is_some())
            .finish()
    }
}

impl Simulator for PropertyTable {
    fn get_property_values(&self, props: &[Property]) -> Result<Vec<f64>> {
        Ok(props
            .iter()
            .map(|p| self.values.get(p).copied().unwrap_or_default())
            .collect())
    }

    fn set_property_values(&mut self, values: &[(Property, f64)]) -> Result<()> {
        for (prop, value) in values {
            if !value.is_finite() {
                return Err(TaskError::Simulator(format!("non-finite value for {prop}: {value}")));
            }
            self.values.insert(*prop, *value);
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        *self.values.entry(Property::SimulationSimTimeSec).or_default() += self.dt;
        if let Some(dynamics) = self.dynamics.as_mut() {
            dynamics(&mut self.values, self.dt);
        }
        Ok(())
    }
}
