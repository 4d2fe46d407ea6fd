//! Training configuration value object.

use crate::data::record::{ACCOUNTING_FEATURES, MACRO_FEATURES, MARKET_FEATURES};
use crate::error::EngineError;
use crate::model::DEFAULT_ODE_UNFOLDS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All construction-time constants of a training run. Passed to the
/// trainer as one value; nothing in the engine reads globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Reservoir units per feature group
    pub macro_units: usize,
    pub accounting_units: usize,
    pub market_units: usize,

    /// Input features per group; must match the record partition
    pub macro_inputs: usize,
    pub accounting_inputs: usize,
    pub market_inputs: usize,

    /// Number of discrete actions read off the head
    pub actions: usize,

    /// Semi-implicit ODE sub-steps per record
    pub ode_unfolds: usize,
    /// Inject the input through the sensory synapses. When disabled the
    /// cells evolve on recurrent state alone and ignore their input.
    pub sensory_coupling: bool,
    /// Zero the cell states whenever the processed symbol changes, so
    /// shuffled records of unrelated companies do not share recurrent
    /// state. When disabled state carries across symbol boundaries.
    pub reset_state_on_symbol_change: bool,

    // Adam hyperparameters
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub adam_epsilon: f64,

    // Exploration schedule
    pub epsilon_start: f64,
    pub epsilon_decay: f64,

    pub epochs: usize,
    /// Seed for every random draw of the run; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            macro_units: 5,
            accounting_units: 5,
            market_units: 5,
            macro_inputs: MACRO_FEATURES,
            accounting_inputs: ACCOUNTING_FEATURES,
            market_inputs: MARKET_FEATURES,
            actions: 3,
            ode_unfolds: DEFAULT_ODE_UNFOLDS,
            sensory_coupling: true,
            reset_state_on_symbol_change: true,
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            adam_epsilon: 1e-8,
            epsilon_start: 0.1,
            epsilon_decay: 0.995,
            epochs: 1000,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Check the invariants the trainer relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.actions == 0 {
            return Err(EngineError::InvalidDimension {
                name: "actions",
                value: self.actions,
            });
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(EngineError::InvalidEpsilon(self.epsilon_start));
        }
        let expected = (MACRO_FEATURES, ACCOUNTING_FEATURES, MARKET_FEATURES);
        let actual = (self.macro_inputs, self.accounting_inputs, self.market_inputs);
        if actual != expected {
            return Err(EngineError::ShapeMismatch {
                expected: format!("group inputs {:?}", expected),
                actual: format!("group inputs {:?}", actual),
            });
        }
        Ok(())
    }

    /// Combined state width seen by the output head.
    pub fn combined_units(&self) -> usize {
        self.macro_units + self.accounting_units + self.market_units
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
