//! Liquid time-constant cell: a fixed random reservoir of leaky units
//! integrated with a semi-implicit ODE unfold.

use crate::error::EngineError;
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Default number of semi-implicit sub-steps per `step` call.
pub const DEFAULT_ODE_UNFOLDS: usize = 6;

/// Logistic sigmoid.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A bank of continuous-time recurrent units with conductance-based
/// dynamics. All parameters are drawn once at construction and never
/// updated afterwards; the cell acts as a fixed nonlinear temporal
/// feature extractor and only the downstream readout is trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtcCell {
    units: usize,
    input_size: usize,
    ode_unfolds: usize,
    /// Whether the sensory synapses inject the input into the dynamics.
    /// When disabled the update reduces to the pure recurrent leak model
    /// and the input vector is ignored.
    sensory_coupling: bool,
    /// Recurrent synapse weights, units x units
    w: Array2<f64>,
    /// Recurrent reversal potentials, units x units
    erev: Array2<f64>,
    /// Sensory synapse weights, input x units
    sensory_w: Array2<f64>,
    /// Sensory reversal potentials, input x units
    sensory_erev: Array2<f64>,
    /// Membrane capacitance per unit
    cm: Array1<f64>,
    /// Leak conductance per unit
    gleak: Array1<f64>,
    /// Leak reversal potential per unit
    vleak: Array1<f64>,
}

impl LtcCell {
    /// Create a cell with `units` neurons reading `input_size` features.
    /// Synapse weights are uniform in [0.01, 1), reversal potentials
    /// uniform in [-1, 1); leak terms are fixed.
    pub fn new(units: usize, input_size: usize, rng: &mut StdRng) -> Result<Self, EngineError> {
        if units == 0 {
            return Err(EngineError::InvalidDimension {
                name: "units",
                value: units,
            });
        }
        if input_size == 0 {
            return Err(EngineError::InvalidDimension {
                name: "input_size",
                value: input_size,
            });
        }

        let weight_dist = Uniform::new(0.01, 1.0);
        let erev_dist = Uniform::new(-1.0, 1.0);

        Ok(Self {
            units,
            input_size,
            ode_unfolds: DEFAULT_ODE_UNFOLDS,
            sensory_coupling: true,
            w: Array2::random_using((units, units), weight_dist, rng),
            erev: Array2::random_using((units, units), erev_dist, rng),
            sensory_w: Array2::random_using((input_size, units), weight_dist, rng),
            sensory_erev: Array2::random_using((input_size, units), erev_dist, rng),
            cm: Array1::from_elem(units, 0.5),
            gleak: Array1::from_elem(units, 1.0),
            vleak: Array1::zeros(units),
        })
    }

    /// Override the number of ODE sub-steps.
    pub fn with_unfolds(mut self, unfolds: usize) -> Self {
        self.ode_unfolds = unfolds;
        self
    }

    /// Enable or disable sensory input injection.
    pub fn with_sensory_coupling(mut self, enabled: bool) -> Self {
        self.sensory_coupling = enabled;
        self
    }

    /// Number of units, i.e. the length of the state vector.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Expected input vector length.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Zero initial state.
    pub fn init_state(&self) -> Array1<f64> {
        Array1::zeros(self.units)
    }

    /// Integrate the cell over the configured number of sub-steps and
    /// return the new state. Deterministic: randomness only happens at
    /// construction.
    pub fn step(&self, input: &Array1<f64>, state: &Array1<f64>) -> Array1<f64> {
        // Sensory conductances depend only on the input, so they are
        // computed once and reused across the unfolds.
        let (sensory_in, sensory_g) = self.sensory_currents(input);

        let mut v = state.clone();
        for _ in 0..self.ode_unfolds {
            v = self.update_state(&v, &sensory_in, &sensory_g);
        }
        v
    }

    fn sensory_currents(&self, input: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
        let mut current = Array1::zeros(self.units);
        let mut conductance = Array1::zeros(self.units);
        if !self.sensory_coupling {
            return (current, conductance);
        }

        for k in 0..self.input_size {
            let activation = sigmoid(input[k]);
            for i in 0..self.units {
                let g = self.sensory_w[[k, i]] * activation;
                current[i] += g * self.sensory_erev[[k, i]];
                conductance[i] += g;
            }
        }
        (current, conductance)
    }

    /// One semi-implicit sub-step:
    /// `v'[i] = (cm[i]*v[i] + gleak[i]*vleak[i] + sum_j w[i][j]*sigmoid(v[j]) + I_in[i])
    ///          / (cm[i] + gleak[i] + g_in[i])`
    fn update_state(
        &self,
        state: &Array1<f64>,
        sensory_in: &Array1<f64>,
        sensory_g: &Array1<f64>,
    ) -> Array1<f64> {
        let activation = state.mapv(sigmoid);
        let mut next = Array1::zeros(self.units);

        for i in 0..self.units {
            let mut weighted_sum = 0.0;
            for j in 0..self.units {
                weighted_sum += self.w[[i, j]] * activation[j];
            }
            let numerator =
                self.cm[i] * state[i] + self.gleak[i] * self.vleak[i] + weighted_sum + sensory_in[i];
            let denominator = self.cm[i] + self.gleak[i] + sensory_g[i];
            next[i] = numerator / denominator;
        }
        next
    }
}
