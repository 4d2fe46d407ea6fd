//! Epsilon-greedy action selection.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;

/// Discrete action selector: with probability epsilon pick a uniformly
/// random index, otherwise the index of the highest value (first
/// occurrence on ties). Epsilon decays multiplicatively and is never
/// clamped to a floor.
#[derive(Debug)]
pub struct EpsilonGreedyPolicy {
    epsilon: f64,
    rng: StdRng,
}

impl EpsilonGreedyPolicy {
    pub fn new(epsilon: f64, rng: StdRng) -> Self {
        Self { epsilon, rng }
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Select an action index in `[0, values.len())`.
    pub fn select_action(&mut self, values: &Array1<f64>) -> usize {
        if self.rng.gen::<f64>() < self.epsilon {
            self.rng.gen_range(0..values.len())
        } else {
            argmax(values)
        }
    }

    /// Multiplicative decay: `epsilon *= rate`.
    pub fn decay(&mut self, rate: f64) {
        self.epsilon *= rate;
    }
}

/// Index of the maximum value, first occurrence on ties.
fn argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
