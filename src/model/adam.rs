//! Adam optimizer over a single (weight matrix, bias vector) pair.

use crate::error::EngineError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// First and second raw-moment accumulators mirroring the parameter
/// shapes. Owned exclusively by the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Moments {
    m_weights: Array2<f64>,
    v_weights: Array2<f64>,
    m_biases: Array1<f64>,
    v_biases: Array1<f64>,
}

/// Moment-based optimizer applying the bias-corrected Adam update rule
/// elementwise to a weight matrix and a bias vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdamOptimizer {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    moments: Option<Moments>,
}

impl AdamOptimizer {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            moments: None,
        }
    }

    /// Zero-fill the moment accumulators for the given parameter shapes.
    /// Must be called exactly once before the first `update`.
    pub fn initialize(
        &mut self,
        weight_shape: (usize, usize),
        bias_len: usize,
    ) -> Result<(), EngineError> {
        if self.moments.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        self.moments = Some(Moments {
            m_weights: Array2::zeros(weight_shape),
            v_weights: Array2::zeros(weight_shape),
            m_biases: Array1::zeros(bias_len),
            v_biases: Array1::zeros(bias_len),
        });
        Ok(())
    }

    /// Apply one Adam step in place:
    /// `lr_t = lr * sqrt(1 - beta2^t) / (1 - beta1^t)`,
    /// `m = beta1*m + (1-beta1)*g`, `v = beta2*v + (1-beta2)*g^2`,
    /// `p -= lr_t * m / (sqrt(v) + eps)`.
    /// `step` is caller-supplied and must be at least 1.
    pub fn update(
        &mut self,
        weights: &mut Array2<f64>,
        biases: &mut Array1<f64>,
        grad_weights: &Array2<f64>,
        grad_biases: &Array1<f64>,
        step: usize,
    ) -> Result<(), EngineError> {
        if step == 0 {
            return Err(EngineError::InvalidStep(step));
        }
        let moments = self.moments.as_mut().ok_or(EngineError::NotInitialized)?;

        let expected = (moments.m_weights.dim(), moments.m_biases.len());
        let actual = (weights.dim(), biases.len());
        let grads = (grad_weights.dim(), grad_biases.len());
        if actual != expected || grads != expected {
            return Err(EngineError::ShapeMismatch {
                expected: format!("{:?}", expected),
                actual: format!("params {:?}, grads {:?}", actual, grads),
            });
        }

        let t = step as i32;
        let lr_t = self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt()
            / (1.0 - self.beta1.powi(t));

        let (rows, cols) = expected.0;
        for i in 0..rows {
            for j in 0..cols {
                let g = grad_weights[[i, j]];
                let m = self.beta1 * moments.m_weights[[i, j]] + (1.0 - self.beta1) * g;
                let v = self.beta2 * moments.v_weights[[i, j]] + (1.0 - self.beta2) * g * g;
                moments.m_weights[[i, j]] = m;
                moments.v_weights[[i, j]] = v;
                weights[[i, j]] -= lr_t * m / (v.sqrt() + self.epsilon);
            }
        }

        for i in 0..expected.1 {
            let g = grad_biases[i];
            let m = self.beta1 * moments.m_biases[i] + (1.0 - self.beta1) * g;
            let v = self.beta2 * moments.v_biases[i] + (1.0 - self.beta2) * g * g;
            moments.m_biases[i] = m;
            moments.v_biases[i] = v;
            biases[i] -= lr_t * m / (v.sqrt() + self.epsilon);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DenseLayer;
    use ndarray::Array1;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn adam() -> AdamOptimizer {
        AdamOptimizer::new(0.01, 0.9, 0.999, 1e-8)
    }

    #[test]
    fn update_before_initialize_fails() {
        let mut opt = adam();
        let mut w = Array2::zeros((2, 2));
        let mut b = Array1::zeros(2);
        let err = opt.update(&mut w, &mut b, &Array2::zeros((2, 2)), &Array1::zeros(2), 1);
        assert!(matches!(err, Err(EngineError::NotInitialized)));
    }

    #[test]
    fn double_initialize_fails() {
        let mut opt = adam();
        opt.initialize((2, 2), 2).unwrap();
        assert!(matches!(
            opt.initialize((2, 2), 2),
            Err(EngineError::AlreadyInitialized)
        ));
    }

    #[test]
    fn zero_step_fails() {
        let mut opt = adam();
        opt.initialize((2, 2), 2).unwrap();
        let mut w = Array2::zeros((2, 2));
        let mut b = Array1::zeros(2);
        let err = opt.update(&mut w, &mut b, &Array2::zeros((2, 2)), &Array1::zeros(2), 0);
        assert!(matches!(err, Err(EngineError::InvalidStep(0))));
    }

    #[test]
    fn mismatched_shapes_fail() {
        let mut opt = adam();
        opt.initialize((2, 3), 2).unwrap();
        let mut w = Array2::zeros((2, 2));
        let mut b = Array1::zeros(2);
        let err = opt.update(&mut w, &mut b, &Array2::zeros((2, 2)), &Array1::zeros(2), 1);
        assert!(matches!(err, Err(EngineError::ShapeMismatch { .. })));
    }

    #[test]
    fn step_moves_against_gradient() {
        let mut opt = adam();
        opt.initialize((1, 1), 1).unwrap();
        let mut w = ndarray::array![[1.0]];
        let mut b = ndarray::array![1.0];

        opt.update(&mut w, &mut b, &ndarray::array![[2.0]], &ndarray::array![-2.0], 1)
            .unwrap();
        assert!(w[[0, 0]] < 1.0);
        assert!(b[0] > 1.0);
    }

    /// Driving a dense layer toward a fixed linear target must strictly
    /// reduce the squared error over a bounded number of steps.
    #[test]
    fn converges_on_linear_target() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut layer = DenseLayer::new(3, 2, &mut rng).unwrap();
        let mut opt = AdamOptimizer::new(0.05, 0.9, 0.999, 1e-8);
        opt.initialize((2, 3), 2).unwrap();

        let input = ndarray::array![0.5, -1.0, 2.0];
        let target = ndarray::array![1.0, -3.0];

        let loss_of = |l: &DenseLayer| {
            let diff = l.forward(&input) - &target;
            diff.dot(&diff)
        };

        let initial_loss = loss_of(&layer);
        for step in 1..=200 {
            let prediction = layer.forward(&input);
            let grad_output = (prediction - &target) * 2.0;
            let (gw, gb) = layer.backward(&input, &grad_output);
            let DenseLayer {
                ref mut weights,
                ref mut biases,
                ..
            } = layer;
            opt.update(weights, biases, &gw, &gb, step).unwrap();
        }

        let final_loss = loss_of(&layer);
        assert!(
            final_loss < initial_loss,
            "loss did not decrease: {initial_loss} -> {final_loss}"
        );
        assert!(final_loss < 1e-2, "loss did not converge: {final_loss}");
    }
}
