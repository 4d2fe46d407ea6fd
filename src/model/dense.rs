//! Linear readout layer with an explicit backward pass.

use crate::error::EngineError;
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Affine layer mapping an input vector to output logits. This is the
/// only trained component of the model; gradients are computed by the
/// caller-supplied output gradient and applied through the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub input_size: usize,
    pub output_size: usize,
    /// Weight matrix, output x input
    pub weights: Array2<f64>,
    /// Bias vector, one entry per output
    pub biases: Array1<f64>,
}

impl DenseLayer {
    /// Create a layer with weights and biases uniform in [-0.5, 0.5).
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Result<Self, EngineError> {
        if input_size == 0 {
            return Err(EngineError::InvalidDimension {
                name: "input_size",
                value: input_size,
            });
        }
        if output_size == 0 {
            return Err(EngineError::InvalidDimension {
                name: "output_size",
                value: output_size,
            });
        }

        let dist = Uniform::new(-0.5, 0.5);
        Ok(Self {
            input_size,
            output_size,
            weights: Array2::random_using((output_size, input_size), dist, rng),
            biases: Array1::random_using(output_size, dist, rng),
        })
    }

    /// `output[i] = bias[i] + sum_j weights[i][j] * input[j]`
    pub fn forward(&self, input: &Array1<f64>) -> Array1<f64> {
        self.weights.dot(input) + &self.biases
    }

    /// Gradient of the layer parameters given the gradient at the output.
    /// The layer has no nonlinearity, so the bias gradient is the output
    /// gradient itself and the weight gradient is its outer product with
    /// the input. Pure; the caller owns the forward input.
    pub fn backward(
        &self,
        input: &Array1<f64>,
        grad_output: &Array1<f64>,
    ) -> (Array2<f64>, Array1<f64>) {
        let mut grad_weights = Array2::zeros((self.output_size, self.input_size));
        for i in 0..self.output_size {
            for j in 0..self.input_size {
                grad_weights[[i, j]] = grad_output[i] * input[j];
            }
        }
        (grad_weights, grad_output.clone())
    }
}
