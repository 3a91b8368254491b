use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer operating on a whole batch (one sample per row).
#[derive(Debug, Clone)]
pub struct Dense {
    pub size: usize,
    pub weights: Matrix,  // input_size × size
    pub biases: Matrix,   // 1 × size
    pub activator: ActivationFunction,
    inputs: Matrix,       // cached by feed_from() for the backward pass
    pre_neurons: Matrix,  // pre-activation values (z = xW + b) needed for correct derivative
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        Dense {
            size,
            weights: Matrix::he(input_size, size, input_size, rng),
            biases: Matrix::zeros(1, size),
            activator: activation,
            inputs: Matrix::default(),
            pre_neurons: Matrix::default(),
        }
    }

    /// Pure forward pass; leaves the layer untouched.
    pub fn forward(&self, input: &Matrix) -> Matrix {
        let z = input.matmul(&self.weights).add_row(&self.biases);
        self.activator.apply(&z)
    }

    /// Forward pass that remembers its input and pre-activations for backprop.
    pub fn feed_from(&mut self, input: Matrix) -> Matrix {
        let z = input.matmul(&self.weights).add_row(&self.biases);
        let a = self.activator.apply(&z);
        self.inputs = input;
        self.pre_neurons = z;
        a
    }

    /// Returns `(weights_grad, biases_grad, input_grad)` for the cached batch.
    ///
    /// `output_grad` is ∂L/∂a for this layer (error in activation space),
    /// already averaged over the batch by the loss.
    pub fn compute_gradients(&self, output_grad: &Matrix) -> (Matrix, Matrix, Matrix) {
        // Use pre-activation z so that derivative(z) = σ'(z) is computed correctly
        let act_derivative = self.pre_neurons.map(|x| self.activator.derivative(x));
        // Element-wise (Hadamard) product: δ = error ⊙ σ'(z)
        let layer_delta = output_grad.hadamard(&act_derivative);

        let weights_grad = self.inputs.transpose().matmul(&layer_delta);
        let biases_grad = layer_delta.sum_rows();
        let input_grad = layer_delta.matmul(&self.weights.transpose());

        (weights_grad, biases_grad, input_grad)
    }

    /// Number of rows in the batch cached by the last `feed_from()`.
    pub fn cached_batch(&self) -> usize {
        self.pre_neurons.rows
    }
}
