//! The classifier being trained.
//!
//! The trainer and validator only see the `Model` trait; `ConvNet` is the one
//! fixed topology this harness ships.

pub mod convnet;

pub use convnet::{ConvNet, ModelConfig};

use crate::error::Result;
use crate::math::matrix::Matrix;

/// A trainable classifier mapping a batch of flattened images to per-class
/// probabilities.
pub trait Model {
    /// Pixels per input row.
    fn input_len(&self) -> usize;

    fn num_classes(&self) -> usize;

    /// Forward evaluation. Never touches parameters or training caches.
    ///
    /// `training_mode` only switches stochastic regularization on; its
    /// randomness must derive from the model's seed.
    fn predict(&self, images: &Matrix, training_mode: bool) -> Result<Matrix>;

    /// Training-mode forward pass that caches what `backward` needs.
    fn forward_train(&mut self, images: &Matrix) -> Result<Matrix>;

    /// Gradients of the loss with respect to every parameter, in the same
    /// order as `parameters()`, given ∂L/∂(pre-softmax logits) for the batch
    /// last seen by `forward_train`.
    fn backward(&mut self, output_grad: &Matrix) -> Result<Vec<Matrix>>;

    fn parameters(&self) -> Vec<&Matrix>;

    fn parameters_mut(&mut self) -> Vec<&mut Matrix>;
}
