pub mod cross_entropy;

pub use cross_entropy::CrossEntropyLoss;

use crate::math::matrix::Matrix;

/// A scalar batch loss and its gradient with respect to the model's
/// pre-softmax logits.
pub trait Loss {
    /// Mean loss over the batch.
    fn loss(&self, labels: &[usize], predictions: &Matrix) -> f64;

    /// ∂(mean loss)/∂logits, one row per sample.
    fn gradient(&self, labels: &[usize], predictions: &Matrix) -> Matrix;
}
