pub mod adam;
pub mod sgd;

pub use adam::Adam;
pub use sgd::Sgd;

use crate::error::{HarnessError, Result};
use crate::math::matrix::Matrix;

/// Applies one update to every trainable parameter given its gradient.
pub trait Optimizer {
    /// `params` and `grads` are paired by position and must match in shape.
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix]) -> Result<()>;

    fn learning_rate(&self) -> f64;
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix]) -> Result<()> {
        (**self).step(params, grads)
    }

    fn learning_rate(&self) -> f64 {
        (**self).learning_rate()
    }
}

/// Checks that parameters and gradients pair up one-to-one with equal shapes.
fn check_pairs(params: &[&mut Matrix], grads: &[Matrix]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(HarnessError::shape_mismatch(
            format!("{} gradients", params.len()),
            format!("{} gradients", grads.len()),
        ));
    }
    for (p, g) in params.iter().zip(grads) {
        if !p.same_shape(g) {
            return Err(HarnessError::shape_mismatch(p.shape_str(), g.shape_str()));
        }
    }
    Ok(())
}
