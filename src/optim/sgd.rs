use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::optim::{check_pairs, Optimizer};

/// Plain gradient descent: `p -= lr * g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix]) -> Result<()> {
        check_pairs(&params, grads)?;
        for (param, grad) in params.into_iter().zip(grads) {
            for (p_row, g_row) in param.data.iter_mut().zip(grad.data.iter()) {
                for (p, g) in p_row.iter_mut().zip(g_row.iter()) {
                    *p -= self.learning_rate * g;
                }
            }
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
