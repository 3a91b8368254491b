use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::optim::{check_pairs, Optimizer};

/// Adam with bias-corrected step size.
///
/// Moment buffers are allocated on the first `step`, shaped after the
/// parameters they track.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m: Vec<Matrix>,
    v: Vec<Matrix>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix]) -> Result<()> {
        check_pairs(&params, grads)?;
        if self.m.len() != grads.len() {
            self.m = grads.iter().map(|g| Matrix::zeros(g.rows, g.cols)).collect();
            self.v = self.m.clone();
            self.t = 0;
        }

        self.t += 1;
        let (b1, b2) = (self.beta1, self.beta2);
        let lr_t = self.learning_rate * (1.0 - b2.powi(self.t)).sqrt() / (1.0 - b1.powi(self.t));

        for (((param, grad), m), v) in params.into_iter().zip(grads).zip(&mut self.m).zip(&mut self.v) {
            for i in 0..param.rows {
                for j in 0..param.cols {
                    let g = grad.data[i][j];
                    let m_ij = &mut m.data[i][j];
                    let v_ij = &mut v.data[i][j];
                    *m_ij = b1 * *m_ij + (1.0 - b1) * g;
                    *v_ij = b2 * *v_ij + (1.0 - b2) * g * g;
                    param.data[i][j] -= lr_t * *m_ij / (v_ij.sqrt() + self.epsilon);
                }
            }
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
