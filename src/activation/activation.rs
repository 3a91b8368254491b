use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    /// Softmax is a vector-valued activation; `apply()` normalizes each row
    /// of the batch as a whole rather than element-wise.
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to a batch of pre-activations (one sample per row).
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::ReLU => z.map(|x| if x > 0.0 { x } else { 0.0 }),
            ActivationFunction::Softmax => Matrix {
                rows: z.rows,
                cols: z.cols,
                data: z.data.iter().map(|row| softmax(row)).collect(),
            },
        }
    }

    /// Element-wise derivative of the activation.
    ///
    /// For `Softmax`, the layer pairs it with cross-entropy and the combined
    /// gradient is `predicted - expected` (already computed by
    /// `CrossEntropyLoss::gradient()`).  Returning `1.0` here lets
    /// `compute_gradients()` pass that delta through unchanged without
    /// double-applying the Jacobian.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Softmax => 1.0,
        }
    }
}

/// Numerically stable softmax of one row.
fn softmax(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_rows_sum_to_one_even_for_large_logits() {
        let z = Matrix::from_data(vec![vec![1000.0, 1001.0, 999.0], vec![0.0, 0.0, 0.0]]);
        let p = ActivationFunction::Softmax.apply(&z);
        for row in &p.data {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!(row.iter().all(|v| v.is_finite()));
        }
        assert!((p.data[1][0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn relu_clamps_negatives() {
        let z = Matrix::from_data(vec![vec![-2.0, 0.0, 3.0]]);
        assert_eq!(ActivationFunction::ReLU.apply(&z).data[0], vec![0.0, 0.0, 3.0]);
        assert_eq!(ActivationFunction::ReLU.derivative(-1.0), 0.0);
        assert_eq!(ActivationFunction::ReLU.derivative(2.0), 1.0);
    }
}
