use crate::loss::Loss;
use crate::math::matrix::Matrix;

/// Sparse categorical cross-entropy for use with a Softmax output layer.
///
/// Labels are class indices rather than one-hot vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl Loss for CrossEntropyLoss {
    /// L = -mean_i log(predicted[i][label_i] + eps)
    fn loss(&self, labels: &[usize], predictions: &Matrix) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let total: f64 = labels.iter().zip(predictions.data.iter())
            .map(|(&label, row)| -(row[label] + EPS).ln())
            .sum();
        total / labels.len() as f64
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the pre-softmax
    /// logits, averaged over the batch:
    ///   ∂L/∂z_ij = (predicted[i][j] - onehot(label_i)[j]) / batch_len
    ///
    /// The Softmax layer's own derivative step is identity (1.0) so this is
    /// not double-applied.
    fn gradient(&self, labels: &[usize], predictions: &Matrix) -> Matrix {
        let inv_batch = 1.0 / labels.len().max(1) as f64;
        let mut grad = predictions.map(|p| p * inv_batch);
        for (row, &label) in grad.data.iter_mut().zip(labels) {
            row[label] -= inv_batch;
        }
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_prediction_has_near_zero_loss() {
        let p = Matrix::from_data(vec![vec![0.0, 1.0, 0.0]]);
        assert!(CrossEntropyLoss.loss(&[1], &p) < 1e-9);
    }

    #[test]
    fn uniform_prediction_costs_log_k() {
        let p = Matrix::from_data(vec![vec![0.25; 4], vec![0.25; 4]]);
        let l = CrossEntropyLoss.loss(&[0, 3], &p);
        assert!((l - 4f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn gradient_is_probability_minus_one_hot_over_batch() {
        let p = Matrix::from_data(vec![vec![0.2, 0.8], vec![0.6, 0.4]]);
        let g = CrossEntropyLoss.gradient(&[1, 0], &p);
        let expected = [[0.1, -0.1], [-0.2, 0.2]];
        for (row, exp) in g.data.iter().zip(expected.iter()) {
            for (a, b) in row.iter().zip(exp.iter()) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }
}
