use crate::math::matrix::Matrix;

/// Running mean of per-batch scalars (the loss).
#[derive(Debug, Clone, Default)]
pub struct MeanMetric {
    total: f64,
    count: usize,
}

impl MeanMetric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    /// 0.0 before the first update.
    pub fn result(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total / self.count as f64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fraction of samples whose arg-max prediction equals the label.
#[derive(Debug, Clone, Default)]
pub struct AccuracyMetric {
    correct: usize,
    total: usize,
}

impl AccuracyMetric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, labels: &[usize], predictions: &Matrix) {
        for (&label, row) in labels.iter().zip(predictions.data.iter()) {
            if argmax(row) == label {
                self.correct += 1;
            }
        }
        self.total += labels.len();
    }

    /// Fraction in [0, 1]; 0.0 before the first update.
    pub fn result(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Index of the maximum element in a slice; ties go to the lowest index.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best_v), (i, &x)| {
            if x > best_v { (i, x) } else { (best_i, best_v) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_resets_between_epochs() {
        let mut m = MeanMetric::new();
        assert_eq!(m.result(), 0.0);
        m.update(1.0);
        m.update(3.0);
        assert_eq!(m.result(), 2.0);
        m.reset();
        assert_eq!(m.result(), 0.0);
    }

    #[test]
    fn accuracy_counts_argmax_hits() {
        let mut acc = AccuracyMetric::new();
        let p = Matrix::from_data(vec![vec![0.1, 0.9], vec![0.7, 0.3], vec![0.2, 0.8]]);
        acc.update(&[1, 1, 1], &p);
        assert!((acc.result() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn argmax_picks_the_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.5, 0.5, 0.2]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn uniform_rows_count_as_class_zero() {
        let mut acc = AccuracyMetric::new();
        let p = Matrix::from_data(vec![vec![0.25; 4], vec![0.25; 4]]);
        acc.update(&[0, 3], &p);
        assert_eq!(acc.result(), 0.5);
    }
}
