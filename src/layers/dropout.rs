use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::math::matrix::Matrix;

/// Inverted dropout: in training mode each activation is zeroed with
/// probability `rate` and survivors are scaled by `1 / (1 - rate)`, so
/// inference is a plain identity.
#[derive(Debug, Clone)]
pub struct Dropout {
    pub rate: f64,
    rng: StdRng,
    mask: Matrix,
}

impl Dropout {
    pub fn new(rate: f64, seed: u64) -> Dropout {
        Dropout { rate, rng: StdRng::seed_from_u64(seed), mask: Matrix::default() }
    }

    pub fn is_active(&self) -> bool {
        self.rate > 0.0
    }

    /// Applies a fresh mask drawn from `rng`; does not remember it.
    pub fn forward<R: Rng + ?Sized>(&self, input: &Matrix, training_mode: bool, rng: &mut R) -> Matrix {
        if !training_mode || !self.is_active() {
            return input.clone();
        }
        input.hadamard(&draw_mask(self.rate, input.rows, input.cols, rng))
    }

    /// Training-mode forward pass that keeps its mask for `backward`.
    pub fn feed_from(&mut self, input: Matrix) -> Matrix {
        if !self.is_active() {
            return input;
        }
        self.mask = draw_mask(self.rate, input.rows, input.cols, &mut self.rng);
        input.hadamard(&self.mask)
    }

    pub fn backward(&self, output_grad: Matrix) -> Matrix {
        if !self.is_active() {
            return output_grad;
        }
        output_grad.hadamard(&self.mask)
    }
}

fn draw_mask<R: Rng + ?Sized>(rate: f64, rows: usize, cols: usize, rng: &mut R) -> Matrix {
    let keep = 1.0 - rate;
    let mut mask = Matrix::zeros(rows, cols);
    for row in mask.data.iter_mut() {
        for m in row.iter_mut() {
            if rng.gen::<f64>() < keep {
                *m = 1.0 / keep;
            }
        }
    }
    mask
}
