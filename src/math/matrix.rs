use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::Mul;

/// Dense row-major matrix. A batch is stored one sample per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// The caller owns the RNG so that two models built from the same seed
    /// start from identical weights.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / fan_in.max(1) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Builds a matrix from row vectors. An empty `data` gives a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// `rows×cols`, used in shape-mismatch diagnostics.
    pub fn shape_str(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }

    /// Matrix product `self · rhs`.
    ///
    /// i-k-j loop order so the inner loop walks both operands row-wise.
    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            let out = &mut res.data[i];
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for (o, b) in out.iter_mut().zip(rhs.data[k].iter()) {
                    *o += a * b;
                }
            }
        }

        res
    }

    /// Adds a 1×cols row vector to every row (bias broadcast).
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1);
        assert_eq!(row.cols, self.cols);
        let bias = &row.data[0];
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|r| r.iter().zip(bias.iter()).map(|(x, b)| x + b).collect())
                .collect(),
        }
    }

    /// Column sums as a 1×cols matrix (bias gradient over a batch).
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        res
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert!(self.same_shape(other), "Matrices are of incorrect sizes");
        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect()
            })
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn matmul_matches_hand_computed_product() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let c = a * b;
        assert_eq!(c.data, vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn add_row_broadcasts_over_every_row() {
        let m = Matrix::zeros(3, 2);
        let bias = Matrix::from_data(vec![vec![1.0, -1.0]]);
        let out = m.add_row(&bias);
        assert!(out.data.iter().all(|r| r == &vec![1.0, -1.0]));
        assert_eq!(out.sum_rows().data, vec![vec![3.0, -3.0]]);
    }

    #[test]
    fn he_is_reproducible_for_a_fixed_seed() {
        let a = Matrix::he(4, 3, 4, &mut StdRng::seed_from_u64(7));
        let b = Matrix::he(4, 3, 4, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn from_data_accepts_empty_input() {
        let m = Matrix::from_data(Vec::new());
        assert_eq!((m.rows, m.cols), (0, 0));
    }
}
