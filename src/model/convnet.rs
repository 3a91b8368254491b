use std::cell::Cell;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::data::ImageShape;
use crate::error::{HarnessError, Result};
use crate::layers::{Conv2d, Dense, Dropout};
use crate::math::matrix::Matrix;
use crate::model::Model;

/// Topology knobs for `ConvNet`.
///
/// Defaults: 28×28 input → conv 32@3×3 (ReLU) → flatten → dense 128 (ReLU)
/// → dense 10 (Softmax), no dropout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub image_shape: ImageShape,
    pub filters: usize,
    pub kernel_size: usize,
    pub hidden: usize,
    pub num_classes: usize,
    /// Dropout after the hidden dense layer; 0.0 disables it.
    pub dropout: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            image_shape: ImageShape::default(),
            filters: 32,
            kernel_size: 3,
            hidden: 128,
            num_classes: 10,
            dropout: 0.0,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        let ImageShape { height, width } = self.image_shape;
        if self.kernel_size == 0 || self.kernel_size > height || self.kernel_size > width {
            return Err(HarnessError::InvalidArgument(format!(
                "kernel_size {} does not fit a {}x{} image",
                self.kernel_size, height, width
            )));
        }
        if self.filters == 0 || self.hidden == 0 {
            return Err(HarnessError::InvalidArgument("filters and hidden must be at least 1".into()));
        }
        if self.num_classes < 2 {
            return Err(HarnessError::InvalidArgument("num_classes must be at least 2".into()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(HarnessError::InvalidArgument(format!("dropout {} is not in [0, 1)", self.dropout)));
        }
        Ok(())
    }
}

/// conv → flatten → dense (ReLU) → dropout → dense (Softmax).
#[derive(Debug, Clone)]
pub struct ConvNet {
    config: ModelConfig,
    conv: Conv2d,
    hidden: Dense,
    dropout: Dropout,
    output: Dense,
    /// Root of the masks `predict(.., true)` draws; mixed with `predict_calls`.
    predict_seed: u64,
    predict_calls: Cell<u64>,
}

impl ConvNet {
    /// Builds the network with He-initialized weights drawn from `seed`.
    pub fn new(config: ModelConfig, seed: u64) -> Result<ConvNet> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let conv = Conv2d::new(config.image_shape, config.filters, config.kernel_size, &mut rng);
        let hidden = Dense::new(config.hidden, conv.output_len(), ActivationFunction::ReLU, &mut rng);
        let dropout = Dropout::new(config.dropout, seed.wrapping_add(1));
        let output = Dense::new(config.num_classes, config.hidden, ActivationFunction::Softmax, &mut rng);

        Ok(ConvNet {
            config,
            conv,
            hidden,
            dropout,
            output,
            predict_seed: seed.wrapping_add(2),
            predict_calls: Cell::new(0),
        })
    }

    fn check_input(&self, images: &Matrix) -> Result<()> {
        if images.cols != self.input_len() {
            return Err(HarnessError::shape_mismatch(
                format!("N x {} input", self.input_len()),
                images.shape_str(),
            ));
        }
        Ok(())
    }
}

impl Model for ConvNet {
    fn input_len(&self) -> usize {
        self.config.image_shape.len()
    }

    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn predict(&self, images: &Matrix, training_mode: bool) -> Result<Matrix> {
        self.check_input(images)?;
        let features = self.conv.forward(images);
        let hidden = self.hidden.forward(&features);
        let hidden = if training_mode {
            // Every call gets its own mask, reproducible from the model seed.
            let call = self.predict_calls.get();
            self.predict_calls.set(call.wrapping_add(1));
            let mut rng = StdRng::seed_from_u64(self.predict_seed ^ call.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            self.dropout.forward(&hidden, true, &mut rng)
        } else {
            hidden
        };
        Ok(self.output.forward(&hidden))
    }

    fn forward_train(&mut self, images: &Matrix) -> Result<Matrix> {
        self.check_input(images)?;
        let features = self.conv.feed_from(images.clone());
        let hidden = self.hidden.feed_from(features);
        let hidden = self.dropout.feed_from(hidden);
        Ok(self.output.feed_from(hidden))
    }

    fn backward(&mut self, output_grad: &Matrix) -> Result<Vec<Matrix>> {
        let cached = self.output.cached_batch();
        if cached == 0 || output_grad.rows != cached || output_grad.cols != self.config.num_classes {
            return Err(HarnessError::shape_mismatch(
                format!("{}x{} output gradient", cached, self.config.num_classes),
                output_grad.shape_str(),
            ));
        }

        let (out_w, out_b, grad) = self.output.compute_gradients(output_grad);
        let grad = self.dropout.backward(grad);
        let (hid_w, hid_b, grad) = self.hidden.compute_gradients(&grad);
        let (conv_k, conv_b) = self.conv.compute_gradients(&grad);

        Ok(vec![conv_k, conv_b, hid_w, hid_b, out_w, out_b])
    }

    fn parameters(&self) -> Vec<&Matrix> {
        vec![
            &self.conv.kernels,
            &self.conv.biases,
            &self.hidden.weights,
            &self.hidden.biases,
            &self.output.weights,
            &self.output.biases,
        ]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![
            &mut self.conv.kernels,
            &mut self.conv.biases,
            &mut self.hidden.weights,
            &mut self.hidden.biases,
            &mut self.output.weights,
            &mut self.output.biases,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> ModelConfig {
        ModelConfig {
            image_shape: ImageShape { height: 4, width: 4 },
            filters: 2,
            kernel_size: 3,
            hidden: 5,
            num_classes: 3,
            dropout: 0.0,
        }
    }

    fn batch(rows: usize) -> Matrix {
        Matrix::from_data((0..rows).map(|r| (0..16).map(|c| ((r + c) % 5) as f64 / 5.0).collect()).collect())
    }

    #[test]
    fn predictions_are_probability_rows() {
        let net = ConvNet::new(tiny(), 1).unwrap();
        let p = net.predict(&batch(3), false).unwrap();
        assert_eq!((p.rows, p.cols), (3, 3));
        for row in &p.data {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn wrong_input_width_is_a_shape_mismatch() {
        let net = ConvNet::new(tiny(), 1).unwrap();
        let err = net.predict(&Matrix::zeros(2, 15), false).unwrap_err();
        assert!(matches!(err, HarnessError::ShapeMismatch { .. }));
    }

    #[test]
    fn backward_before_forward_is_rejected() {
        let mut net = ConvNet::new(tiny(), 1).unwrap();
        assert!(net.backward(&Matrix::zeros(1, 3)).is_err());
    }

    #[test]
    fn gradients_line_up_with_parameters() {
        let mut net = ConvNet::new(tiny(), 2).unwrap();
        let out = net.forward_train(&batch(2)).unwrap();
        let grads = net.backward(&out).unwrap();
        let params = net.parameters();
        assert_eq!(grads.len(), params.len());
        for (g, p) in grads.iter().zip(params) {
            assert!(g.same_shape(p));
        }
    }

    #[test]
    fn same_seed_builds_identical_networks() {
        let a = ConvNet::new(tiny(), 11).unwrap();
        let b = ConvNet::new(tiny(), 11).unwrap();
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn training_mode_predict_is_seeded() {
        let config = ModelConfig { dropout: 0.5, hidden: 16, ..tiny() };
        let a = ConvNet::new(config.clone(), 4).unwrap();
        let b = ConvNet::new(config, 4).unwrap();
        let input = batch(2);

        let first = a.predict(&input, true).unwrap();
        assert_eq!(first, b.predict(&input, true).unwrap());
        assert_eq!(a.predict(&input, true).unwrap(), b.predict(&input, true).unwrap());

        // Inference is untouched by the dropout stream.
        assert_eq!(a.predict(&input, false).unwrap(), b.predict(&input, false).unwrap());
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn oversized_kernel_is_rejected() {
        let config = ModelConfig { kernel_size: 5, ..tiny() };
        assert!(matches!(ConvNet::new(config, 0), Err(HarnessError::InvalidArgument(_))));
    }
}
