use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction, data::ImageShape};

/// Single-channel 2-D convolution, stride 1, no padding, followed by ReLU.
///
/// Each input row is one image flattened row-major (`height * width` values).
/// Each output row holds `filters` feature maps of `out_height × out_width`,
/// laid out filter-major, which doubles as the flattened representation the
/// dense layer after it consumes.
#[derive(Debug, Clone)]
pub struct Conv2d {
    pub input_shape: ImageShape,
    pub kernel_size: usize,
    pub kernels: Matrix,  // filters × (kernel_size * kernel_size)
    pub biases: Matrix,   // 1 × filters
    activator: ActivationFunction,
    inputs: Matrix,
    pre_neurons: Matrix,
}

impl Conv2d {
    /// Caller guarantees `kernel_size` fits inside `input_shape`.
    pub fn new<R: Rng + ?Sized>(
        input_shape: ImageShape,
        filters: usize,
        kernel_size: usize,
        rng: &mut R,
    ) -> Conv2d {
        let fan_in = kernel_size * kernel_size;
        Conv2d {
            input_shape,
            kernel_size,
            kernels: Matrix::he(filters, fan_in, fan_in, rng),
            biases: Matrix::zeros(1, filters),
            activator: ActivationFunction::ReLU,
            inputs: Matrix::default(),
            pre_neurons: Matrix::default(),
        }
    }

    pub fn filters(&self) -> usize {
        self.kernels.rows
    }

    pub fn out_height(&self) -> usize {
        self.input_shape.height + 1 - self.kernel_size
    }

    pub fn out_width(&self) -> usize {
        self.input_shape.width + 1 - self.kernel_size
    }

    /// Length of one flattened output row.
    pub fn output_len(&self) -> usize {
        self.filters() * self.out_height() * self.out_width()
    }

    /// Pure forward pass; leaves the layer untouched.
    pub fn forward(&self, input: &Matrix) -> Matrix {
        self.activator.apply(&self.convolve(input))
    }

    /// Forward pass that remembers its input and pre-activations for backprop.
    pub fn feed_from(&mut self, input: Matrix) -> Matrix {
        let z = self.convolve(&input);
        let a = self.activator.apply(&z);
        self.inputs = input;
        self.pre_neurons = z;
        a
    }

    /// Returns `(kernels_grad, biases_grad)` for the cached batch.
    ///
    /// No input gradient: this is always the first layer of the model.
    pub fn compute_gradients(&self, output_grad: &Matrix) -> (Matrix, Matrix) {
        let act_derivative = self.pre_neurons.map(|x| self.activator.derivative(x));
        let delta = output_grad.hadamard(&act_derivative);

        let (k, w) = (self.kernel_size, self.input_shape.width);
        let (oh, ow) = (self.out_height(), self.out_width());
        let plane = oh * ow;

        let mut kernels_grad = Matrix::zeros(self.filters(), k * k);
        let mut biases_grad = Matrix::zeros(1, self.filters());

        for (image, delta_row) in self.inputs.data.iter().zip(delta.data.iter()) {
            for f in 0..self.filters() {
                let grad_f = &mut kernels_grad.data[f];
                for y in 0..oh {
                    for x in 0..ow {
                        let d = delta_row[f * plane + y * ow + x];
                        if d == 0.0 {
                            continue;
                        }
                        biases_grad.data[0][f] += d;
                        for i in 0..k {
                            let src = &image[(y + i) * w + x..(y + i) * w + x + k];
                            for (g, p) in grad_f[i * k..(i + 1) * k].iter_mut().zip(src) {
                                *g += d * p;
                            }
                        }
                    }
                }
            }
        }

        (kernels_grad, biases_grad)
    }

    pub fn cached_batch(&self) -> usize {
        self.pre_neurons.rows
    }

    fn convolve(&self, input: &Matrix) -> Matrix {
        let (k, w) = (self.kernel_size, self.input_shape.width);
        let (oh, ow) = (self.out_height(), self.out_width());
        let plane = oh * ow;

        let mut out = Matrix::zeros(input.rows, self.output_len());
        for (image, out_row) in input.data.iter().zip(out.data.iter_mut()) {
            for (f, kernel) in self.kernels.data.iter().enumerate() {
                let bias = self.biases.data[0][f];
                for y in 0..oh {
                    for x in 0..ow {
                        let mut acc = bias;
                        for i in 0..k {
                            let src = &image[(y + i) * w + x..(y + i) * w + x + k];
                            acc += src.iter().zip(&kernel[i * k..(i + 1) * k])
                                .map(|(p, q)| p * q)
                                .sum::<f64>();
                        }
                        out_row[f * plane + y * ow + x] = acc;
                    }
                }
            }
        }
        out
    }
}
