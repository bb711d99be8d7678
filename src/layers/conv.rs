use std::fmt;

use super::layer::{Layer, LayerKind};
use crate::math::Matrix;
use crate::rng::rng_from_env;
use crate::tensor::Tensor;
use rand::Rng;

/// 2D convolution layer using im2col and a linear weight matrix.
///
/// Inputs carry the semantic shape `(1, in_channels, height, width)`.
/// The layer performs a standard 2D convolution with the given kernel
/// size, stride and padding; the weights are stored as a single
/// `(in_channels * k * k, out_channels)` matrix so the forward pass is one
/// matmul over the unrolled patches.
pub struct Conv2d {
    pub w: Matrix,
    grad_w: Matrix,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    // Cached from the last recorded forward pass, required for backward.
    last_cols: Matrix,
    last_input_hw: (usize, usize),
    last_output_hw: (usize, usize),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConvError {
    ChannelMismatch { got: usize, expected: usize },
}

impl fmt::Display for ConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvError::ChannelMismatch { got, expected } => write!(
                f,
                "Input has {} channels but the layer expects {}",
                got, expected
            ),
        }
    }
}

impl std::error::Error for ConvError {}

impl Conv2d {
    /// Create a new convolution layer with small random weights.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    ) -> Self {
        let in_dim = in_channels * kernel_size * kernel_size;
        let mut rng = rng_from_env();
        let w = Matrix::from_vec(
            in_dim,
            out_channels,
            (0..in_dim * out_channels)
                .map(|_| rng.gen_range(-0.01..0.01))
                .collect(),
        );
        let grad_w = Matrix::zeros(in_dim, out_channels);
        Self {
            w,
            grad_w,
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            last_cols: Matrix::zeros(0, 0),
            last_input_hw: (0, 0),
            last_output_hw: (0, 0),
        }
    }

    fn output_hw(&self, in_h: usize, in_w: usize) -> (usize, usize) {
        let out_h = (in_h + 2 * self.padding - self.kernel_size) / self.stride + 1;
        let out_w = (in_w + 2 * self.padding - self.kernel_size) / self.stride + 1;
        (out_h, out_w)
    }

    fn im2col(&self, x: &Tensor, out_h: usize, out_w: usize) -> Matrix {
        let (in_h, in_w) = (x.shape[2], x.shape[3]);
        let plane = in_h * in_w;
        let mut cols = Matrix::zeros(
            out_h * out_w,
            self.in_channels * self.kernel_size * self.kernel_size,
        );
        let mut row = 0;
        for oh in 0..out_h {
            for ow in 0..out_w {
                let mut col_idx = 0;
                for ic in 0..self.in_channels {
                    for kh in 0..self.kernel_size {
                        for kw in 0..self.kernel_size {
                            let ih = (oh * self.stride + kh) as isize - self.padding as isize;
                            let iw = (ow * self.stride + kw) as isize - self.padding as isize;
                            if ih >= 0 && ih < in_h as isize && iw >= 0 && iw < in_w as isize {
                                let idx = ic * plane + ih as usize * in_w + iw as usize;
                                cols.set(row, col_idx, x.data[idx]);
                            }
                            col_idx += 1;
                        }
                    }
                }
                row += 1;
            }
        }
        cols
    }

    fn col2im(&self, cols: &Matrix, in_h: usize, in_w: usize, out_h: usize, out_w: usize) -> Tensor {
        let plane = in_h * in_w;
        let mut img = Tensor::zeros(vec![1, self.in_channels, in_h, in_w]);
        let mut row = 0;
        for oh in 0..out_h {
            for ow in 0..out_w {
                let mut col_idx = 0;
                for ic in 0..self.in_channels {
                    for kh in 0..self.kernel_size {
                        for kw in 0..self.kernel_size {
                            let ih = (oh * self.stride + kh) as isize - self.padding as isize;
                            let iw = (ow * self.stride + kw) as isize - self.padding as isize;
                            if ih >= 0 && ih < in_h as isize && iw >= 0 && iw < in_w as isize {
                                let idx = ic * plane + ih as usize * in_w + iw as usize;
                                img.data[idx] += cols.get(row, col_idx);
                            }
                            col_idx += 1;
                        }
                    }
                }
                row += 1;
            }
        }
        img
    }

    fn reshape_output(&self, out_cols: &Matrix, out_h: usize, out_w: usize) -> Tensor {
        let mut out = Tensor::zeros(vec![1, self.out_channels, out_h, out_w]);
        let mut row = 0;
        for oh in 0..out_h {
            for ow in 0..out_w {
                for oc in 0..self.out_channels {
                    let idx = oc * out_h * out_w + oh * out_w + ow;
                    out.data[idx] = out_cols.get(row, oc);
                }
                row += 1;
            }
        }
        out
    }

    /// Recorded forward pass returning a checked result.
    pub fn forward_checked(&mut self, x: &Tensor) -> Result<Tensor, ConvError> {
        assert_eq!(x.shape.len(), 4, "Conv2d expects (1, C, H, W) inputs");
        if x.shape[1] != self.in_channels {
            return Err(ConvError::ChannelMismatch {
                got: x.shape[1],
                expected: self.in_channels,
            });
        }
        let (in_h, in_w) = (x.shape[2], x.shape[3]);
        let (out_h, out_w) = self.output_hw(in_h, in_w);
        let cols = self.im2col(x, out_h, out_w);
        let out_cols = Matrix::matmul(&cols, &self.w);
        self.last_cols = cols;
        self.last_input_hw = (in_h, in_w);
        self.last_output_hw = (out_h, out_w);
        Ok(self.reshape_output(&out_cols, out_h, out_w))
    }

    /// Accessor methods for inspection.
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }
}

impl Layer for Conv2d {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        self.forward_checked(x)
            .expect("invalid input to Conv2d forward")
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let (in_h, in_w) = self.last_input_hw;
        let (out_h, out_w) = self.last_output_hw;
        let mut grad_cols = Matrix::zeros(out_h * out_w, self.out_channels);
        let mut row = 0;
        for oh in 0..out_h {
            for ow in 0..out_w {
                for oc in 0..self.out_channels {
                    let idx = oc * out_h * out_w + oh * out_w + ow;
                    grad_cols.set(row, oc, grad_out.data[idx]);
                }
                row += 1;
            }
        }
        let grad_w = Matrix::matmul(&self.last_cols.transpose(), &grad_cols);
        self.grad_w = self.grad_w.add(&grad_w);
        let grad_in_cols = Matrix::matmul(&grad_cols, &self.w.transpose());
        self.col2im(&grad_in_cols, in_h, in_w, out_h, out_w)
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Conv
    }

    fn zero_grad(&mut self) {
        self.grad_w = Matrix::zeros(self.grad_w.rows, self.grad_w.cols);
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.w]
    }
}
