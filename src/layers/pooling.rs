use super::layer::{Layer, LayerKind};
use crate::tensor::Tensor;

/// 2D max pooling over `(1, C, H, W)` tensors.
///
/// The recorded forward pass keeps the flat index of the winning element
/// for every pooling window so backward can scatter gradients back to the
/// exact positions that produced each maximum.
pub struct MaxPool2d {
    kernel: usize,
    stride: usize,
    indices: Vec<usize>,
    input_shape: (usize, usize, usize),
}

impl MaxPool2d {
    pub fn new(kernel: usize, stride: usize) -> Self {
        Self {
            kernel,
            stride,
            indices: Vec::new(),
            input_shape: (0, 0, 0),
        }
    }

    pub fn kernel(&self) -> usize {
        self.kernel
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl Layer for MaxPool2d {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        assert_eq!(x.shape.len(), 4, "MaxPool2d expects (1, C, H, W) inputs");
        let (c, h, w) = (x.shape[1], x.shape[2], x.shape[3]);
        let out_h = (h - self.kernel) / self.stride + 1;
        let out_w = (w - self.kernel) / self.stride + 1;
        let plane = h * w;
        let mut out = Tensor::zeros(vec![1, c, out_h, out_w]);
        let mut indices = vec![0usize; c * out_h * out_w];
        let mut idx = 0;
        for ch in 0..c {
            for oh in 0..out_h {
                for ow in 0..out_w {
                    let mut best = f32::NEG_INFINITY;
                    let mut best_idx = 0usize;
                    for kh in 0..self.kernel {
                        for kw in 0..self.kernel {
                            let ih = oh * self.stride + kh;
                            let iw = ow * self.stride + kw;
                            let flat = ch * plane + ih * w + iw;
                            let val = x.data[flat];
                            if val > best {
                                best = val;
                                best_idx = flat;
                            }
                        }
                    }
                    out.data[idx] = best;
                    indices[idx] = best_idx;
                    idx += 1;
                }
            }
        }
        self.indices = indices;
        self.input_shape = (c, h, w);
        out
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let (c, h, w) = self.input_shape;
        let mut grad_in = Tensor::zeros(vec![1, c, h, w]);
        for (i, &idx) in self.indices.iter().enumerate() {
            grad_in.data[idx] += grad_out.data[i];
        }
        grad_in
    }

    fn kind(&self) -> LayerKind {
        LayerKind::MaxPool
    }
}
