use super::layer::{Layer, LayerKind};
use crate::tensor::Tensor;

/// Flattens a `(1, C, H, W)` tensor to `(1, C * H * W)` for the linear
/// head, remembering the spatial shape so backward can restore it.
pub struct Flatten {
    input_shape: Vec<usize>,
}

impl Flatten {
    pub fn new() -> Self {
        Self {
            input_shape: Vec::new(),
        }
    }
}

impl Default for Flatten {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Flatten {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        assert!(!x.shape.is_empty() && x.shape[0] == 1);
        self.input_shape = x.shape.clone();
        let mut out = x.clone();
        let features = x.data.len();
        out.reshape(vec![1, features]);
        out
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let mut grad = grad_out.clone();
        grad.reshape(self.input_shape.clone());
        grad
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Flatten
    }
}
