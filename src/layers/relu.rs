use super::layer::{Layer, LayerKind};
use crate::tensor::Tensor;

/// Guided-backpropagation rule for a rectified-linear node: clamp the
/// upstream gradient to be non-negative, then gate it element-wise by the
/// activation recorded during the forward pass. Both the gradient sign and
/// the forward activation must be non-negative for a contribution to pass.
pub fn guided_backward(grad_out: &Tensor, activation: &Tensor) -> Tensor {
    assert_eq!(grad_out.shape, activation.shape);
    let data = grad_out
        .data
        .iter()
        .zip(activation.data.iter())
        .map(|(&g, &a)| g.max(0.0) * a)
        .collect();
    Tensor::new(data, grad_out.shape.clone())
}

/// ReLU activation layer.
pub struct Relu {
    mask: Vec<f32>,
}

impl Relu {
    pub fn new() -> Self {
        Self { mask: Vec::new() }
    }
}

impl Default for Relu {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Relu {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        let mut out = x.clone();
        let mut mask = vec![0.0; out.data.len()];
        for (i, v) in out.data.iter_mut().enumerate() {
            if *v < 0.0 {
                *v = 0.0;
            } else {
                mask[i] = 1.0;
            }
        }
        self.mask = mask;
        out
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let mut grad = grad_out.clone();
        for (g, &m) in grad.data.iter_mut().zip(self.mask.iter()) {
            *g *= m;
        }
        grad
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Relu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guided_backward_zeroes_negative_gradients() {
        let grad = Tensor::new(vec![-1.0, 2.0, 0.5], vec![3]);
        let act = Tensor::new(vec![3.0, 4.0, 0.0], vec![3]);
        let out = guided_backward(&grad, &act);
        assert_eq!(out.data, vec![0.0, 8.0, 0.0]);
    }
}
