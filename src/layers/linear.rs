use super::layer::{Layer, LayerKind};
use crate::math::Matrix;
use crate::rng::rng_from_env;
use crate::tensor::Tensor;
use rand::Rng;

/// Fully connected layer mapping a `(1, in_dim)` tensor to `(1, out_dim)`.
///
/// The last recorded input is kept so backward can produce the gradient
/// with respect to both the input and the weights; weight gradients are
/// accumulated until `zero_grad` and only exist so repeated engine calls
/// start from a clean slate.
pub struct Linear {
    pub w: Matrix,
    pub b: Matrix,
    grad_w: Matrix,
    grad_b: Matrix,
    last_x: Matrix,
}

impl Linear {
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        let mut rng = rng_from_env();
        let w = Matrix::from_vec(
            in_dim,
            out_dim,
            (0..in_dim * out_dim)
                .map(|_| rng.gen_range(-0.01..0.01))
                .collect(),
        );
        let b = Matrix::zeros(1, out_dim);
        let grad_w = Matrix::zeros(in_dim, out_dim);
        let grad_b = Matrix::zeros(1, out_dim);
        Self {
            w,
            b,
            grad_w,
            grad_b,
            last_x: Matrix::zeros(0, 0),
        }
    }
}

impl Layer for Linear {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        let x = x.to_matrix();
        let out = Matrix::matmul(&x, &self.w).add(&self.b);
        self.last_x = x;
        Tensor::from_matrix(out)
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let g = grad_out.to_matrix();
        let grad_w = Matrix::matmul(&self.last_x.transpose(), &g);
        self.grad_w = self.grad_w.add(&grad_w);
        self.grad_b = self.grad_b.add(&g);
        Tensor::from_matrix(Matrix::matmul(&g, &self.w.transpose()))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Linear
    }

    fn zero_grad(&mut self) {
        self.grad_w = Matrix::zeros(self.grad_w.rows, self.grad_w.cols);
        self.grad_b = Matrix::zeros(self.grad_b.rows, self.grad_b.cols);
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.w, &mut self.b]
    }
}
