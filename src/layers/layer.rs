use crate::math::Matrix;
use crate::tensor::Tensor;

/// Identifies a layer's type during graph walks.
///
/// The gradient engine uses this to locate rectified-linear nodes when
/// guided backpropagation is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Conv,
    Linear,
    Relu,
    MaxPool,
    Flatten,
}

/// Common interface for network layers.
pub trait Layer {
    /// Forward pass, caching whatever the backward pass will need
    /// (activation masks, pooling indices, input shapes).
    fn forward_record(&mut self, x: &Tensor) -> Tensor;

    /// Backward pass returning the gradient with respect to the layer
    /// input, based on the state recorded by the last `forward_record`.
    fn backward(&mut self, grad_out: &Tensor) -> Tensor;

    /// The layer's type.
    fn kind(&self) -> LayerKind;

    /// Zero any accumulated parameter-gradient state.
    fn zero_grad(&mut self) {}

    /// Mutable references to parameter matrices, in a stable order, for
    /// persistence. Parameter-free layers return an empty vector.
    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        Vec::new()
    }
}
