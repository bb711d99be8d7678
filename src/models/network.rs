use crate::device::Device;
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Input constraints advertised by a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSpec {
    /// Expected channel count of `(1, C, H, W)` inputs.
    pub channels: usize,
    /// Some architecture families only accept one spatial resolution
    /// (e.g. 299x299 for the inception-style trunk). `None` means the
    /// network adapts to whatever resolution it was built for.
    pub fixed_hw: Option<(usize, usize)>,
}

/// Interface the gradient engine expects from a classification model.
///
/// The engine drives explicit forward and backward walks over the layer
/// sequence, so `layers_mut` must yield sub-layers in topological forward
/// order; the backward walk visits them in reverse.
pub trait Network {
    /// Forward pass through the whole network, recording per-layer state
    /// for a later backward walk.
    fn forward(&mut self, x: &Tensor) -> Tensor;

    /// Ordered, named sub-layers in topological forward order.
    fn layers_mut(&mut self) -> Vec<(&str, &mut dyn Layer)>;

    /// Zero accumulated gradient state in all layers.
    fn zero_grad(&mut self);

    /// Input constraints for this architecture.
    fn input_spec(&self) -> InputSpec;

    /// Best-effort device transfer.
    fn to_device(&mut self, _device: Device) {}
}
