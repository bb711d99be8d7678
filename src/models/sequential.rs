use super::network::{InputSpec, Network};
use crate::device::Device;
use crate::layers::{Layer, LayerKind};
use crate::tensor::Tensor;

/// A container that applies named layers sequentially.
pub struct Sequential {
    layers: Vec<(String, Box<dyn Layer>)>,
    input: InputSpec,
    device: Device,
}

impl Sequential {
    /// Create an empty network with the given input constraints.
    pub fn new(input: InputSpec) -> Self {
        Self {
            layers: Vec::new(),
            input,
            device: Device::Cpu,
        }
    }

    /// Append a named layer to the sequence.
    pub fn add_layer<N: Into<String>>(&mut self, name: N, layer: Box<dyn Layer>) {
        self.layers.push((name.into(), layer));
    }

    /// Number of layers in the network.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of rectified-linear layers.
    pub fn relu_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|(_, l)| l.kind() == LayerKind::Relu)
            .count()
    }

    /// Names of all layers in forward order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The device this network currently lives on.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl Network for Sequential {
    fn forward(&mut self, x: &Tensor) -> Tensor {
        let mut out = x.clone();
        for (_, layer) in self.layers.iter_mut() {
            out = layer.forward_record(&out);
        }
        out
    }

    fn layers_mut(&mut self) -> Vec<(&str, &mut dyn Layer)> {
        self.layers
            .iter_mut()
            .map(|(name, layer)| (name.as_str(), layer.as_mut()))
            .collect()
    }

    fn zero_grad(&mut self) {
        for (_, layer) in self.layers.iter_mut() {
            layer.zero_grad();
        }
    }

    fn input_spec(&self) -> InputSpec {
        self.input
    }

    fn to_device(&mut self, device: Device) {
        self.device = device;
    }
}
