use std::fmt;

use crate::device::Device;
use crate::layers::{relu, LayerKind};
use crate::math;
use crate::models::Network;
use crate::tensor::Tensor;
use crate::util::logging::format_class_mismatch;

/// Errors surfaced by [`Backprop::calculate_gradients`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackpropError {
    /// The network only accepts a fixed spatial resolution and the input
    /// does not match it. Raised before any forward evaluation.
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl fmt::Display for BackpropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackpropError::ShapeMismatch { expected, actual } => write!(
                f,
                "Network requires {}x{} inputs but got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
        }
    }
}

impl std::error::Error for BackpropError {}

/// Capture/consume accounting for one guided backward pass.
///
/// `outstanding` must be zero after a completed call; anything else means
/// the forward and backward walks disagreed about the rectified-linear
/// layers they visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceReport {
    pub captured: usize,
    pub consumed: usize,
    pub outstanding: usize,
}

/// LIFO buffer of rectified-linear activations recorded during the
/// forward walk and consumed in reverse during the backward walk.
///
/// One trace is created inside each guided call and dropped when the call
/// returns, on success and on error alike, so interception state can never
/// accumulate across calls on the same engine.
struct ReluTrace {
    stack: Vec<Tensor>,
    captured: usize,
    consumed: usize,
}

impl ReluTrace {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            captured: 0,
            consumed: 0,
        }
    }

    fn push(&mut self, activation: Tensor) {
        self.captured += 1;
        self.stack.push(activation);
    }

    fn pop(&mut self) -> Tensor {
        self.consumed += 1;
        self.stack
            .pop()
            .expect("relu activation stack underflow: forward/backward pairing bug")
    }

    fn report(&self) -> TraceReport {
        TraceReport {
            captured: self.captured,
            consumed: self.consumed,
            outstanding: self.stack.len(),
        }
    }
}

/// Computes gradients of a target class score with respect to an input
/// image by performing a single backpropagation through the network.
///
/// The gradients can be used to visualise an image-specific class saliency
/// map, highlighting the regions of the input that contribute the most to
/// the corresponding output.
pub struct Backprop<'m> {
    model: &'m mut dyn Network,
    last_trace: Option<TraceReport>,
}

impl<'m> Backprop<'m> {
    pub fn new(model: &'m mut dyn Network) -> Self {
        Self {
            model,
            last_trace: None,
        }
    }

    /// Calculate gradients of the target class output w.r.t. `input`.
    ///
    /// `input` carries the semantic shape `(1, channels, height, width)`.
    /// If the network requires a fixed spatial resolution the input is
    /// checked against it before any computation begins. The backward seed
    /// is a one-hot mask at the network's own top-1 prediction; a
    /// `target_class` disagreeing with it produces a warning, never an
    /// error, and the prediction wins. Networks producing a flat rank-1
    /// output (binary classifiers) are backpropagated with an implicit
    /// all-ones seed and report no predicted class.
    ///
    /// With `take_max` the returned gradient is collapsed to a single
    /// channel by taking the maximum across channels per pixel; otherwise
    /// every input channel keeps its own gradient plane.
    ///
    /// In guided mode every rectified-linear layer's backward signal is
    /// replaced by the clipped product rule: upstream gradients clamped to
    /// be non-negative and gated by the recorded forward activation.
    pub fn calculate_gradients(
        &mut self,
        input: &Tensor,
        target_class: Option<usize>,
        take_max: bool,
        guided: bool,
        use_accelerator: bool,
    ) -> Result<(Tensor, Option<usize>), BackpropError> {
        assert_eq!(
            input.shape.len(),
            4,
            "input must be (batch, channels, height, width)"
        );
        assert_eq!(input.shape[0], 1, "only single-image batches are supported");

        let spec = self.model.input_spec();
        debug_assert_eq!(
            input.shape[1], spec.channels,
            "input channel count does not match the network"
        );
        if let Some((fh, fw)) = spec.fixed_hw {
            let actual = (input.shape[2], input.shape[3]);
            if actual != (fh, fw) {
                return Err(BackpropError::ShapeMismatch {
                    expected: (fh, fw),
                    actual,
                });
            }
        }

        let device = Device::select(use_accelerator);
        self.model.to_device(device);
        self.model.zero_grad();

        let mut trace = if guided { Some(ReluTrace::new()) } else { None };

        let (grad, predicted, report) = {
            let mut layers = self.model.layers_mut();

            // Forward walk, recording per-layer state for backward.
            let mut output = input.clone();
            for (_, layer) in layers.iter_mut() {
                output = layer.forward_record(&output);
                if let Some(trace) = trace.as_mut() {
                    if layer.kind() == LayerKind::Relu {
                        trace.push(output.clone());
                    }
                }
            }

            let (seed, predicted) = one_hot_seed(&output, target_class);
            let mut grad = seed.unwrap_or_else(|| Tensor::ones_like(&output));

            // Backward walk in reverse topological order. Guided mode
            // replaces the rectified-linear backward with the clipped
            // product rule; the stack is consumed last-in first-out.
            for (_, layer) in layers.iter_mut().rev() {
                grad = match trace.as_mut() {
                    Some(trace) if layer.kind() == LayerKind::Relu => {
                        let activation = trace.pop();
                        relu::guided_backward(&grad, &activation)
                    }
                    _ => layer.backward(&grad),
                };
            }

            (grad, predicted, trace.as_ref().map(|t| t.report()))
        };

        if let Some(report) = report {
            debug_assert_eq!(
                report.outstanding, 0,
                "unconsumed relu activations after backward"
            );
            self.last_trace = Some(report);
        }

        let mut gradient = grad.squeeze_batch();
        if take_max {
            gradient = gradient.channel_max();
        }
        Ok((gradient, predicted))
    }

    /// Capture/consume counts from the most recent guided call.
    pub fn last_trace(&self) -> Option<TraceReport> {
        self.last_trace
    }
}

/// Build the one-hot seed used to backpropagate a single class's score.
///
/// A rank-1 output (binary classifier) gets no mask and no predicted
/// class. Otherwise the seed has exactly one element set, at the top-1
/// index of `output`; a caller-supplied `target_class` that disagrees is
/// reported with a warning and never overrides the prediction.
pub fn one_hot_seed(output: &Tensor, target_class: Option<usize>) -> (Option<Tensor>, Option<usize>) {
    if output.shape.len() == 1 {
        return (None, None);
    }
    assert_eq!(output.shape.len(), 2);
    assert_eq!(output.shape[0], 1, "expected a (1, num_classes) output");

    let top = math::argmax(&output.data);
    if let Some(requested) = target_class {
        if requested != top {
            crate::warn!("{}", format_class_mismatch(top, requested));
        }
    }
    let mut seed = Tensor::zeros(output.shape.clone());
    seed.data[top] = 1.0;
    (Some(seed), Some(top))
}
