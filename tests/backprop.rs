use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use saliency::backprop::{one_hot_seed, Backprop, BackpropError};
use saliency::device::Device;
use saliency::layers::{Flatten, Layer, LayerKind, Linear};
use saliency::math::{self, Matrix};
use saliency::models::{simple_cnn, InputSpec, Sequential};
use saliency::tensor::Tensor;

/// Reshapes the single logit of a binary classifier to a rank-1 tensor.
struct BinaryHead {
    classes: usize,
}

impl Layer for BinaryHead {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        self.classes = x.data.len();
        let mut out = x.clone();
        out.reshape(vec![self.classes]);
        out
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        let mut grad = grad_out.clone();
        grad.reshape(vec![1, self.classes]);
        grad
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Flatten
    }
}

/// Counts forward evaluations so tests can assert none happened.
struct CountingLayer {
    calls: Arc<AtomicUsize>,
}

impl Layer for CountingLayer {
    fn forward_record(&mut self, x: &Tensor) -> Tensor {
        self.calls.fetch_add(1, Ordering::SeqCst);
        x.clone()
    }

    fn backward(&mut self, grad_out: &Tensor) -> Tensor {
        grad_out.clone()
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Linear
    }
}

fn binary_net() -> Sequential {
    let mut net = Sequential::new(InputSpec {
        channels: 1,
        fixed_hw: None,
    });
    net.add_layer("flatten", Box::new(Flatten::new()));
    net.add_layer("fc1", Box::new(Linear::new(4, 1)));
    net.add_layer("head", Box::new(BinaryHead { classes: 0 }));
    net
}

#[test]
fn binary_classifier_gets_no_target_class() {
    let mut net = binary_net();
    let mut bp = Backprop::new(&mut net);
    let input = Tensor::new(vec![1.0; 4], vec![1, 1, 2, 2]);
    let (grad, predicted) = bp
        .calculate_gradients(&input, None, false, false, false)
        .unwrap();
    assert_eq!(predicted, None);
    assert_eq!(grad.shape, vec![1, 2, 2]);
}

#[test]
fn seed_is_one_hot_at_top1() {
    let output = Tensor::new(vec![0.1, 3.0, -1.0, 2.0], vec![1, 4]);
    let (seed, predicted) = one_hot_seed(&output, None);
    let seed = seed.unwrap();
    assert_eq!(seed.shape, vec![1, 4]);
    assert_eq!(seed.data, vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(predicted, Some(1));
}

#[test]
fn seed_ignores_disagreeing_target() {
    let output = Tensor::new(vec![0.1, 3.0, -1.0, 2.0], vec![1, 4]);
    let (seed, predicted) = one_hot_seed(&output, Some(3));
    assert_eq!(seed.unwrap().data, vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(predicted, Some(1));
}

#[test]
fn rank1_output_builds_no_mask() {
    let output = Tensor::new(vec![0.7], vec![1]);
    let (seed, predicted) = one_hot_seed(&output, Some(0));
    assert!(seed.is_none());
    assert_eq!(predicted, None);
}

#[test]
fn prediction_wins_over_requested_target() {
    let mut net = Sequential::new(InputSpec {
        channels: 1,
        fixed_hw: None,
    });
    net.add_layer("flatten", Box::new(Flatten::new()));
    let mut fc = Linear::new(4, 3);
    // logits of an all-ones input argmax at class 2
    fc.w = Matrix::from_vec(
        4,
        3,
        vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ],
    );
    net.add_layer("fc3", Box::new(fc));

    let mut bp = Backprop::new(&mut net);
    let input = Tensor::new(vec![1.0; 4], vec![1, 1, 2, 2]);
    let (_, predicted) = bp
        .calculate_gradients(&input, Some(0), false, false, false)
        .unwrap();
    assert_eq!(predicted, Some(2));
}

#[test]
fn take_max_collapses_channels() {
    let input = Tensor::new(vec![0.5; 3 * 8 * 8], vec![1, 3, 8, 8]);

    let mut net = simple_cnn(8, 5);
    let mut bp = Backprop::new(&mut net);
    let (grad, _) = bp
        .calculate_gradients(&input, None, false, false, false)
        .unwrap();
    assert_eq!(grad.shape, vec![3, 8, 8]);

    let mut net = simple_cnn(8, 5);
    let mut bp = Backprop::new(&mut net);
    let (grad, _) = bp
        .calculate_gradients(&input, None, true, false, false)
        .unwrap();
    assert_eq!(grad.shape, vec![1, 8, 8]);
}

#[test]
fn fixed_resolution_mismatch_fails_before_forward() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut net = Sequential::new(InputSpec {
        channels: 3,
        fixed_hw: Some((299, 299)),
    });
    net.add_layer(
        "probe",
        Box::new(CountingLayer {
            calls: calls.clone(),
        }),
    );

    let mut bp = Backprop::new(&mut net);
    let input = Tensor::zeros(vec![1, 3, 224, 224]);
    let err = bp
        .calculate_gradients(&input, None, false, false, false)
        .unwrap_err();
    assert!(matches!(
        err,
        BackpropError::ShapeMismatch {
            expected: (299, 299),
            actual: (224, 224),
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn end_to_end_224_take_max() {
    let mut net = simple_cnn(224, 10);
    math::reset_matrix_ops();
    let input = Tensor::new(vec![0.5; 3 * 224 * 224], vec![1, 3, 224, 224]);
    let mut bp = Backprop::new(&mut net);
    let (grad, predicted) = bp
        .calculate_gradients(&input, None, true, false, true)
        .unwrap();
    assert_eq!(grad.shape, vec![1, 224, 224]);
    assert!(predicted.unwrap() < 10);
    assert!(math::matrix_ops_count() > 0);
}

#[test]
fn accelerator_request_falls_back_to_cpu() {
    let mut net = simple_cnn(8, 2);
    let input = Tensor::new(vec![0.25; 3 * 8 * 8], vec![1, 3, 8, 8]);
    {
        let mut bp = Backprop::new(&mut net);
        bp.calculate_gradients(&input, None, false, false, true)
            .unwrap();
    }
    assert_eq!(net.device(), Device::Cpu);
}
