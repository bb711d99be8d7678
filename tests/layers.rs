use saliency::layers::{Conv2d, ConvError, Flatten, Layer, MaxPool2d, Relu};
use saliency::math::Matrix;
use saliency::models::simple_cnn;
use saliency::tensor::Tensor;

#[test]
fn conv_forward_accepts_matching_channels() {
    let mut conv = Conv2d::new(1, 2, 3, 1, 1);
    let x = Tensor::zeros(vec![1, 1, 4, 4]);
    let out = conv.forward_checked(&x).unwrap();
    assert_eq!(out.shape, vec![1, 2, 4, 4]);
}

#[test]
fn conv_forward_errors_on_channel_mismatch() {
    let mut conv = Conv2d::new(3, 1, 1, 1, 0);
    let x = Tensor::zeros(vec![1, 2, 4, 4]);
    assert!(matches!(
        conv.forward_checked(&x),
        Err(ConvError::ChannelMismatch { got: 2, expected: 3 })
    ));
}

#[test]
fn conv_1x1_backward_scales_gradient_by_weight() {
    let mut conv = Conv2d::new(1, 1, 1, 1, 0);
    conv.w = Matrix::from_vec(1, 1, vec![2.0]);
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2]);
    let out = conv.forward_record(&x);
    assert_eq!(out.data, vec![2.0, 4.0, 6.0, 8.0]);

    let grad_out = Tensor::new(vec![1.0; 4], vec![1, 1, 2, 2]);
    let grad_in = conv.backward(&grad_out);
    assert_eq!(grad_in.shape, vec![1, 1, 2, 2]);
    assert_eq!(grad_in.data, vec![2.0; 4]);
}

#[test]
fn maxpool_scatters_gradient_to_winning_positions() {
    let mut pool = MaxPool2d::new(2, 2);
    assert_eq!(pool.kernel(), 2);
    assert_eq!(pool.stride(), 2);

    let x = Tensor::new((0..16).map(|i| i as f32).collect(), vec![1, 1, 4, 4]);
    let out = pool.forward_record(&x);
    assert_eq!(out.shape, vec![1, 1, 2, 2]);
    assert_eq!(out.data, vec![5.0, 7.0, 13.0, 15.0]);

    let grad_out = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2]);
    let grad_in = pool.backward(&grad_out);
    let mut expected = vec![0.0; 16];
    expected[5] = 1.0;
    expected[7] = 2.0;
    expected[13] = 3.0;
    expected[15] = 4.0;
    assert_eq!(grad_in.data, expected);
}

#[test]
fn relu_masks_gradient_where_input_was_negative() {
    let mut relu = Relu::new();
    let x = Tensor::new(vec![-1.0, 2.0], vec![1, 2]);
    let out = relu.forward_record(&x);
    assert_eq!(out.data, vec![0.0, 2.0]);

    let grad = relu.backward(&Tensor::new(vec![5.0, 6.0], vec![1, 2]));
    assert_eq!(grad.data, vec![0.0, 6.0]);
}

#[test]
fn flatten_restores_spatial_shape_on_backward() {
    let mut flatten = Flatten::new();
    let x = Tensor::zeros(vec![1, 2, 3, 3]);
    let out = flatten.forward_record(&x);
    assert_eq!(out.shape, vec![1, 18]);

    let grad = flatten.backward(&Tensor::zeros(vec![1, 18]));
    assert_eq!(grad.shape, vec![1, 2, 3, 3]);
}

#[test]
fn simple_cnn_layout() {
    let net = simple_cnn(8, 3);
    assert_eq!(net.len(), 8);
    assert!(!net.is_empty());
    assert_eq!(net.relu_count(), 2);
    assert_eq!(
        net.layer_names(),
        vec!["conv1", "relu1", "pool1", "conv2", "relu2", "pool2", "flatten", "fc3"]
    );
}

#[test]
fn conv_reports_channel_configuration() {
    let conv = Conv2d::new(3, 8, 3, 1, 1);
    assert_eq!(conv.in_channels(), 3);
    assert_eq!(conv.out_channels(), 8);
}
