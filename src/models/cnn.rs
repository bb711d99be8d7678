use super::network::InputSpec;
use super::sequential::Sequential;
use crate::layers::{Conv2d, Flatten, Linear, MaxPool2d, Relu};

/// Build a small two-block CNN classifier for RGB inputs of `side` pixels.
///
/// Two convolution + ReLU blocks, each followed by 2x2 max pooling, then a
/// linear classification head. The network accepts any resolution it was
/// built for (`fixed_hw` is `None`); `side` must be divisible by four so
/// the pooled feature map has a clean size.
pub fn simple_cnn(side: usize, num_classes: usize) -> Sequential {
    assert!(side % 4 == 0, "side must be divisible by 4");
    let mut net = Sequential::new(InputSpec {
        channels: 3,
        fixed_hw: None,
    });
    net.add_layer("conv1", Box::new(Conv2d::new(3, 8, 3, 1, 1)));
    net.add_layer("relu1", Box::new(Relu::new()));
    net.add_layer("pool1", Box::new(MaxPool2d::new(2, 2)));
    net.add_layer("conv2", Box::new(Conv2d::new(8, 16, 3, 1, 1)));
    net.add_layer("relu2", Box::new(Relu::new()));
    net.add_layer("pool2", Box::new(MaxPool2d::new(2, 2)));
    net.add_layer("flatten", Box::new(Flatten::new()));
    let feature_dim = 16 * (side / 4) * (side / 4);
    net.add_layer(
        format!("fc{}", num_classes),
        Box::new(Linear::new(feature_dim, num_classes)),
    );
    net
}

/// Build a miniature inception-style trunk.
///
/// The family is resolution-bound: it only accepts 299x299 RGB inputs,
/// which the gradient engine enforces before running any computation.
pub fn inception_mini(num_classes: usize) -> Sequential {
    let mut net = Sequential::new(InputSpec {
        channels: 3,
        fixed_hw: Some((299, 299)),
    });
    // 299 -> 149 -> 147 -> 73 across the stem, as in the full architecture
    net.add_layer("stem_conv1", Box::new(Conv2d::new(3, 8, 3, 2, 0)));
    net.add_layer("stem_relu1", Box::new(Relu::new()));
    net.add_layer("stem_conv2", Box::new(Conv2d::new(8, 16, 3, 1, 0)));
    net.add_layer("stem_relu2", Box::new(Relu::new()));
    net.add_layer("stem_pool", Box::new(MaxPool2d::new(3, 2)));
    net.add_layer("flatten", Box::new(Flatten::new()));
    net.add_layer(
        format!("fc{}", num_classes),
        Box::new(Linear::new(16 * 73 * 73, num_classes)),
    );
    net
}
