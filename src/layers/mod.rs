pub mod conv;
pub mod flatten;
pub mod layer;
pub mod linear;
pub mod pooling;
pub mod relu;

pub use conv::{Conv2d, ConvError};
pub use flatten::Flatten;
pub use layer::{Layer, LayerKind};
pub use linear::Linear;
pub use pooling::MaxPool2d;
pub use relu::Relu;
