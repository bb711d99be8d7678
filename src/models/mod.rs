pub mod cnn;
pub mod network;
pub mod sequential;

pub use cnn::{inception_mini, simple_cnn};
pub use network::{InputSpec, Network};
pub use sequential::Sequential;
