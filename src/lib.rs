pub mod backprop;
pub mod config;
pub mod device;
pub mod layers;
pub mod logging;
pub mod math;
pub mod models;
pub mod rng;
pub mod tensor;
pub mod util;
pub mod viz;
pub mod weights;
