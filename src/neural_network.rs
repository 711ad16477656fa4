/// Weight initializers: bilinear upsampling kernels, Kaiming draws and input-channel splicing
pub mod initializer;
/// Module that contains neural network layer implementations
pub mod layer;
/// Core traits shared by all layers
pub mod neural_network_trait;
/// Named layer-weight collections persisted as JSON checkpoints
pub mod state_dict;

pub use initializer::*;
pub use layer::*;
pub use state_dict::*;

pub use crate::error::{IoError, ModelError};
use ndarray::ArrayD;

/// Type alias for n-dimensional arrays used as tensors in the neural network
pub type Tensor = ArrayD<f32>;

pub use neural_network_trait::{ActivationLayer, ApplyWeights, Layer};
