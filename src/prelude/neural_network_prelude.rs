pub use crate::neural_network::Tensor;
pub use crate::neural_network::initializer::*;
pub use crate::neural_network::layer::activation_layer::*;
pub use crate::neural_network::layer::convolution_layer::*;
pub use crate::neural_network::layer::pooling_layer::*;
pub use crate::neural_network::layer::regularization_layer::*;
pub use crate::neural_network::layer::{LayerWeight, TrainingParameters};
pub use crate::neural_network::neural_network_trait::{ActivationLayer, Layer};
pub use crate::neural_network::state_dict::{Checkpoint, NamedLayerWeight};
