pub use crate::error::{IoError, ModelError};
pub use crate::neural_network::Tensor;
pub use crate::neural_network::neural_network_trait::{ActivationLayer, ApplyWeights, Layer};
use ndarray::{Array2, Array3, Array4, ArrayD, Axis, IxDyn, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rayon::prelude::*;

/// Number of trainable parameters reported by a layer
///
/// # Variants
///
/// - `Trainable(usize)` - The layer holds this many trainable values
/// - `NoTrainable` - The layer has nothing to learn (activations, pooling, dropout)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingParameters {
    Trainable(usize),
    NoTrainable,
}

impl TrainingParameters {
    /// Number of trainable values, zero for `NoTrainable`.
    pub fn count(&self) -> usize {
        match self {
            TrainingParameters::Trainable(n) => *n,
            TrainingParameters::NoTrainable => 0,
        }
    }
}

/// A macro that generates the `param_count` and `get_weights` functions for
/// layers without trainable parameters.
macro_rules! no_trainable_parameters_layer_functions {
    () => {
        fn param_count(&self) -> TrainingParameters {
            TrainingParameters::NoTrainable
        }

        fn get_weights(&self) -> LayerWeight<'_> {
            LayerWeight::Empty
        }
    };
}

/// Runs `$compute(b, c)` for every (batch, channel) pair, in parallel when
/// `batch_size * channels` reaches `$threshold`.
macro_rules! execute_parallel_or_sequential {
    ($batch_size:expr, $channels:expr, $threshold:expr, $compute:expr) => {{
        let pairs: Vec<(usize, usize)> = (0..$batch_size)
            .flat_map(|b| (0..$channels).map(move |c| (b, c)))
            .collect();
        if $batch_size * $channels >= $threshold {
            pairs
                .into_par_iter()
                .map(|(b, c)| $compute(b, c))
                .collect()
        } else {
            pairs.into_iter().map(|(b, c)| $compute(b, c)).collect()
        }
    }};
}

/// Activation layers used after convolutions
pub mod activation_layer;
/// 2D convolution and transposed convolution layers
pub mod convolution_layer;
/// Shape helpers shared by convolution and pooling layers
pub mod helper_functions;
/// Borrowed views of layer weights
pub mod layer_weight;
/// Max pooling layers
pub mod pooling_layer;
/// Channel dropout layers
pub mod regularization_layer;
/// Serializable (owned) layer weights used by checkpoints
pub mod serialize_weight;

pub use activation_layer::*;
pub use convolution_layer::*;
pub use helper_functions::*;
pub use layer_weight::*;
pub use pooling_layer::*;
pub use regularization_layer::*;
pub use serialize_weight::*;
