//! Fully convolutional networks for portrait/background segmentation.
//!
//! The crate provides an FCN8s network built from `ndarray` layers, plus the
//! portrait variants derived from it:
//!
//! - [`models::PortraitFcn`] - FCN8s with two output classes
//! - [`models::PortraitFcnPlus`] - FCN8s whose first convolution takes six input
//!   channels, built by splicing Kaiming-initialized kernels onto pretrained ones
//! - [`models::Fcn8sProbe`] - FCN8s whose forward pass returns named intermediate activations
//!
//! Transposed convolutions are initialized with a bilinear kernel, see
//! [`neural_network::initializer::get_upsampling_weight`].

pub use serde::{Deserialize, Serialize};

/// Error types for model construction, forward passes and checkpoint IO
pub mod error;

/// Layers, weight initializers and checkpoint format
#[cfg(feature = "neural_network")]
pub mod neural_network;

/// FCN8s and the portrait segmentation variants
#[cfg(feature = "models")]
pub mod models;

pub mod prelude;
