pub use crate::error::{IoError, ModelError};

/// Prelude module for layers and initializers.
#[cfg(feature = "neural_network")]
pub mod neural_network_prelude;
/// Prelude module for the segmentation models.
#[cfg(feature = "models")]
pub mod models_prelude;

#[cfg(feature = "models")]
pub use models_prelude::*;
#[cfg(feature = "neural_network")]
pub use neural_network_prelude::*;
