use super::*;

/// A macro that defines a public `set_training` method toggling the `training` field.
macro_rules! mode_dependent_layer_set_training {
    () => {
        /// Sets the training mode for the layer.
        ///
        /// # Arguments
        ///
        /// * `is_training` - `true` for training mode, `false` for inference mode.
        pub fn set_training(&mut self, is_training: bool) {
            self.training = is_training;
        }
    };
}

/// A macro that defines a method `set_training_if_mode_dependent` for a layer that may have
/// behavior dependent on whether it is in training or inference mode.
macro_rules! mode_dependent_layer_trait {
    () => {
        fn set_training_if_mode_dependent(&mut self, is_training: bool) {
            self.set_training(is_training);
        }
    };
}

/// Validates a dropout rate.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if `rate` is outside \[0, 1\].
fn validate_rate(rate: f32, name: &str) -> Result<(), ModelError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be between 0 and 1, got {}",
            name, rate
        )));
    }
    Ok(())
}

/// Channel-wise dropout for 4D feature maps
pub mod spatial_dropout_2d;

pub use spatial_dropout_2d::*;
