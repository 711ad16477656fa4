use super::*;

/// A macro that generates standard function implementations for 2D pooling layers.
///
/// This macro expands to implementations of:
/// - `output_shape`: The pooled shape of the most recent input, or "Unknown"
/// - Standard layer functions for layers without trainable parameters
macro_rules! layer_functions_2d_pooling {
    () => {
        fn output_shape(&self) -> String {
            match &self.last_input_shape {
                Some(shape) => format_shape(&calculate_output_shape_2d_pooling(
                    shape,
                    self.pool_size,
                    self.strides,
                    self.ceil_mode,
                )),
                None => String::from("Unknown"),
            }
        }

        no_trainable_parameters_layer_functions!();
    };
}

/// Input validation functions for pooling layers
mod input_validation_function;

/// 2D Max Pooling Layer
pub mod max_pooling_2d;

pub use max_pooling_2d::*;
