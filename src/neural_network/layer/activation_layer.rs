use super::*;

/// Threshold for parallel element-wise computation (in number of elements)
const ACTIVATION_PARALLEL_THRESHOLD: usize = 10_000;

/// Helper function to format the output shape for activation layers.
///
/// Returns a formatted string representing the shape of the last input,
/// or "Unknown" if the layer has not seen an input yet.
fn format_output_shape(last_shape: &Option<Vec<usize>>) -> String {
    match last_shape {
        Some(shape) => format_shape(shape),
        None => "Unknown".to_string(),
    }
}

/// Linear (Identity) activation layer.
pub mod linear;
/// ReLU (Rectified Linear Unit) activation layer
pub mod relu;

pub use linear::*;
pub use relu::*;
