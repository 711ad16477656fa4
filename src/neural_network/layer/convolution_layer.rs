use super::*;

/// Defines the padding method used in convolutional layers.
///
/// - `Valid`: No padding is applied, which reduces the output dimensions.
/// - `Same`: Padding is added to preserve the input spatial dimensions in the output.
/// - `Explicit`: A fixed number of zero rows/columns is added on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingType {
    /// No padding is applied. The convolution is only computed where the filter
    /// fully overlaps with the input.
    Valid,

    /// Zeros are added around the input so that the output has the same spatial
    /// dimensions as the input (when stride is 1).
    Same,

    /// `(rows, cols)` zeros are added above and below, and left and right, of the input.
    /// FCN8s pads its first convolution by 100 this way.
    Explicit(usize, usize),
}

impl PaddingType {
    /// Resolves the padding to `(top, bottom, left, right)` for a given input.
    pub(crate) fn resolve(
        &self,
        input_height: usize,
        input_width: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
    ) -> (usize, usize, usize, usize) {
        match *self {
            PaddingType::Valid => (0, 0, 0, 0),
            PaddingType::Explicit(rows, cols) => (rows, rows, cols, cols),
            PaddingType::Same => {
                let out_height = input_height.div_ceil(strides.0);
                let out_width = input_width.div_ceil(strides.1);

                let pad_height = (out_height.saturating_sub(1) * strides.0 + kernel_size.0)
                    .saturating_sub(input_height);
                let pad_width = (out_width.saturating_sub(1) * strides.1 + kernel_size.1)
                    .saturating_sub(input_width);

                let pad_top = pad_height / 2;
                let pad_left = pad_width / 2;
                (pad_top, pad_height - pad_top, pad_left, pad_width - pad_left)
            }
        }
    }
}

/// Input validation functions for convolutional layers
mod input_validation_function;

/// 2D Convolutional Layer
pub mod conv_2d;
/// 2D Transposed Convolutional Layer
pub mod conv_2d_transpose;

pub use conv_2d::*;
pub use conv_2d_transpose::*;
