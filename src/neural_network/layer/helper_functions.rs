use super::*;

/// Calculates the pooled length along one spatial axis.
///
/// With `ceil_mode` the last, partial window is kept as long as it starts inside
/// the input, so `ceil((input - pool) / stride) + 1` windows are produced.
/// Otherwise partial windows are dropped: `floor((input - pool) / stride) + 1`.
///
/// # Parameters
///
/// - `input` - Input length along the axis
/// - `pool` - Window length along the axis
/// - `stride` - Step between windows
/// - `ceil_mode` - Whether to keep the partial last window
///
/// # Returns
///
/// * `usize` - Number of windows; 0 when the window is longer than the input
pub fn pooled_length(input: usize, pool: usize, stride: usize, ceil_mode: bool) -> usize {
    if input < pool {
        return if ceil_mode && input > 0 { 1 } else { 0 };
    }
    let span = input - pool;
    let steps = if ceil_mode {
        span.div_ceil(stride)
    } else {
        span / stride
    };
    let mut length = steps + 1;
    // The last window must start inside the input
    if ceil_mode && (length - 1) * stride >= input {
        length -= 1;
    }
    length
}

/// Calculates the output shape of the 2d pooling layer.
///
/// # Parameters
///
/// * `input_shape` - Shape of the input tensor, in format \[batch_size, channels, height, width\].
/// * `pool_size` - Size of the pooling window as a tuple (height, width).
/// * `strides` - Step size for the pooling window as a tuple (height_step, width_step).
/// * `ceil_mode` - Whether partial windows at the bottom/right edge produce an output.
///
/// # Returns
///
/// * `Vec<usize>` - A vector containing the calculated output shape, in format \[batch_size, channels, output_height, output_width\].
pub fn calculate_output_shape_2d_pooling(
    input_shape: &[usize],
    pool_size: (usize, usize),
    strides: (usize, usize),
    ceil_mode: bool,
) -> Vec<usize> {
    let batch_size = input_shape[0];
    let channels = input_shape[1];

    let output_height = pooled_length(input_shape[2], pool_size.0, strides.0, ceil_mode);
    let output_width = pooled_length(input_shape[3], pool_size.1, strides.1, ceil_mode);

    vec![batch_size, channels, output_height, output_width]
}

/// Calculates the output length of a transposed convolution along one axis
/// (no padding, no output padding): `(input - 1) * stride + kernel`.
pub fn transposed_length(input: usize, kernel: usize, stride: usize) -> usize {
    if input == 0 {
        return 0;
    }
    (input - 1) * stride + kernel
}

/// Merges per-batch results into a single 4D output tensor.
///
/// # Parameters
///
/// - `output_shape` - Shape of the merged tensor \[batch_size, channels, height, width\]
/// - `results` - Pairs of (batch index, \[channels, height, width\] block)
///
/// # Returns
///
/// * `ArrayD<f32>` - The merged tensor
pub fn merge_results(output_shape: Vec<usize>, results: Vec<(usize, Array3<f32>)>) -> ArrayD<f32> {
    let mut output: ArrayD<f32> = ArrayD::zeros(IxDyn(&output_shape));

    for (b, batch_output) in results {
        output
            .index_axis_mut(Axis(0), b)
            .assign(&batch_output.into_dyn());
    }

    output
}

/// Formats a shape as `(d0, d1, ...)`.
pub fn format_shape(shape: &[usize]) -> String {
    format!(
        "({})",
        shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}
