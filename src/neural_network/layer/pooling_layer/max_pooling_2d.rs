use super::input_validation_function::*;
use super::*;

/// Threshold for deciding between parallel and sequential execution.
/// When batch_size * channels >= this threshold, use parallel execution.
const MAX_POOLING_2D_PARALLEL_THRESHOLD: usize = 32;

/// 2D max pooling layer.
///
/// Selects the maximum value within each pooling window across height and width.
/// Input tensor shape: `[batch_size, channels, height, width]`. Output tensor shape:
/// `[batch_size, channels, pooled_height, pooled_width]`.
///
/// With `ceil_mode` the pooled size is rounded up, so a partial window at the
/// bottom/right edge still produces an output (taken over the part of the window
/// that lies inside the input). FCN8s pools this way so that odd feature maps keep
/// their last row and column.
///
/// # Fields
///
/// - `pool_size` - Size of the pooling window as (height, width)
/// - `strides` - Step size of the pooling operation as (vertical stride, horizontal stride)
/// - `ceil_mode` - Whether the output size is rounded up
/// - `last_input_shape` - Shape of the most recent input
///
/// # Examples
/// ```rust
/// use portraitseg::prelude::*;
/// use ndarray::Array4;
///
/// let x = Array4::ones((1, 2, 5, 5)).into_dyn();
///
/// let mut floor_pool = MaxPooling2D::new((2, 2), None, false).unwrap();
/// assert_eq!(floor_pool.forward(&x).unwrap().shape(), &[1, 2, 2, 2]);
///
/// let mut ceil_pool = MaxPooling2D::new((2, 2), None, true).unwrap();
/// assert_eq!(ceil_pool.forward(&x).unwrap().shape(), &[1, 2, 3, 3]);
/// ```
///
/// # Performance
///
/// Parallel execution is used when `batch_size * channels >= MAX_POOLING_2D_PARALLEL_THRESHOLD` (32).
pub struct MaxPooling2D {
    pool_size: (usize, usize),
    strides: (usize, usize),
    ceil_mode: bool,
    last_input_shape: Option<Vec<usize>>,
}

impl MaxPooling2D {
    /// Creates a new 2D max pooling layer.
    ///
    /// If `strides` is None, it defaults to `pool_size`.
    ///
    /// # Parameters
    ///
    /// - `pool_size` - Size of the pooling window as (height, width)
    /// - `strides` - Optional strides of the pooling operation as (vertical stride, horizontal stride)
    /// - `ceil_mode` - Round the pooled size up instead of down
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `pool_size` has a zero dimension or any stride is zero
    pub fn new(
        pool_size: (usize, usize),
        strides: Option<(usize, usize)>,
        ceil_mode: bool,
    ) -> Result<Self, ModelError> {
        let strides = strides.unwrap_or(pool_size);

        validate_pool_size_2d(pool_size)?;
        validate_strides_2d(strides)?;

        Ok(MaxPooling2D {
            pool_size,
            strides,
            ceil_mode,
            last_input_shape: None,
        })
    }

    /// Performs max pooling operation.
    fn max_pool(&self, input: &Tensor) -> Tensor {
        let input_shape = input.shape();
        let batch_size = input_shape[0];
        let channels = input_shape[1];
        let output_shape = calculate_output_shape_2d_pooling(
            input_shape,
            self.pool_size,
            self.strides,
            self.ceil_mode,
        );

        let mut output = ArrayD::zeros(IxDyn(&output_shape));

        // Max pooling over a single (batch, channel) plane
        let compute_pooling = |b: usize, c: usize| {
            let mut plane = Vec::with_capacity(output_shape[2] * output_shape[3]);

            for out_i in 0..output_shape[2] {
                let i_start = out_i * self.strides.0;
                let i_end = (i_start + self.pool_size.0).min(input_shape[2]);

                for out_j in 0..output_shape[3] {
                    let j_start = out_j * self.strides.1;
                    let j_end = (j_start + self.pool_size.1).min(input_shape[3]);

                    let mut max_val = f32::NEG_INFINITY;
                    for i_pos in i_start..i_end {
                        for j_pos in j_start..j_end {
                            let val = input[[b, c, i_pos, j_pos]];
                            if val > max_val {
                                max_val = val;
                            }
                        }
                    }

                    plane.push(max_val);
                }
            }

            ((b, c), plane)
        };

        let results: Vec<((usize, usize), Vec<f32>)> = execute_parallel_or_sequential!(
            batch_size,
            channels,
            MAX_POOLING_2D_PARALLEL_THRESHOLD,
            compute_pooling
        );

        for ((b, c), plane) in results {
            for (idx, val) in plane.into_iter().enumerate() {
                output[[b, c, idx / output_shape[3], idx % output_shape[3]]] = val;
            }
        }

        output
    }
}

impl Layer for MaxPooling2D {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        validate_pooling_input_2d(
            input,
            self.pool_size,
            self.strides,
            self.ceil_mode,
            "MaxPooling2D",
        )?;

        self.last_input_shape = Some(input.shape().to_vec());

        Ok(self.max_pool(input))
    }

    fn layer_type(&self) -> &str {
        "MaxPooling2D"
    }

    layer_functions_2d_pooling!();
}
