use super::input_validation_function::*;
use super::*;
use crate::neural_network::initializer::get_upsampling_weight;

/// Threshold for deciding when to use parallel computation in Conv2DTranspose operations.
const CONV_2D_TRANSPOSE_PARALLEL_THRESHOLD: usize = 10000;

/// A bias-free 2D transposed convolution ("deconvolution") layer.
///
/// Every input position scatters `input[b, c, i, j] * weight[c, o, ..]` into the output
/// window starting at `(i * stride_h, j * stride_w)`. Without padding the output size is
/// `(height - 1) * stride_h + kernel_h` by `(width - 1) * stride_w + kernel_w`.
///
/// The layer is initialized with a bilinear kernel, so before any training it
/// performs bilinear upsampling by the stride factor. FCN8s uses three of these:
/// two 2x upsamplings (kernel 4, stride 2) and one 8x upsampling (kernel 16, stride 8).
///
/// # Fields
///
/// - `in_channels` - Number of input channels.
/// - `out_channels` - Number of output channels.
/// - `kernel_size` - Size of the kernel as (height, width).
/// - `strides` - Upsampling strides as (vertical, horizontal).
/// - `weights` - 4D kernel with shape \[in_channels, out_channels, kernel_height, kernel_width\].
///
/// # Example
/// ```rust
/// use portraitseg::prelude::*;
/// use ndarray::Array4;
///
/// let x = Array4::ones((1, 2, 4, 4)).into_dyn();
/// let mut up = Conv2DTranspose::new(2, 2, (4, 4), (2, 2)).unwrap();
/// let y = up.forward(&x).unwrap();
/// assert_eq!(y.shape(), &[1, 2, 10, 10]);
/// ```
pub struct Conv2DTranspose {
    in_channels: usize,
    out_channels: usize,
    kernel_size: (usize, usize),
    strides: (usize, usize),
    weights: Array4<f32>,
    last_input_shape: Option<Vec<usize>>,
}

impl Conv2DTranspose {
    /// Creates a new transposed convolution initialized with a bilinear kernel.
    ///
    /// # Parameters
    ///
    /// - `in_channels` - Number of input channels.
    /// - `out_channels` - Number of output channels.
    /// - `kernel_size` - Size of the kernel as (height, width). The bilinear kernel
    ///   needs a square kernel; for non-square kernels the weights start at zero.
    /// - `strides` - Upsampling strides as (vertical, horizontal).
    ///
    /// # Returns
    ///
    /// - `Ok(Conv2DTranspose)` - The new layer
    /// - `Err(ModelError::InputValidationError)` - If any size parameter is zero
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
    ) -> Result<Self, ModelError> {
        validate_channels(in_channels, "Number of input channels")?;
        validate_channels(out_channels, "Number of output channels")?;
        validate_kernel_size_2d(kernel_size)?;
        validate_strides_2d(strides)?;

        let weights = if kernel_size.0 == kernel_size.1 {
            get_upsampling_weight(in_channels, out_channels, kernel_size.0)
        } else {
            Array4::zeros((in_channels, out_channels, kernel_size.0, kernel_size.1))
        };

        Ok(Conv2DTranspose {
            in_channels,
            out_channels,
            kernel_size,
            strides,
            weights,
            last_input_shape: None,
        })
    }

    /// Returns a reference to the kernel \[in_channels, out_channels, kernel_height, kernel_width\].
    pub fn get_kernel(&self) -> &Array4<f32> {
        &self.weights
    }

    /// Returns the upsampling strides.
    pub fn get_strides(&self) -> (usize, usize) {
        self.strides
    }

    /// Replaces the kernel.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `weights` does not have shape
    ///   \[in_channels, out_channels, kernel_height, kernel_width\]
    pub fn set_weights(&mut self, weights: Array4<f32>) -> Result<(), ModelError> {
        let expected = (
            self.in_channels,
            self.out_channels,
            self.kernel_size.0,
            self.kernel_size.1,
        );
        if weights.dim() != expected {
            return Err(ModelError::InputValidationError(format!(
                "Conv2DTranspose weights must have shape {:?}, got {:?}",
                expected,
                weights.shape()
            )));
        }
        self.weights = weights;
        Ok(())
    }

    fn calculate_output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        vec![
            input_shape[0],
            self.out_channels,
            transposed_length(input_shape[2], self.kernel_size.0, self.strides.0),
            transposed_length(input_shape[3], self.kernel_size.1, self.strides.1),
        ]
    }

    /// Scatters one batch element into its output block.
    fn compute_batch_transpose(
        &self,
        b: usize,
        input: &ndarray::ArrayView4<f32>,
        output_shape: &[usize],
    ) -> (usize, Array3<f32>) {
        let (_, _, in_height, in_width) = input.dim();
        let mut batch_output = Array3::zeros((self.out_channels, output_shape[2], output_shape[3]));

        for c in 0..self.in_channels {
            for i in 0..in_height {
                let i_base = i * self.strides.0;
                for j in 0..in_width {
                    let value = input[[b, c, i, j]];
                    if value == 0.0 {
                        continue;
                    }
                    let j_base = j * self.strides.1;

                    for o in 0..self.out_channels {
                        for ki in 0..self.kernel_size.0 {
                            for kj in 0..self.kernel_size.1 {
                                batch_output[[o, i_base + ki, j_base + kj]] +=
                                    value * self.weights[[c, o, ki, kj]];
                            }
                        }
                    }
                }
            }
        }

        (b, batch_output)
    }
}

impl Layer for Conv2DTranspose {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        validate_input_4d(input, self.in_channels, "Conv2DTranspose")?;

        let input_4d = input
            .view()
            .into_dimensionality::<ndarray::Ix4>()
            .map_err(|e| ModelError::ProcessingError(e.to_string()))?;
        let batch_size = input_4d.shape()[0];
        let output_shape = self.calculate_output_shape(input.shape());
        self.last_input_shape = Some(input.shape().to_vec());

        let workload_size = batch_size * self.out_channels * output_shape[2] * output_shape[3];

        let results: Vec<_> = if workload_size >= CONV_2D_TRANSPOSE_PARALLEL_THRESHOLD {
            (0..batch_size)
                .into_par_iter()
                .map(|b| self.compute_batch_transpose(b, &input_4d, &output_shape))
                .collect()
        } else {
            (0..batch_size)
                .map(|b| self.compute_batch_transpose(b, &input_4d, &output_shape))
                .collect()
        };

        Ok(merge_results(output_shape, results))
    }

    fn layer_type(&self) -> &str {
        "Conv2DTranspose"
    }

    fn output_shape(&self) -> String {
        match &self.last_input_shape {
            Some(shape) => format_shape(&self.calculate_output_shape(shape)),
            None => format!("(None, {}, None, None)", self.out_channels),
        }
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::Trainable(self.weights.len())
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Conv2DTranspose(Conv2DTransposeLayerWeight {
            weight: &self.weights,
        })
    }
}
