use super::input_validation_function::*;
use super::*;

/// Threshold for deciding when to use parallel computation in Conv2D operations.
/// If batch_size * filters * output_area < threshold, use sequential processing.
/// Otherwise, use parallel processing with Rayon.
const CONV_2D_PARALLEL_THRESHOLD: usize = 10000;

/// A 2D convolutional layer.
///
/// # Fields
///
/// - `filters` - Number of convolution filters (output channels).
/// - `kernel_size` - Size of the convolution kernel as (height, width).
/// - `strides` - Stride values for the convolution operation as (vertical, horizontal).
/// - `padding` - Type of padding to apply (`Valid`, `Same` or `Explicit`).
/// - `weights` - 4D array of filter weights with shape \[filters, channels, kernel_height, kernel_width\].
/// - `bias` - 2D array of bias values with shape \[1, filters\].
/// - `activation` - Activation layer applied to the convolution output
/// - `last_input_shape` - Shape of the most recent input, used to report the output shape.
///
/// # Shape Information
///
/// Input shape: \[batch_size, channels, height, width\]
/// Output shape: \[batch_size, filters, output_height, output_width\]
///
/// # Example
/// ```rust
/// use portraitseg::prelude::*;
/// use ndarray::Array4;
///
/// // Batch size=2, 1 input channel, 5x5 pixels
/// let x = Array4::ones((2, 1, 5, 5)).into_dyn();
///
/// let mut conv = Conv2D::new(
///     3,                  // Number of filters
///     (3, 3),             // Kernel size
///     1,                  // Input channels
///     (1, 1),             // Stride
///     PaddingType::Valid, // No padding
///     ReLU::new(),        // ReLU activation layer
/// )
/// .unwrap();
///
/// let output = conv.forward(&x).unwrap();
/// assert_eq!(output.shape(), &[2, 3, 3, 3]);
/// ```
pub struct Conv2D<T: ActivationLayer> {
    filters: usize,
    kernel_size: (usize, usize),
    strides: (usize, usize),
    padding: PaddingType,
    weights: Array4<f32>,
    bias: Array2<f32>,
    activation: T,
    last_input_shape: Option<Vec<usize>>,
}

impl<T: ActivationLayer> Conv2D<T> {
    /// Creates a new 2D convolutional layer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `filters` - Number of convolution filters (output channels).
    /// - `kernel_size` - Size of the convolution kernel as (height, width).
    /// - `in_channels` - Number of input channels.
    /// - `strides` - Stride values for the convolution operation as (vertical, horizontal).
    /// - `padding` - Type of padding to apply.
    /// - `activation` - Activation layer applied after the convolution.
    ///
    /// # Returns
    ///
    /// - `Ok(Conv2D)` - A new layer with Xavier (Glorot) uniform weights and zero biases.
    /// - `Err(ModelError::InputValidationError)` - If any size parameter is zero.
    pub fn new(
        filters: usize,
        kernel_size: (usize, usize),
        in_channels: usize,
        strides: (usize, usize),
        padding: PaddingType,
        activation: T,
    ) -> Result<Self, ModelError> {
        validate_filters(filters)?;
        validate_kernel_size_2d(kernel_size)?;
        validate_strides_2d(strides)?;
        validate_channels(in_channels, "Number of input channels")?;

        // Formula: sqrt(6 / (input_channels * kernel_area + filters * kernel_area))
        let fan_in = in_channels * kernel_size.0 * kernel_size.1;
        let fan_out = filters * kernel_size.0 * kernel_size.1;
        let weight_bound = (6.0 / (fan_in + fan_out) as f32).sqrt();

        let weights = Array4::random(
            (filters, in_channels, kernel_size.0, kernel_size.1),
            Uniform::new(-weight_bound, weight_bound),
        );

        let bias = Array2::zeros((1, filters));

        Ok(Conv2D {
            filters,
            kernel_size,
            strides,
            padding,
            weights,
            bias,
            activation,
            last_input_shape: None,
        })
    }

    /// Returns the number of filters (output channels).
    pub fn get_filters(&self) -> usize {
        self.filters
    }

    /// Returns the number of input channels, taken from the current weights.
    pub fn get_in_channels(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Returns the kernel size as (height, width).
    pub fn get_kernel_size(&self) -> (usize, usize) {
        self.kernel_size
    }

    /// Returns the padding applied before convolving.
    pub fn get_padding(&self) -> PaddingType {
        self.padding
    }

    /// Returns a reference to the weight tensor \[filters, channels, kernel_height, kernel_width\].
    pub fn get_kernel(&self) -> &Array4<f32> {
        &self.weights
    }

    /// Returns a reference to the bias \[1, filters\].
    pub fn get_bias(&self) -> &Array2<f32> {
        &self.bias
    }

    /// Sets the weights and bias for this layer.
    ///
    /// The number of input channels follows `weights`, so this is also how a
    /// layer is widened to accept more input channels.
    ///
    /// # Parameters
    ///
    /// - `weights` - 4D array of filter weights with shape \[filters, channels, kernel_height, kernel_width\]
    /// - `bias` - 2D array of bias values with shape \[1, filters\]
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the filter count or kernel size differs
    ///   from the layer's, the bias shape is not \[1, filters\], or `weights` has no channels
    pub fn set_weights(&mut self, weights: Array4<f32>, bias: Array2<f32>) -> Result<(), ModelError> {
        let (filters, channels, kh, kw) = weights.dim();
        if filters != self.filters || (kh, kw) != self.kernel_size {
            return Err(ModelError::InputValidationError(format!(
                "Conv2D weights must have shape [{}, _, {}, {}], got {:?}",
                self.filters,
                self.kernel_size.0,
                self.kernel_size.1,
                weights.shape()
            )));
        }
        validate_channels(channels, "Number of input channels")?;
        if bias.dim() != (1, self.filters) {
            return Err(ModelError::InputValidationError(format!(
                "Conv2D bias must have shape [1, {}], got {:?}",
                self.filters,
                bias.shape()
            )));
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    /// Calculates the output shape of the convolutional layer based on input dimensions.
    fn calculate_output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        let batch_size = input_shape[0];
        let (top, bottom, left, right) = self.padding.resolve(
            input_shape[2],
            input_shape[3],
            self.kernel_size,
            self.strides,
        );
        let padded_height = input_shape[2] + top + bottom;
        let padded_width = input_shape[3] + left + right;

        let output_height = (padded_height - self.kernel_size.0) / self.strides.0 + 1;
        let output_width = (padded_width - self.kernel_size.1) / self.strides.1 + 1;

        vec![batch_size, self.filters, output_height, output_width]
    }

    /// Applies zero padding to the input tensor.
    fn apply_padding(&self, input: &Tensor) -> Result<Array4<f32>, ModelError> {
        let input_4d = input
            .view()
            .into_dimensionality::<ndarray::Ix4>()
            .map_err(|e| ModelError::ProcessingError(e.to_string()))?;
        let (batch_size, channels, input_height, input_width) = input_4d.dim();
        let (top, bottom, left, right) =
            self.padding
                .resolve(input_height, input_width, self.kernel_size, self.strides);

        if top + bottom + left + right == 0 {
            return Ok(input_4d.to_owned());
        }

        let mut padded = Array4::zeros((
            batch_size,
            channels,
            input_height + top + bottom,
            input_width + left + right,
        ));
        padded
            .slice_mut(s![.., .., top..top + input_height, left..left + input_width])
            .assign(&input_4d);

        Ok(padded)
    }

    /// Computes convolution for a single batch.
    fn compute_batch_convolution(
        &self,
        b: usize,
        padded_input: &Array4<f32>,
        output_shape: &[usize],
    ) -> (usize, Array3<f32>) {
        let in_channels = self.weights.shape()[1];
        let mut batch_output = Array3::zeros((self.filters, output_shape[2], output_shape[3]));

        for f in 0..self.filters {
            let bias = self.bias[[0, f]];
            for i in 0..output_shape[2] {
                let i_base = i * self.strides.0;

                for j in 0..output_shape[3] {
                    let j_base = j * self.strides.1;
                    let mut sum = bias;

                    for c in 0..in_channels {
                        for ki in 0..self.kernel_size.0 {
                            let i_pos = i_base + ki;

                            for kj in 0..self.kernel_size.1 {
                                sum += padded_input[[b, c, i_pos, j_base + kj]]
                                    * self.weights[[f, c, ki, kj]];
                            }
                        }
                    }

                    batch_output[[f, i, j]] = sum;
                }
            }
        }

        (b, batch_output)
    }

    /// Performs the convolution operation on the input tensor.
    ///
    /// Batches are processed in parallel when the workload reaches
    /// `CONV_2D_PARALLEL_THRESHOLD`.
    fn convolve(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let padded_input = self.apply_padding(input)?;
        let batch_size = padded_input.shape()[0];
        let output_shape = self.calculate_output_shape(input.shape());

        let workload_size = batch_size * self.filters * output_shape[2] * output_shape[3];

        let results: Vec<_> = if workload_size >= CONV_2D_PARALLEL_THRESHOLD {
            (0..batch_size)
                .into_par_iter()
                .map(|b| self.compute_batch_convolution(b, &padded_input, &output_shape))
                .collect()
        } else {
            (0..batch_size)
                .map(|b| self.compute_batch_convolution(b, &padded_input, &output_shape))
                .collect()
        };

        Ok(merge_results(output_shape, results))
    }
}

impl<T: ActivationLayer> Layer for Conv2D<T> {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        validate_input_4d(input, self.weights.shape()[1], "Conv2D")?;

        let (top, bottom, left, right) = self.padding.resolve(
            input.shape()[2],
            input.shape()[3],
            self.kernel_size,
            self.strides,
        );
        if input.shape()[2] + top + bottom < self.kernel_size.0
            || input.shape()[3] + left + right < self.kernel_size.1
        {
            return Err(ModelError::InputValidationError(format!(
                "Conv2D input {:?} is smaller than the {}x{} kernel after padding",
                input.shape(),
                self.kernel_size.0,
                self.kernel_size.1
            )));
        }

        self.last_input_shape = Some(input.shape().to_vec());

        let output = self.convolve(input)?;
        self.activation.forward(&output)
    }

    fn layer_type(&self) -> &str {
        "Conv2D"
    }

    fn output_shape(&self) -> String {
        match &self.last_input_shape {
            Some(shape) => format_shape(&self.calculate_output_shape(shape)),
            None => format!("(None, {}, None, None)", self.filters),
        }
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::Trainable(self.weights.len() + self.bias.len())
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Conv2D(Conv2DLayerWeight {
            weight: &self.weights,
            bias: &self.bias,
        })
    }
}
