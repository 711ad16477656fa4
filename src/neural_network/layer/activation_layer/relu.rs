use super::*;

/// ReLU (Rectified Linear Unit) activation layer.
///
/// Applies `max(0, x)` element-wise to the input tensor, keeping the original shape.
/// In FCN8s every VGG convolution and both fully-convolutional layers (`fc6`, `fc7`)
/// are followed by a ReLU.
///
/// # Examples
///
/// ```rust
/// use portraitseg::prelude::*;
/// use ndarray::Array2;
///
/// let x = Array2::from_shape_vec((2, 3), vec![-1.0, 2.0, -3.0, 4.0, -5.0, 6.0])
///     .unwrap()
///     .into_dyn();
///
/// let mut relu = ReLU::new();
/// let output = relu.forward(&x).unwrap();
/// assert_eq!(output.as_slice().unwrap(), &[0.0, 2.0, 0.0, 4.0, 0.0, 6.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReLU {
    last_shape: Option<Vec<usize>>,
}

impl ReLU {
    /// Creates a new ReLU activation layer.
    pub fn new() -> Self {
        ReLU { last_shape: None }
    }
}

impl Layer for ReLU {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        if input.is_empty() {
            return Err(ModelError::InputValidationError(
                "Input tensor is empty".to_string(),
            ));
        }

        if input.iter().any(|&x| x.is_nan()) {
            return Err(ModelError::InputValidationError(
                "Input tensor contains NaN values".to_string(),
            ));
        }

        self.last_shape = Some(input.shape().to_vec());

        let mut output = input.clone();
        if input.len() >= ACTIVATION_PARALLEL_THRESHOLD {
            output.par_mapv_inplace(|x| x.max(0.0));
        } else {
            output.mapv_inplace(|x| x.max(0.0));
        }

        Ok(output)
    }

    fn layer_type(&self) -> &str {
        "ReLU"
    }

    fn output_shape(&self) -> String {
        format_output_shape(&self.last_shape)
    }

    no_trainable_parameters_layer_functions!();
}

impl ActivationLayer for ReLU {}
