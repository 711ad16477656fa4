use super::*;

/// Threshold for using parallel computation when applying the channel mask.
const SPATIAL_DROPOUT_2D_PARALLEL_THRESHOLD: usize = 64;

/// Spatial Dropout layer for 2D data, which randomly sets entire feature maps to 0
/// during training.
///
/// Unlike element-wise dropout, whole channels are dropped, which suits convolutional
/// feature maps where neighbouring pixels are strongly correlated. FCN8s applies it
/// after `fc6` and `fc7`.
///
/// Input shape: (batch_size, channels, height, width)
///
/// # Fields
///
/// - `rate` - Fraction of the channels to drop (between 0 and 1).
/// - `training` - Whether the layer is in training mode or inference mode.
/// - `last_input_shape` - Shape of the most recent input.
///
/// # Example
/// ```rust
/// use portraitseg::prelude::*;
/// use ndarray::Array4;
///
/// let mut dropout = SpatialDropout2D::new(0.5).unwrap();
/// let input = Array4::ones((2, 8, 4, 4)).into_dyn();
///
/// // Inference mode leaves the input untouched
/// dropout.set_training(false);
/// assert_eq!(dropout.forward(&input).unwrap(), input);
/// ```
pub struct SpatialDropout2D {
    rate: f32,
    training: bool,
    last_input_shape: Option<Vec<usize>>,
}

impl SpatialDropout2D {
    /// Creates a new SpatialDropout2D layer in training mode.
    ///
    /// # Parameters
    ///
    /// - `rate` - Fraction of the channels to drop. Must be between 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InputValidationError` if rate is not between 0 and 1.
    pub fn new(rate: f32) -> Result<Self, ModelError> {
        validate_rate(rate, "Dropout rate")?;

        Ok(SpatialDropout2D {
            rate,
            training: true,
            last_input_shape: None,
        })
    }

    /// Returns the dropout rate.
    pub fn get_rate(&self) -> f32 {
        self.rate
    }

    /// Returns whether the layer is in training mode.
    pub fn is_training(&self) -> bool {
        self.training
    }

    mode_dependent_layer_set_training!();
}

impl Layer for SpatialDropout2D {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        if input.ndim() != 4 {
            return Err(ModelError::InputValidationError(format!(
                "SpatialDropout2D expects a 4D input (batch_size, channels, height, width), got {}D",
                input.ndim()
            )));
        }

        self.last_input_shape = Some(input.shape().to_vec());

        if !self.training || self.rate == 0.0 {
            return Ok(input.clone());
        }

        if self.rate == 1.0 {
            return Ok(Tensor::zeros(input.raw_dim()));
        }

        let shape = input.shape();
        let batch_size = shape[0];
        let channels = shape[1];

        // One keep/drop decision per (batch, channel), already scaled by 1 / (1 - rate)
        let scale = 1.0 / (1.0 - self.rate);
        let rate = self.rate;
        let mask = Array2::<f32>::random((batch_size, channels), Uniform::new(0.0, 1.0))
            .mapv(|x| if x < rate { 0.0 } else { scale });

        let mut output = input.clone();
        let apply_mask = |mut plane: ndarray::ArrayViewMutD<f32>, factor: f32| {
            plane.mapv_inplace(|x| x * factor);
        };

        for (b, mut batch) in output.axis_iter_mut(Axis(0)).enumerate() {
            if batch_size * channels >= SPATIAL_DROPOUT_2D_PARALLEL_THRESHOLD {
                batch
                    .axis_iter_mut(Axis(0))
                    .into_par_iter()
                    .enumerate()
                    .for_each(|(c, plane)| apply_mask(plane, mask[[b, c]]));
            } else {
                for (c, plane) in batch.axis_iter_mut(Axis(0)).enumerate() {
                    apply_mask(plane, mask[[b, c]]);
                }
            }
        }

        Ok(output)
    }

    fn layer_type(&self) -> &str {
        "SpatialDropout2D"
    }

    fn output_shape(&self) -> String {
        match &self.last_input_shape {
            Some(shape) => format_shape(shape),
            None => "Unknown".to_string(),
        }
    }

    no_trainable_parameters_layer_functions!();

    mode_dependent_layer_trait!();
}
