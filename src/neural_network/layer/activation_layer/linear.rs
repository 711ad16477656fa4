use super::*;

/// Linear (identity) activation layer.
///
/// Passes its input through unchanged. Used for the FCN8s scoring convolutions,
/// which produce raw class scores.
#[derive(Debug, Clone, Default)]
pub struct Linear {
    last_shape: Option<Vec<usize>>,
}

impl Linear {
    /// Creates a new Linear activation layer.
    pub fn new() -> Self {
        Linear { last_shape: None }
    }
}

impl Layer for Linear {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        self.last_shape = Some(input.shape().to_vec());
        Ok(input.clone())
    }

    fn layer_type(&self) -> &str {
        "Linear"
    }

    fn output_shape(&self) -> String {
        format_output_shape(&self.last_shape)
    }

    no_trainable_parameters_layer_functions!();
}

impl ActivationLayer for Linear {}
