use super::helper_function::vec4_to_array4;
use super::*;

/// Serializable representation of Conv2DTranspose layer weights.
///
/// # Fields
///
/// - `weight` - 4D kernel \[in_channels, out_channels, kernel_height, kernel_width\] stored as nested vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableConv2DTransposeWeight {
    pub weight: Vec<Vec<Vec<Vec<f32>>>>,
}

impl ApplyWeights<Conv2DTranspose> for SerializableConv2DTransposeWeight {
    fn apply_to_layer(&self, layer: &mut Conv2DTranspose) -> Result<(), IoError> {
        let weight_array = vec4_to_array4(&self.weight)?;
        layer
            .set_weights(weight_array)
            .map_err(|e| IoError::ModelStructureMismatch(e.to_string()))
    }
}
