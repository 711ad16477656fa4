use super::helper_function::{vec2_to_array2, vec4_to_array4};
use super::*;

/// Serializable representation of Conv2D layer weights.
///
/// # Fields
///
/// - `weight` - 4D convolution weight tensor stored as nested vectors
/// - `bias` - 2D bias matrix stored as nested vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableConv2DWeight {
    pub weight: Vec<Vec<Vec<Vec<f32>>>>,
    pub bias: Vec<Vec<f32>>,
}

impl SerializableConv2DWeight {
    /// Rebuilds the weight and bias arrays.
    pub fn to_arrays(&self) -> Result<(Array4<f32>, Array2<f32>), IoError> {
        Ok((vec4_to_array4(&self.weight)?, vec2_to_array2(&self.bias)?))
    }
}

impl<T: ActivationLayer> ApplyWeights<Conv2D<T>> for SerializableConv2DWeight {
    /// Applies the stored weights; the stored kernel must match the layer's
    /// current kernel shape exactly.
    fn apply_to_layer(&self, layer: &mut Conv2D<T>) -> Result<(), IoError> {
        let (weight_array, bias_array) = self.to_arrays()?;
        if weight_array.shape() != layer.get_kernel().shape() {
            return Err(IoError::ModelStructureMismatch(format!(
                "Conv2D kernel shape {:?} does not match stored shape {:?}",
                layer.get_kernel().shape(),
                weight_array.shape()
            )));
        }
        layer
            .set_weights(weight_array, bias_array)
            .map_err(|e| IoError::ModelStructureMismatch(e.to_string()))
    }
}
