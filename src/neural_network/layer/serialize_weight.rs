use super::*;
use crate::{Deserialize, Serialize};

/// Serializable weight container for all layer types that carry weights.
///
/// # Variants
///
/// - `Conv2D` - Weights for a Conv2D layer
/// - `Conv2DTranspose` - Weights for a Conv2DTranspose layer
/// - `Empty` - No weights for layers without parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializableLayerWeight {
    Conv2D(SerializableConv2DWeight),
    Conv2DTranspose(SerializableConv2DTransposeWeight),
    Empty,
}

impl SerializableLayerWeight {
    /// Converts a `LayerWeight` reference into an owned serializable weight.
    ///
    /// # Parameters
    ///
    /// - `weight` - Layer weights to convert into a serializable form
    ///
    /// # Returns
    ///
    /// - `SerializableLayerWeight` - Serializable representation of the provided weights
    pub fn from_layer_weight(weight: &LayerWeight) -> Self {
        match weight {
            LayerWeight::Empty => SerializableLayerWeight::Empty,
            LayerWeight::Conv2D(w) => SerializableLayerWeight::Conv2D(SerializableConv2DWeight {
                weight: array4_to_vec4(w.weight),
                bias: w.bias.outer_iter().map(|row| row.to_vec()).collect(),
            }),
            LayerWeight::Conv2DTranspose(w) => {
                SerializableLayerWeight::Conv2DTranspose(SerializableConv2DTransposeWeight {
                    weight: array4_to_vec4(w.weight),
                })
            }
        }
    }

    /// Returns the layer type name these weights belong to.
    pub fn kind(&self) -> &'static str {
        match self {
            SerializableLayerWeight::Conv2D(_) => "Conv2D",
            SerializableLayerWeight::Conv2DTranspose(_) => "Conv2DTranspose",
            SerializableLayerWeight::Empty => "Empty",
        }
    }
}

fn array4_to_vec4(array: &Array4<f32>) -> Vec<Vec<Vec<Vec<f32>>>> {
    array
        .outer_iter()
        .map(|a| {
            a.outer_iter()
                .map(|b| b.outer_iter().map(|c| c.to_vec()).collect())
                .collect()
        })
        .collect()
}

/// Helper functions to rebuild arrays from nested vectors
pub mod helper_function;
/// Serializable Conv2D weights
pub mod serializable_conv_2d_weight;
/// Serializable Conv2DTranspose weights
pub mod serializable_conv_2d_transpose_weight;

pub use serializable_conv_2d_transpose_weight::*;
pub use serializable_conv_2d_weight::*;
