/// Container for borrowed layer weights
///
/// # Variants
///
/// - `Conv2D` - Contains weights for 2D convolutional layers
/// - `Conv2DTranspose` - Contains weights for 2D transposed convolutional layers
/// - `Empty` - Represents a layer with no trainable parameters
pub enum LayerWeight<'a> {
    Conv2D(Conv2DLayerWeight<'a>),
    Conv2DTranspose(Conv2DTransposeLayerWeight<'a>),
    Empty,
}

/// Weights for a 2D convolutional layer
///
/// # Fields
///
/// - `weight` - 4D convolution kernel with shape (output_channels, input_channels, kernel_height, kernel_width)
/// - `bias` - Bias vector with shape (1, output_channels)
pub struct Conv2DLayerWeight<'a> {
    pub weight: &'a ndarray::Array4<f32>,
    pub bias: &'a ndarray::Array2<f32>,
}

/// Weights for a bias-free 2D transposed convolutional layer
///
/// # Fields
///
/// - `weight` - 4D kernel with shape (input_channels, output_channels, kernel_height, kernel_width)
pub struct Conv2DTransposeLayerWeight<'a> {
    pub weight: &'a ndarray::Array4<f32>,
}
