use crate::error::{IoError, ModelError};
use crate::{Deserialize, Serialize};
use serde_json::from_reader;
use std::path::Path;

/// Default number of classes (PASCAL VOC: 20 objects plus background)
pub const DEFAULT_N_CLASS: usize = 21;

/// Default VGG16 block widths
pub const VGG16_WIDTHS: [usize; 5] = [64, 128, 256, 512, 512];

/// Architecture configuration of an FCN8s network.
///
/// The default is the VGG16-based FCN8s: 3 input channels, 21 classes, block
/// widths `[64, 128, 256, 512, 512]`, 4096-wide fully-convolutional layers and
/// channel dropout of 0.5. Narrower widths give the same topology at a fraction
/// of the cost.
///
/// # Fields
///
/// - `n_class` - Number of output classes
/// - `in_channels` - Number of input image channels
/// - `widths` - Output channels of the five convolution blocks
/// - `fc_width` - Output channels of `fc6` and `fc7`
/// - `dropout_rate` - Channel dropout rate after `fc6` and `fc7`
///
/// # Example
/// ```rust
/// use portraitseg::models::Fcn8sConfig;
///
/// let config = Fcn8sConfig::default()
///     .with_n_class(2)
///     .with_widths([8, 8, 16, 16, 16])
///     .with_fc_width(32);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fcn8sConfig {
    pub n_class: usize,
    pub in_channels: usize,
    pub widths: [usize; 5],
    pub fc_width: usize,
    pub dropout_rate: f32,
}

impl Default for Fcn8sConfig {
    fn default() -> Self {
        Fcn8sConfig {
            n_class: DEFAULT_N_CLASS,
            in_channels: 3,
            widths: VGG16_WIDTHS,
            fc_width: 4096,
            dropout_rate: 0.5,
        }
    }
}

impl Fcn8sConfig {
    /// Sets the number of output classes.
    pub fn with_n_class(mut self, n_class: usize) -> Self {
        self.n_class = n_class;
        self
    }

    /// Sets the number of input channels.
    pub fn with_in_channels(mut self, in_channels: usize) -> Self {
        self.in_channels = in_channels;
        self
    }

    /// Sets the five convolution block widths.
    pub fn with_widths(mut self, widths: [usize; 5]) -> Self {
        self.widths = widths;
        self
    }

    /// Sets the width of `fc6` and `fc7`.
    pub fn with_fc_width(mut self, fc_width: usize) -> Self {
        self.fc_width = fc_width;
        self
    }

    /// Sets the dropout rate after `fc6` and `fc7`.
    pub fn with_dropout_rate(mut self, dropout_rate: f32) -> Self {
        self.dropout_rate = dropout_rate;
        self
    }

    /// Checks that every size is non-zero and the dropout rate lies in \[0, 1).
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - Describing the first invalid field
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_class == 0 {
            return Err(ModelError::InputValidationError(
                "n_class must be greater than 0".to_string(),
            ));
        }
        if self.in_channels == 0 {
            return Err(ModelError::InputValidationError(
                "in_channels must be greater than 0".to_string(),
            ));
        }
        if let Some(block) = self.widths.iter().position(|&w| w == 0) {
            return Err(ModelError::InputValidationError(format!(
                "width of block {} must be greater than 0",
                block + 1
            )));
        }
        if self.fc_width == 0 {
            return Err(ModelError::InputValidationError(
                "fc_width must be greater than 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(ModelError::InputValidationError(format!(
                "dropout_rate must be in [0, 1), got {}",
                self.dropout_rate
            )));
        }
        Ok(())
    }

    /// Reads a configuration from a JSON file. Missing fields take their default value.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - The file cannot be opened
    /// - `IoError::JsonError` - The file is not valid JSON for this structure
    /// - `IoError::Model` - The configuration fails [`Fcn8sConfig::validate`]
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        let config: Fcn8sConfig = from_reader(reader).map_err(IoError::JsonError)?;
        config.validate()?;
        Ok(config)
    }
}
