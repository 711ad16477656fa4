use super::config::Fcn8sConfig;
use crate::error::{IoError, ModelError};
use crate::neural_network::layer::*;
use crate::neural_network::state_dict::Checkpoint;
use crate::neural_network::{ApplyWeights, Layer, Tensor};
use ahash::AHashMap;
use ndarray::{Array2, Array4, Ix4, s};
use std::path::Path;
use tracing::debug;

/// Zero padding around the input of `conv1_1`. The large margin lets any input
/// size survive the five poolings and the 7x7 `fc6`; the crops below undo it.
pub const FIRST_LAYER_PADDING: usize = 100;

/// Offset at which `score_pool4` is cropped to the size of `upscore2`
pub const SCORE_POOL4_OFFSET: usize = 5;
/// Offset at which `score_pool3` is cropped to the size of `upscore_pool4`
pub const SCORE_POOL3_OFFSET: usize = 9;
/// Offset at which the `upscore8` output is cropped to the input size
pub const OUTPUT_OFFSET: usize = 31;

/// Names of all layers that carry weights, in forward order.
pub const WEIGHTED_LAYER_NAMES: [&str; 21] = [
    "conv1_1",
    "conv1_2",
    "conv2_1",
    "conv2_2",
    "conv3_1",
    "conv3_2",
    "conv3_3",
    "conv4_1",
    "conv4_2",
    "conv4_3",
    "conv5_1",
    "conv5_2",
    "conv5_3",
    "fc6",
    "fc7",
    "score_fr",
    "upscore2",
    "score_pool4",
    "upscore_pool4",
    "score_pool3",
    "upscore8",
];

/// Intermediate activations of a probed forward pass, tagged by name
pub type Activations = Vec<(&'static str, Tensor)>;

/// FCN8s: a VGG16 trunk turned fully convolutional, with skip connections from
/// `pool4` and `pool3` fused into an 8x upsampled class-score map.
///
/// Input: `[batch, in_channels, height, width]`. Output: `[batch, n_class, height, width]`.
///
/// Weights: the VGG trunk and `fc6`/`fc7` start from Xavier-uniform draws, the three
/// scoring convolutions start at zero, and the three transposed convolutions start as
/// bilinear upsamplers. The network is created in inference mode (dropout disabled).
///
/// The trunk is randomly initialized rather than zeroed, so an unloaded network
/// still produces non-trivial features. Load a checkpoint to get pretrained behavior.
///
/// # Example
/// ```rust
/// use portraitseg::models::{Fcn8s, Fcn8sConfig};
/// use ndarray::Array4;
///
/// let config = Fcn8sConfig::default()
///     .with_n_class(2)
///     .with_widths([2, 2, 2, 2, 2])
///     .with_fc_width(4);
/// let mut model = Fcn8s::new(config).unwrap();
///
/// let x = Array4::<f32>::ones((1, 3, 8, 8)).into_dyn();
/// let scores = model.forward(&x).unwrap();
/// assert_eq!(scores.shape(), &[1, 2, 8, 8]);
/// ```
pub struct Fcn8s {
    config: Fcn8sConfig,

    conv1_1: Conv2D<ReLU>,
    conv1_2: Conv2D<ReLU>,
    pool1: MaxPooling2D,

    conv2_1: Conv2D<ReLU>,
    conv2_2: Conv2D<ReLU>,
    pool2: MaxPooling2D,

    conv3_1: Conv2D<ReLU>,
    conv3_2: Conv2D<ReLU>,
    conv3_3: Conv2D<ReLU>,
    pool3: MaxPooling2D,

    conv4_1: Conv2D<ReLU>,
    conv4_2: Conv2D<ReLU>,
    conv4_3: Conv2D<ReLU>,
    pool4: MaxPooling2D,

    conv5_1: Conv2D<ReLU>,
    conv5_2: Conv2D<ReLU>,
    conv5_3: Conv2D<ReLU>,
    pool5: MaxPooling2D,

    fc6: Conv2D<ReLU>,
    drop6: SpatialDropout2D,
    fc7: Conv2D<ReLU>,
    drop7: SpatialDropout2D,

    score_fr: Conv2D<Linear>,
    score_pool3: Conv2D<Linear>,
    score_pool4: Conv2D<Linear>,

    upscore2: Conv2DTranspose,
    upscore8: Conv2DTranspose,
    upscore_pool4: Conv2DTranspose,
}

fn conv3x3(filters: usize, in_channels: usize, padding: usize) -> Result<Conv2D<ReLU>, ModelError> {
    Conv2D::new(
        filters,
        (3, 3),
        in_channels,
        (1, 1),
        PaddingType::Explicit(padding, padding),
        ReLU::new(),
    )
}

fn pool() -> Result<MaxPooling2D, ModelError> {
    MaxPooling2D::new((2, 2), Some((2, 2)), true)
}

fn score(n_class: usize, in_channels: usize) -> Result<Conv2D<Linear>, ModelError> {
    let mut layer = Conv2D::new(
        n_class,
        (1, 1),
        in_channels,
        (1, 1),
        PaddingType::Valid,
        Linear::new(),
    )?;
    layer.set_weights(
        Array4::zeros((n_class, in_channels, 1, 1)),
        Array2::zeros((1, n_class)),
    )?;
    Ok(layer)
}

/// Crops `[.., .., offset..offset + height, offset..offset + width]`.
fn crop(
    tensor: &Tensor,
    offset: usize,
    height: usize,
    width: usize,
    name: &str,
) -> Result<Tensor, ModelError> {
    let shape = tensor.shape();
    if shape[2] < offset + height || shape[3] < offset + width {
        return Err(ModelError::ProcessingError(format!(
            "cannot crop {} of shape {:?} to {}x{} at offset {}",
            name, shape, height, width, offset
        )));
    }
    let view = tensor
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|e| ModelError::ProcessingError(e.to_string()))?;
    Ok(view
        .slice(s![.., .., offset..offset + height, offset..offset + width])
        .to_owned()
        .into_dyn())
}

fn apply_conv<T: ActivationLayer>(
    index: &AHashMap<&str, &SerializableLayerWeight>,
    name: &str,
    layer: &mut Conv2D<T>,
) -> Result<(), IoError> {
    match index.get(name) {
        Some(SerializableLayerWeight::Conv2D(weights)) => weights
            .apply_to_layer(layer)
            .map_err(|e| IoError::ModelStructureMismatch(format!("{}: {}", name, e))),
        Some(other) => Err(IoError::ModelStructureMismatch(format!(
            "{}: expected Conv2D weights, found {}",
            name,
            other.kind()
        ))),
        None => Err(IoError::ModelStructureMismatch(format!(
            "checkpoint has no weights for layer '{}'",
            name
        ))),
    }
}

fn apply_transpose(
    index: &AHashMap<&str, &SerializableLayerWeight>,
    name: &str,
    layer: &mut Conv2DTranspose,
) -> Result<(), IoError> {
    match index.get(name) {
        Some(SerializableLayerWeight::Conv2DTranspose(weights)) => weights
            .apply_to_layer(layer)
            .map_err(|e| IoError::ModelStructureMismatch(format!("{}: {}", name, e))),
        Some(other) => Err(IoError::ModelStructureMismatch(format!(
            "{}: expected Conv2DTranspose weights, found {}",
            name,
            other.kind()
        ))),
        None => Err(IoError::ModelStructureMismatch(format!(
            "checkpoint has no weights for layer '{}'",
            name
        ))),
    }
}

fn record(probe: &mut Option<&mut Activations>, name: &'static str, tensor: &Tensor) {
    if let Some(activations) = probe.as_deref_mut() {
        activations.push((name, tensor.clone()));
    }
}

impl Fcn8s {
    /// Builds an FCN8s network.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `config` fails [`Fcn8sConfig::validate`]
    pub fn new(config: Fcn8sConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let [w1, w2, w3, w4, w5] = config.widths;
        let n_class = config.n_class;
        let fc_width = config.fc_width;

        let mut model = Fcn8s {
            conv1_1: conv3x3(w1, config.in_channels, FIRST_LAYER_PADDING)?,
            conv1_2: conv3x3(w1, w1, 1)?,
            pool1: pool()?,

            conv2_1: conv3x3(w2, w1, 1)?,
            conv2_2: conv3x3(w2, w2, 1)?,
            pool2: pool()?,

            conv3_1: conv3x3(w3, w2, 1)?,
            conv3_2: conv3x3(w3, w3, 1)?,
            conv3_3: conv3x3(w3, w3, 1)?,
            pool3: pool()?,

            conv4_1: conv3x3(w4, w3, 1)?,
            conv4_2: conv3x3(w4, w4, 1)?,
            conv4_3: conv3x3(w4, w4, 1)?,
            pool4: pool()?,

            conv5_1: conv3x3(w5, w4, 1)?,
            conv5_2: conv3x3(w5, w5, 1)?,
            conv5_3: conv3x3(w5, w5, 1)?,
            pool5: pool()?,

            fc6: Conv2D::new(fc_width, (7, 7), w5, (1, 1), PaddingType::Valid, ReLU::new())?,
            drop6: SpatialDropout2D::new(config.dropout_rate)?,
            fc7: Conv2D::new(
                fc_width,
                (1, 1),
                fc_width,
                (1, 1),
                PaddingType::Valid,
                ReLU::new(),
            )?,
            drop7: SpatialDropout2D::new(config.dropout_rate)?,

            score_fr: score(n_class, fc_width)?,
            score_pool3: score(n_class, w3)?,
            score_pool4: score(n_class, w4)?,

            upscore2: Conv2DTranspose::new(n_class, n_class, (4, 4), (2, 2))?,
            upscore8: Conv2DTranspose::new(n_class, n_class, (16, 16), (8, 8))?,
            upscore_pool4: Conv2DTranspose::new(n_class, n_class, (4, 4), (2, 2))?,

            config,
        };
        model.set_training(false);

        debug!(
            n_class = model.config.n_class,
            in_channels = model.config.in_channels,
            params = model.param_count(),
            "built FCN8s"
        );
        Ok(model)
    }

    /// Returns the architecture configuration.
    pub fn get_config(&self) -> &Fcn8sConfig {
        &self.config
    }

    /// Returns the first convolution (`conv1_1`).
    pub fn get_conv1_1(&self) -> &Conv2D<ReLU> {
        &self.conv1_1
    }

    /// Replaces the weights of `conv1_1`. The number of input channels of the
    /// network follows the new kernel.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the filter count, kernel size or bias shape differ
    pub fn set_conv1_1_weights(
        &mut self,
        weights: Array4<f32>,
        bias: Array2<f32>,
    ) -> Result<(), ModelError> {
        self.conv1_1.set_weights(weights, bias)?;
        self.config.in_channels = self.conv1_1.get_in_channels();
        Ok(())
    }

    /// Switches the dropout layers between training and inference behaviour.
    pub fn set_training(&mut self, is_training: bool) {
        for (_, layer) in self.named_layers_mut() {
            layer.set_training_if_mode_dependent(is_training);
        }
    }

    /// Computes class scores `[batch, n_class, height, width]` for `x`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `x` is not 4D or has the wrong number of channels
    /// - `ModelError::ProcessingError` - If an intermediate map is too small to crop
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.run(x, None)
    }

    /// Runs the forward pass and returns the intermediate activations, in order:
    /// `pool3`, `pool4`, `fr`, `score_fr`, `upscore2`, `score_pool4`, `score_pool3`, `output`.
    ///
    /// # Errors
    ///
    /// Same as [`Fcn8s::forward`].
    pub fn forward_with_activations(&mut self, x: &Tensor) -> Result<Activations, ModelError> {
        let mut activations = Vec::with_capacity(8);
        self.run(x, Some(&mut activations))?;
        Ok(activations)
    }

    fn run(&mut self, x: &Tensor, mut probe: Option<&mut Activations>) -> Result<Tensor, ModelError> {
        if x.ndim() != 4 {
            return Err(ModelError::InputValidationError(format!(
                "FCN8s expects a 4D input [batch, channels, height, width], got {}D",
                x.ndim()
            )));
        }
        let (height, width) = (x.shape()[2], x.shape()[3]);

        let mut h = self.conv1_1.forward(x)?;
        h = self.conv1_2.forward(&h)?;
        h = self.pool1.forward(&h)?;

        h = self.conv2_1.forward(&h)?;
        h = self.conv2_2.forward(&h)?;
        h = self.pool2.forward(&h)?;

        h = self.conv3_1.forward(&h)?;
        h = self.conv3_2.forward(&h)?;
        h = self.conv3_3.forward(&h)?;
        let pool3 = self.pool3.forward(&h)?; // 1/8
        record(&mut probe, "pool3", &pool3);

        h = self.conv4_1.forward(&pool3)?;
        h = self.conv4_2.forward(&h)?;
        h = self.conv4_3.forward(&h)?;
        let pool4 = self.pool4.forward(&h)?; // 1/16
        record(&mut probe, "pool4", &pool4);

        h = self.conv5_1.forward(&pool4)?;
        h = self.conv5_2.forward(&h)?;
        h = self.conv5_3.forward(&h)?;
        h = self.pool5.forward(&h)?;

        h = self.fc6.forward(&h)?;
        h = self.drop6.forward(&h)?;
        h = self.fc7.forward(&h)?;
        h = self.drop7.forward(&h)?;
        record(&mut probe, "fr", &h);

        h = self.score_fr.forward(&h)?; // 1/32
        record(&mut probe, "score_fr", &h);
        let upscore2 = self.upscore2.forward(&h)?; // 1/16
        record(&mut probe, "upscore2", &upscore2);

        let score_pool4 = self.score_pool4.forward(&pool4)?;
        record(&mut probe, "score_pool4", &score_pool4);
        let score_pool4c = crop(
            &score_pool4,
            SCORE_POOL4_OFFSET,
            upscore2.shape()[2],
            upscore2.shape()[3],
            "score_pool4",
        )?;
        let upscore_pool4 = self.upscore_pool4.forward(&(&upscore2 + &score_pool4c))?; // 1/8

        let score_pool3 = self.score_pool3.forward(&pool3)?;
        record(&mut probe, "score_pool3", &score_pool3);
        let score_pool3c = crop(
            &score_pool3,
            SCORE_POOL3_OFFSET,
            upscore_pool4.shape()[2],
            upscore_pool4.shape()[3],
            "score_pool3",
        )?;

        h = self.upscore8.forward(&(&upscore_pool4 + &score_pool3c))?;
        let output = crop(&h, OUTPUT_OFFSET, height, width, "upscore8")?;
        record(&mut probe, "output", &output);

        Ok(output)
    }

    /// Returns every layer with its name, in forward order.
    pub fn named_layers(&self) -> Vec<(&'static str, &dyn Layer)> {
        vec![
            ("conv1_1", &self.conv1_1 as &dyn Layer),
            ("conv1_2", &self.conv1_2),
            ("pool1", &self.pool1),
            ("conv2_1", &self.conv2_1),
            ("conv2_2", &self.conv2_2),
            ("pool2", &self.pool2),
            ("conv3_1", &self.conv3_1),
            ("conv3_2", &self.conv3_2),
            ("conv3_3", &self.conv3_3),
            ("pool3", &self.pool3),
            ("conv4_1", &self.conv4_1),
            ("conv4_2", &self.conv4_2),
            ("conv4_3", &self.conv4_3),
            ("pool4", &self.pool4),
            ("conv5_1", &self.conv5_1),
            ("conv5_2", &self.conv5_2),
            ("conv5_3", &self.conv5_3),
            ("pool5", &self.pool5),
            ("fc6", &self.fc6),
            ("drop6", &self.drop6),
            ("fc7", &self.fc7),
            ("drop7", &self.drop7),
            ("score_fr", &self.score_fr),
            ("upscore2", &self.upscore2),
            ("score_pool4", &self.score_pool4),
            ("upscore_pool4", &self.upscore_pool4),
            ("score_pool3", &self.score_pool3),
            ("upscore8", &self.upscore8),
        ]
    }

    fn named_layers_mut(&mut self) -> Vec<(&'static str, &mut dyn Layer)> {
        vec![
            ("conv1_1", &mut self.conv1_1 as &mut dyn Layer),
            ("conv1_2", &mut self.conv1_2),
            ("pool1", &mut self.pool1),
            ("conv2_1", &mut self.conv2_1),
            ("conv2_2", &mut self.conv2_2),
            ("pool2", &mut self.pool2),
            ("conv3_1", &mut self.conv3_1),
            ("conv3_2", &mut self.conv3_2),
            ("conv3_3", &mut self.conv3_3),
            ("pool3", &mut self.pool3),
            ("conv4_1", &mut self.conv4_1),
            ("conv4_2", &mut self.conv4_2),
            ("conv4_3", &mut self.conv4_3),
            ("pool4", &mut self.pool4),
            ("conv5_1", &mut self.conv5_1),
            ("conv5_2", &mut self.conv5_2),
            ("conv5_3", &mut self.conv5_3),
            ("pool5", &mut self.pool5),
            ("fc6", &mut self.fc6),
            ("drop6", &mut self.drop6),
            ("fc7", &mut self.fc7),
            ("drop7", &mut self.drop7),
            ("score_fr", &mut self.score_fr),
            ("upscore2", &mut self.upscore2),
            ("score_pool4", &mut self.score_pool4),
            ("upscore_pool4", &mut self.upscore_pool4),
            ("score_pool3", &mut self.score_pool3),
            ("upscore8", &mut self.upscore8),
        ]
    }

    /// Returns references to the weights of every layer, in forward order.
    pub fn get_weights(&self) -> Vec<(&'static str, LayerWeight<'_>)> {
        self.named_layers()
            .into_iter()
            .map(|(name, layer)| (name, layer.get_weights()))
            .collect()
    }

    /// Total number of trainable parameters.
    pub fn param_count(&self) -> usize {
        self.named_layers()
            .iter()
            .map(|(_, layer)| layer.param_count().count())
            .sum()
    }

    /// Snapshots all weights into a checkpoint.
    pub fn to_checkpoint(&self) -> Checkpoint {
        Checkpoint::from_layers(self.named_layers())
    }

    /// Copies weights from `checkpoint` into the network.
    ///
    /// Loading is strict: every weighted layer must have an entry of the right kind
    /// and shape, and the checkpoint may not name layers the network lacks. Keys are
    /// checked before any weight is written.
    ///
    /// # Errors
    ///
    /// - `IoError::ModelStructureMismatch` - On a missing, unexpected, duplicated or
    ///   mismatched entry
    pub fn load_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), IoError> {
        let index = checkpoint.index()?;

        if let Some(unexpected) = index
            .keys()
            .find(|name| !WEIGHTED_LAYER_NAMES.contains(*name))
        {
            return Err(IoError::ModelStructureMismatch(format!(
                "checkpoint contains unexpected layer '{}'",
                unexpected
            )));
        }
        if let Some(missing) = WEIGHTED_LAYER_NAMES
            .iter()
            .find(|name| !index.contains_key(**name))
        {
            return Err(IoError::ModelStructureMismatch(format!(
                "checkpoint has no weights for layer '{}'",
                missing
            )));
        }

        apply_conv(&index, "conv1_1", &mut self.conv1_1)?;
        apply_conv(&index, "conv1_2", &mut self.conv1_2)?;
        apply_conv(&index, "conv2_1", &mut self.conv2_1)?;
        apply_conv(&index, "conv2_2", &mut self.conv2_2)?;
        apply_conv(&index, "conv3_1", &mut self.conv3_1)?;
        apply_conv(&index, "conv3_2", &mut self.conv3_2)?;
        apply_conv(&index, "conv3_3", &mut self.conv3_3)?;
        apply_conv(&index, "conv4_1", &mut self.conv4_1)?;
        apply_conv(&index, "conv4_2", &mut self.conv4_2)?;
        apply_conv(&index, "conv4_3", &mut self.conv4_3)?;
        apply_conv(&index, "conv5_1", &mut self.conv5_1)?;
        apply_conv(&index, "conv5_2", &mut self.conv5_2)?;
        apply_conv(&index, "conv5_3", &mut self.conv5_3)?;
        apply_conv(&index, "fc6", &mut self.fc6)?;
        apply_conv(&index, "fc7", &mut self.fc7)?;
        apply_conv(&index, "score_fr", &mut self.score_fr)?;
        apply_conv(&index, "score_pool3", &mut self.score_pool3)?;
        apply_conv(&index, "score_pool4", &mut self.score_pool4)?;
        apply_transpose(&index, "upscore2", &mut self.upscore2)?;
        apply_transpose(&index, "upscore8", &mut self.upscore8)?;
        apply_transpose(&index, "upscore_pool4", &mut self.upscore_pool4)?;

        Ok(())
    }

    /// Saves all weights as a JSON checkpoint at `path`.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - File creation or write operation failed
    /// - `IoError::JsonError` - Serialization to JSON failed
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        self.to_checkpoint().save_to_path(path)
    }

    /// Loads all weights from the JSON checkpoint at `path`.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - File not found or read operation failed
    /// - `IoError::JsonError` - Deserialization from JSON failed
    /// - `IoError::ModelStructureMismatch` - The checkpoint does not fit this network
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), IoError> {
        let checkpoint = Checkpoint::load_from_path(path)?;
        self.load_checkpoint(&checkpoint)
    }

    /// Prints a table of the layers, their output shapes and parameter counts.
    ///
    /// Output shapes are known once the network has run a forward pass.
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"fcn8s\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        let mut total_params: usize = 0;
        for (name, layer) in self.named_layers() {
            let count = layer.param_count().count();
            total_params += count;
            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", name, layer.layer_type()),
                layer.output_shape(),
                count
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        // f32 parameters, 4 bytes each
        println!(" Total params: {} ({} B)", total_params, total_params * 4);
    }
}
