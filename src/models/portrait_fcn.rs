use super::config::Fcn8sConfig;
use super::fcn8s::Fcn8s;
use crate::error::{IoError, ModelError};
use crate::neural_network::Tensor;
use crate::neural_network::initializer::splice_input_channels;
use crate::neural_network::state_dict::Checkpoint;
use rand::Rng;
use std::path::Path;
use tracing::info;

/// Checkpoint loaded by [`PortraitFcnPlus::new`] when `load_weights` is set
pub const DEFAULT_CHECKPOINT_PATH: &str = "portraitseg/portraitfcn_untrained.json";

/// Number of classes of the portrait networks (background, person)
pub const PORTRAIT_N_CLASS: usize = 2;

/// Input channels of the pretrained first layer
pub const PRETRAINED_IN_CHANNELS: usize = 3;

/// Input channels of PortraitFCN+: the RGB image plus three extra channels
pub const PORTRAIT_FCN_PLUS_IN_CHANNELS: usize = 6;

const FIRST_KERNEL_SIZE: (usize, usize) = (3, 3);

fn portrait_config() -> Fcn8sConfig {
    Fcn8sConfig::default().with_n_class(PORTRAIT_N_CLASS)
}

/// PortraitFCN: an FCN8s with two output classes.
///
/// # Example
/// ```rust
/// use portraitseg::models::{Fcn8sConfig, PortraitFcn};
/// use ndarray::Array4;
///
/// let config = Fcn8sConfig::default()
///     .with_widths([2, 2, 2, 2, 2])
///     .with_fc_width(4);
/// let mut model = PortraitFcn::with_config(config).unwrap();
///
/// let x = Array4::<f32>::zeros((1, 3, 8, 8)).into_dyn();
/// assert_eq!(model.forward(&x).unwrap().shape(), &[1, 2, 8, 8]);
/// ```
pub struct PortraitFcn {
    fcn: Fcn8s,
}

impl PortraitFcn {
    /// Builds the VGG16-sized network.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - Never for the default configuration
    pub fn new() -> Result<Self, ModelError> {
        Self::with_config(Fcn8sConfig::default())
    }

    /// Builds the network from `config`; `n_class` is always set to 2.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `config` is invalid
    pub fn with_config(config: Fcn8sConfig) -> Result<Self, ModelError> {
        let fcn = Fcn8s::new(config.with_n_class(PORTRAIT_N_CLASS))?;
        Ok(PortraitFcn { fcn })
    }

    /// Computes `[batch, 2, height, width]` class scores.
    ///
    /// # Errors
    ///
    /// See [`Fcn8s::forward`].
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.fcn.forward(x)
    }

    /// Returns the underlying FCN8s.
    pub fn fcn(&self) -> &Fcn8s {
        &self.fcn
    }

    /// Returns the underlying FCN8s mutably, e.g. to load a checkpoint.
    pub fn fcn_mut(&mut self) -> &mut Fcn8s {
        &mut self.fcn
    }

    /// Unwraps the underlying FCN8s.
    pub fn into_inner(self) -> Fcn8s {
        self.fcn
    }
}

/// PortraitFCN+: a PortraitFCN whose first convolution takes six input channels.
///
/// The network is first built with a three-channel `conv1_1` and optionally loaded
/// from a checkpoint. The `conv1_1` kernel is then widened to six input channels:
/// the three pretrained planes of every filter are kept and three new planes are
/// drawn from a fan-out Kaiming normal (see
/// [`splice_input_channels`](crate::neural_network::initializer::splice_input_channels)).
/// The `conv1_1` bias is kept.
///
/// # Example
/// ```rust
/// use portraitseg::models::{Fcn8sConfig, PortraitFcnPlus};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let config = Fcn8sConfig::default()
///     .with_widths([2, 2, 2, 2, 2])
///     .with_fc_width(4);
/// let mut rng = StdRng::seed_from_u64(42);
/// let model = PortraitFcnPlus::from_checkpoint(config, None::<&str>, &mut rng).unwrap();
/// assert_eq!(model.fcn().get_conv1_1().get_kernel().shape(), &[2, 6, 3, 3]);
/// ```
pub struct PortraitFcnPlus {
    fcn: Fcn8s,
}

impl PortraitFcnPlus {
    /// Builds the VGG16-sized network, loading [`DEFAULT_CHECKPOINT_PATH`] first when
    /// `load_weights` is `true`. New kernel planes come from the thread-local RNG.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - The checkpoint is missing or unreadable
    /// - `IoError::JsonError` - The checkpoint is not valid JSON
    /// - `IoError::ModelStructureMismatch` - The checkpoint does not fit the network
    pub fn new(load_weights: bool) -> Result<Self, IoError> {
        let path = load_weights.then_some(DEFAULT_CHECKPOINT_PATH);
        Self::from_checkpoint(portrait_config(), path, &mut rand::rng())
    }

    /// Builds the network from `config` (with `n_class` forced to 2), loads `path`
    /// if given and splices `conv1_1` to six input channels using `rng`.
    ///
    /// `config.in_channels` describes the checkpoint and must be 3.
    ///
    /// # Errors
    ///
    /// - `IoError::Model` - If `config` is invalid or does not describe a 3-channel network
    /// - `IoError::StdIoError` - The checkpoint is missing or unreadable
    /// - `IoError::JsonError` - The checkpoint is not valid JSON
    /// - `IoError::ModelStructureMismatch` - The checkpoint does not fit the network, or
    ///   `conv1_1` is not `(widths[0], 3, 3, 3)`
    pub fn from_checkpoint<P, R>(
        config: Fcn8sConfig,
        path: Option<P>,
        rng: &mut R,
    ) -> Result<Self, IoError>
    where
        P: AsRef<Path>,
        R: Rng + ?Sized,
    {
        if config.in_channels != PRETRAINED_IN_CHANNELS {
            return Err(IoError::Model(ModelError::InputValidationError(format!(
                "PortraitFCN+ is built from a {}-channel network, got in_channels = {}",
                PRETRAINED_IN_CHANNELS, config.in_channels
            ))));
        }
        // Read the checkpoint before allocating the network
        let checkpoint = match path {
            Some(path) => Some((
                path.as_ref().display().to_string(),
                Checkpoint::load_from_path(path)?,
            )),
            None => None,
        };

        let mut fcn = Fcn8s::new(config.with_n_class(PORTRAIT_N_CLASS))?;
        if let Some((path, checkpoint)) = checkpoint {
            fcn.load_checkpoint(&checkpoint)?;
            info!(path = %path, "loaded pretrained weights");
        }

        let first = fcn.get_conv1_1();
        let expected = (
            fcn.get_config().widths[0],
            PRETRAINED_IN_CHANNELS,
            FIRST_KERNEL_SIZE.0,
            FIRST_KERNEL_SIZE.1,
        );
        if first.get_kernel().dim() != expected {
            return Err(IoError::ModelStructureMismatch(format!(
                "conv1_1 must have shape {:?} before splicing, got {:?}",
                expected,
                first.get_kernel().dim()
            )));
        }

        let spliced = splice_input_channels(
            first.get_kernel(),
            PORTRAIT_FCN_PLUS_IN_CHANNELS - PRETRAINED_IN_CHANNELS,
            rng,
        )?;
        let bias = first.get_bias().clone();
        fcn.set_conv1_1_weights(spliced, bias)
            .map_err(|e| IoError::ModelStructureMismatch(e.to_string()))?;

        info!(
            in_channels = PORTRAIT_FCN_PLUS_IN_CHANNELS,
            filters = expected.0,
            "spliced conv1_1"
        );
        Ok(PortraitFcnPlus { fcn })
    }

    /// Computes `[batch, 2, height, width]` class scores for a six-channel input.
    ///
    /// # Errors
    ///
    /// See [`Fcn8s::forward`].
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.fcn.forward(x)
    }

    /// Returns the underlying FCN8s.
    pub fn fcn(&self) -> &Fcn8s {
        &self.fcn
    }

    /// Returns the underlying FCN8s mutably.
    pub fn fcn_mut(&mut self) -> &mut Fcn8s {
        &mut self.fcn
    }

    /// Unwraps the underlying FCN8s.
    pub fn into_inner(self) -> Fcn8s {
        self.fcn
    }
}

