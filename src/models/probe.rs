use super::config::Fcn8sConfig;
use super::fcn8s::{Activations, Fcn8s};
use crate::error::ModelError;
use crate::neural_network::Tensor;

/// An FCN8s whose forward pass returns its intermediate activations instead of
/// only the class scores.
///
/// The activations come back in forward order, tagged `pool3`, `pool4`, `fr`,
/// `score_fr`, `upscore2`, `score_pool4`, `score_pool3` and `output`. Useful to
/// inspect what each stage of a trained network responds to.
///
/// # Example
/// ```rust
/// use portraitseg::models::{Fcn8sConfig, Fcn8sProbe};
/// use ndarray::Array4;
///
/// let config = Fcn8sConfig::default()
///     .with_n_class(3)
///     .with_widths([2, 2, 2, 2, 2])
///     .with_fc_width(4);
/// let mut probe = Fcn8sProbe::with_config(config).unwrap();
///
/// let x = Array4::<f32>::ones((1, 3, 8, 8)).into_dyn();
/// let activations = probe.forward(&x).unwrap();
/// let (name, output) = activations.last().unwrap();
/// assert_eq!(*name, "output");
/// assert_eq!(output.shape(), &[1, 3, 8, 8]);
/// ```
pub struct Fcn8sProbe {
    fcn: Fcn8s,
}

impl Fcn8sProbe {
    /// Builds the VGG16-sized network with `n_class` output classes.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `n_class` is zero
    pub fn new(n_class: usize) -> Result<Self, ModelError> {
        Self::with_config(Fcn8sConfig::default().with_n_class(n_class))
    }

    /// Builds the network from `config`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `config` is invalid
    pub fn with_config(config: Fcn8sConfig) -> Result<Self, ModelError> {
        Ok(Fcn8sProbe {
            fcn: Fcn8s::new(config)?,
        })
    }

    /// Runs the network on `x` and returns the tagged intermediate activations.
    ///
    /// # Errors
    ///
    /// See [`Fcn8s::forward`].
    pub fn forward(&mut self, x: &Tensor) -> Result<Activations, ModelError> {
        self.fcn.forward_with_activations(x)
    }

    /// Returns the underlying FCN8s.
    pub fn fcn(&self) -> &Fcn8s {
        &self.fcn
    }

    /// Returns the underlying FCN8s mutably, e.g. to load a checkpoint.
    pub fn fcn_mut(&mut self) -> &mut Fcn8s {
        &mut self.fcn
    }
}
