use crate::error::IoError;
use crate::neural_network::layer::SerializableLayerWeight;
use crate::neural_network::neural_network_trait::Layer;
use crate::{Deserialize, Serialize};
use ahash::AHashMap;
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Weights of one named layer inside a checkpoint.
///
/// # Fields
///
/// - `name` - Layer name, e.g. `conv1_1` or `upscore8`
/// - `weights` - Owned, serializable copy of the layer's weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLayerWeight {
    pub name: String,
    pub weights: SerializableLayerWeight,
}

/// A named collection of layer weights, persisted as pretty-printed JSON.
///
/// Only layers that own weights are recorded; activations, pooling and dropout
/// layers have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub layers: Vec<NamedLayerWeight>,
}

impl Checkpoint {
    /// Snapshots the weights of `layers`, skipping layers without weights.
    pub fn from_layers<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a dyn Layer)>,
    {
        let layers = layers
            .into_iter()
            .filter_map(|(name, layer)| {
                match SerializableLayerWeight::from_layer_weight(&layer.get_weights()) {
                    SerializableLayerWeight::Empty => None,
                    weights => Some(NamedLayerWeight {
                        name: name.to_string(),
                        weights,
                    }),
                }
            })
            .collect();
        Checkpoint { layers }
    }

    /// Builds a name -> weights index.
    ///
    /// # Errors
    ///
    /// - `IoError::ModelStructureMismatch` - If a layer name appears twice
    pub fn index(&self) -> Result<AHashMap<&str, &SerializableLayerWeight>, IoError> {
        let mut index = AHashMap::with_capacity(self.layers.len());
        for entry in &self.layers {
            if index.insert(entry.name.as_str(), &entry.weights).is_some() {
                return Err(IoError::ModelStructureMismatch(format!(
                    "Checkpoint contains layer '{}' more than once",
                    entry.name
                )));
            }
        }
        Ok(index)
    }

    /// Returns the weights recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&SerializableLayerWeight> {
        self.layers
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.weights)
    }

    /// Writes the checkpoint as JSON to `path`, creating or overwriting the file.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - File creation or write operation failed
    /// - `IoError::JsonError` - Serialization to JSON failed
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);

        to_writer_pretty(&mut writer, self).map_err(IoError::JsonError)?;
        writer.flush().map_err(IoError::StdIoError)?;

        debug!(path = %path.display(), layers = self.layers.len(), "checkpoint saved");
        Ok(())
    }

    /// Reads a checkpoint from `path`.
    ///
    /// # Errors
    ///
    /// - `IoError::StdIoError` - File not found or read operation failed
    /// - `IoError::JsonError` - The file is not a valid checkpoint
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path = path.as_ref();
        let reader = IoError::load_in_buf_reader(path)?;
        let checkpoint: Checkpoint = from_reader(reader).map_err(IoError::JsonError)?;

        debug!(path = %path.display(), layers = checkpoint.layers.len(), "checkpoint loaded");
        Ok(checkpoint)
    }
}
