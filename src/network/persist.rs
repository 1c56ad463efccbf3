use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::Result;
use crate::network::network::Network;

/// Persisted document support.
///
/// The document is the serde form of `Network`: top-level `inputs`,
/// `expected_outputs`, `learning_rate`, `fn`, `biases` and `layers`; each
/// layer carries `layer_index`, `bias`, `fn` and `units`; each unit carries its
/// indices, `bias`, `inputs`, `weights`, `fn`, `output`, `net` and `sigma`.
///
/// Loading keeps the input layer's outputs verbatim and clears every other
/// output, so the next forward pass recomputes them instead of trusting stale
/// values.  The underscored names written by older exports (`_inputs`,
/// `_biases`, `_fn`, `_bias`) are accepted as aliases.
impl Network {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Network> {
        let mut network: Network = serde_json::from_str(s)?;
        network.restore();
        Ok(network)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        tracing::info!(path = %path.as_ref().display(), "network saved");
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut network: Network = serde_json::from_reader(reader)?;
        network.restore();
        tracing::info!(
            path = %path.as_ref().display(),
            layers = network.layers.len(),
            "network loaded"
        );
        Ok(network)
    }
}
