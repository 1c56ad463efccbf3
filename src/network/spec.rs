use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::numeric::{parse_counts, parse_values};
use crate::network::network::Network;

fn default_learning_rate() -> f64 {
    1.0
}

fn default_activation() -> String {
    "sigmoid".to_owned()
}

/// Construction parameters for a `Network`.
///
/// Fields:
/// - `inputs`           : external input vector; its length is the input
///                        layer's unit count
/// - `expected_outputs` : targets, one per output unit
/// - `unit_counts`      : unit count of every computational layer, the last
///                        entry being the output layer
/// - `biases`           : one bias per computational layer
/// - `learning_rate`    : gradient-descent step size (default 1.0)
/// - `fn`               : activation name for every computational layer
///                        (default `"sigmoid"`)
///
/// A spec can be saved to / loaded from JSON independently of any trained
/// weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub inputs: Vec<f64>,
    pub expected_outputs: Vec<f64>,
    pub unit_counts: Vec<usize>,
    #[serde(default)]
    pub biases: Vec<f64>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(rename = "fn", default = "default_activation")]
    pub activation: String,
}

impl NetworkSpec {
    /// Builds a spec from the comma-separated text fields a form would
    /// submit.  Unparseable entries become 0.
    pub fn from_fields(
        inputs: &str,
        expected_outputs: &str,
        unit_counts: &str,
        biases: &str,
        learning_rate: f64,
        activation: &str,
    ) -> NetworkSpec {
        NetworkSpec {
            inputs: parse_values(inputs),
            expected_outputs: parse_values(expected_outputs),
            unit_counts: parse_counts(unit_counts),
            biases: parse_values(biases),
            learning_rate,
            activation: activation.to_owned(),
        }
    }

    /// Checks the spec describes a network that can be trained.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::Config("inputs must not be empty".into()));
        }
        let output_units = match self.unit_counts.last() {
            Some(&n) => n,
            None => return Err(Error::Config("at least one computational layer is required".into())),
        };
        if let Some(i) = self.unit_counts.iter().position(|&n| n == 0) {
            return Err(Error::Config(format!("layer {} has no units", i + 1)));
        }
        if self.expected_outputs.len() != output_units {
            return Err(Error::Config(format!(
                "expected {} target values for the output layer, got {}",
                output_units,
                self.expected_outputs.len()
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::Config("learning rate must be a positive number".into()));
        }
        Ok(())
    }

    pub fn build(&self) -> Network {
        let mut network = Network::new(
            self.inputs.clone(),
            self.expected_outputs.clone(),
            &self.unit_counts,
            self.biases.clone(),
        );
        self.configure(&mut network);
        network
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Network {
        let mut network = Network::with_rng(
            self.inputs.clone(),
            self.expected_outputs.clone(),
            &self.unit_counts,
            self.biases.clone(),
            rng,
        );
        self.configure(&mut network);
        network
    }

    fn configure(&self, network: &mut Network) {
        network.learning_rate = self.learning_rate;
        network.set_activation(&self.activation);
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> NetworkSpec {
        NetworkSpec::from_fields("0.05,0.1", "0.01,0.99", "2,2", "0.35,0.6", 0.5, "sigmoid")
    }

    #[test]
    fn from_fields_parses_lists() {
        let s = spec();
        assert_eq!(s.inputs, vec![0.05, 0.1]);
        assert_eq!(s.unit_counts, vec![2, 2]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn build_applies_rate_and_activation() {
        let net = spec().build();
        assert_eq!(net.learning_rate, 0.5);
        assert_eq!(net.layers[2].activation(), "sigmoid");
        assert_eq!(net.layers[2].units[1].activation, "sigmoid");
    }

    #[test]
    fn validate_rejects_bad_topologies() {
        let mut s = spec();
        s.expected_outputs.push(1.0);
        assert!(s.validate().is_err());

        let mut s = spec();
        s.unit_counts = vec![0, 2];
        assert!(s.validate().is_err());

        let mut s = spec();
        s.unit_counts.clear();
        assert!(s.validate().is_err());

        let mut s = spec();
        s.learning_rate = 0.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let s: NetworkSpec = serde_json::from_str(
            r#"{"inputs":[1.0],"expected_outputs":[0.0],"unit_counts":[1]}"#,
        ).unwrap();
        assert_eq!(s.learning_rate, 1.0);
        assert_eq!(s.activation, "sigmoid");
        assert!(s.biases.is_empty());
    }
}
