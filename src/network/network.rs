use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::layers::{Layer, Unit};
use crate::loss::half_sse::HalfSquaredError;
use crate::math::numeric::{lenient_number, lenient_numbers, to_number};
use crate::train::passes::{BackwardPass, ForwardPass};
use crate::train::process::TrainProcess;
use crate::train::step::Steps;

/// Weight of the synthetic downstream connection each output unit is given
/// during the backward pass.
///
/// It is a derivation artifact, not a real connection: paired with the seed
/// `expected - output`, it makes the shared delta rule produce
/// `sigma = f'(out) · (out - expected)` for output units.
pub const SYNTHETIC_OUTPUT_WEIGHT: f64 = -1.0;

fn default_learning_rate() -> f64 {
    1.0
}

/// A dense feedforward network.  `layers[0]` is the input layer, `layers[1..]`
/// are the computational layers, the last one being the output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(alias = "_inputs", default, deserialize_with = "lenient_numbers")]
    inputs: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub expected_outputs: Vec<f64>,
    #[serde(default = "default_learning_rate", deserialize_with = "lenient_number")]
    pub learning_rate: f64,
    #[serde(rename = "fn", alias = "_fn", default)]
    activation: String,
    #[serde(alias = "_biases", default, deserialize_with = "lenient_numbers")]
    biases: Vec<f64>,
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds a network with one computational layer per entry of
    /// `unit_counts`, then randomises every weight.
    ///
    /// `biases[i]` is the bias of computational layer `i + 1`; a missing entry
    /// reads as 0.  The learning rate starts at 1 and no activation is
    /// assigned (units compute the identity until `set_activation`).
    pub fn new(
        inputs: Vec<f64>,
        expected_outputs: Vec<f64>,
        unit_counts: &[usize],
        biases: Vec<f64>,
    ) -> Network {
        let mut network = Network::unweighted(inputs, expected_outputs, unit_counts, biases);
        network.rand();
        network
    }

    /// Same as `new`, drawing the initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        inputs: Vec<f64>,
        expected_outputs: Vec<f64>,
        unit_counts: &[usize],
        biases: Vec<f64>,
        rng: &mut R,
    ) -> Network {
        let mut network = Network::unweighted(inputs, expected_outputs, unit_counts, biases);
        network.rand_with(rng);
        network
    }

    fn unweighted(
        inputs: Vec<f64>,
        expected_outputs: Vec<f64>,
        unit_counts: &[usize],
        biases: Vec<f64>,
    ) -> Network {
        let inputs: Vec<f64> = inputs.into_iter().map(to_number).collect();
        let mut layers = Vec::with_capacity(unit_counts.len() + 1);
        layers.push(Layer::input_layer(&inputs));
        for (i, &count) in unit_counts.iter().enumerate() {
            let bias = biases.get(i).copied().unwrap_or(0.0);
            layers.push(Layer::new(i + 1, count, bias));
        }
        tracing::info!(
            inputs = inputs.len(),
            layers = ?unit_counts,
            "network created"
        );
        Network {
            inputs,
            expected_outputs,
            learning_rate: default_learning_rate(),
            activation: String::new(),
            biases,
            layers,
        }
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// The stored bias vector.  Not necessarily what the layers currently use:
    /// see `update`.
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> &str {
        &self.activation
    }

    /// Broadcasts an activation name to every layer except the input layer.
    pub fn set_activation(&mut self, name: &str) {
        self.activation = name.to_owned();
        for layer in self.layers.iter_mut().skip(1) {
            layer.set_activation(name);
        }
    }

    pub fn output_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }

    /// Final-layer outputs; a not-yet-computed output reads as 0.
    pub fn outputs(&self) -> Vec<f64> {
        self.output_layer().map(Layer::outputs).unwrap_or_default()
    }

    pub fn unit(&self, layer_index: usize, unit_index: usize) -> Option<&Unit> {
        self.layers.get(layer_index)?.units.get(unit_index)
    }

    pub fn unit_mut(&mut self, layer_index: usize, unit_index: usize) -> Option<&mut Unit> {
        self.layers.get_mut(layer_index)?.units.get_mut(unit_index)
    }

    /// Gives every computational unit fresh weights drawn uniformly from
    /// [0, 1), one per unit of the preceding layer.
    pub fn rand(&mut self) {
        self.rand_with(&mut rand::thread_rng());
    }

    pub fn rand_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in 1..self.layers.len() {
            let fan_in = self.layers[i - 1].len();
            for unit in &mut self.layers[i].units {
                let weights = (0..fan_in).map(|_| rng.gen::<f64>()).collect();
                unit.set_weights(weights);
            }
        }
        tracing::debug!(layers = self.layers.len(), "weights randomised");
    }

    /// Replaces inputs (rebuilding the input layer), targets, learning rate
    /// and the stored bias vector.
    ///
    /// The new biases are *not* pushed onto existing layers.  Callers that
    /// want them applied must call `Layer::set_bias` per layer.
    pub fn update(
        &mut self,
        inputs: Vec<f64>,
        expected_outputs: Vec<f64>,
        learning_rate: f64,
        biases: Vec<f64>,
    ) {
        self.set_inputs(inputs);
        self.expected_outputs = expected_outputs;
        self.learning_rate = learning_rate;
        self.biases = biases;
    }

    fn set_inputs(&mut self, inputs: Vec<f64>) {
        self.inputs = inputs.into_iter().map(to_number).collect();
        let input_layer = Layer::input_layer(&self.inputs);
        match self.layers.first_mut() {
            Some(first) => *first = input_layer,
            None => self.layers.push(input_layer),
        }
    }

    /// Clears the output of every unit outside the input layer.
    pub fn clear_outputs(&mut self) {
        for layer in self.layers.iter_mut().skip(1) {
            layer.clear_outputs();
        }
    }

    /// Replaces computational layer `index` (or appends a new output layer
    /// when `index == layers.len()`) with a fresh, unweighted layer.
    ///
    /// The new units have no weights until `rand` or a manual edit.
    pub fn replace_layer(
        &mut self,
        index: usize,
        unit_count: usize,
        bias: f64,
        activation: &str,
    ) -> Result<()> {
        if index == 0 || index > self.layers.len() {
            return Err(Error::Config(format!(
                "layer index {} out of range 1..={}",
                index,
                self.layers.len()
            )));
        }
        let mut layer = Layer::new(index, unit_count, bias);
        layer.set_activation(activation);
        if index == self.layers.len() {
            self.layers.push(layer);
        } else {
            self.layers[index] = layer;
        }
        Ok(())
    }

    /// `½ Σ (output_k - expected_k)²` over the output layer.
    ///
    /// Only meaningful after a forward pass has produced the outputs.
    pub fn err(&self) -> f64 {
        HalfSquaredError::loss(&self.outputs(), &self.expected_outputs)
    }

    /// A full forward pass as a lazy sequence of per-unit steps.
    pub fn compute(&mut self) -> Steps<'_, ForwardPass> {
        Steps::new(self, ForwardPass::new())
    }

    /// A full backward pass as a lazy sequence of per-unit steps.
    ///
    /// Must follow a forward pass: derivatives are taken from unit outputs.
    pub fn backward(&mut self) -> Steps<'_, BackwardPass> {
        Steps::new(self, BackwardPass::new())
    }

    /// An unbounded sequence alternating a full forward pass and a full
    /// backward pass.  It never ends on its own; the host decides when to stop
    /// pulling.
    pub fn train(&mut self) -> Steps<'_, TrainProcess> {
        Steps::new(self, TrainProcess::new())
    }

    /// Runs a complete forward pass and returns the final outputs.
    pub fn forward(&mut self) -> Vec<f64> {
        self.compute().for_each(drop);
        self.outputs()
    }

    /// Assigns layer `index - 1`'s outputs as the inputs of every unit in
    /// layer `index`.
    pub(crate) fn feed_layer(&mut self, index: usize) {
        if index == 0 || index >= self.layers.len() {
            return;
        }
        let previous = self.layers[index - 1].outputs();
        self.layers[index].feed(&previous);
    }

    /// Builds the `(next_sigmas, next_weights)` matrices for layer `index`,
    /// row `j` belonging to unit `j`.
    ///
    /// The output layer gets one synthetic downstream connection per unit:
    /// sigma `expected_k - output_k` with weight `SYNTHETIC_OUTPUT_WEIGHT`.
    /// Hidden layers read the sigma of every unit in layer `index + 1` and
    /// the weight it places on input `j`.
    pub(crate) fn backward_rows(&self, index: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let current = &self.layers[index];
        match self.layers.get(index + 1) {
            None => {
                let seeds = HalfSquaredError::output_seeds(&current.outputs(), &self.expected_outputs);
                let weights = vec![vec![SYNTHETIC_OUTPUT_WEIGHT]; seeds.len()];
                (seeds.into_iter().map(|s| vec![s]).collect(), weights)
            }
            Some(next) => {
                let next_sigmas: Vec<f64> = next.units.iter()
                    .map(|u| u.sigma.unwrap_or(0.0))
                    .collect();
                let sigmas = vec![next_sigmas; current.len()];
                let weights = (0..current.len())
                    .map(|j| {
                        next.units.iter()
                            .map(|u| u.weights().get(j).copied().unwrap_or(0.0))
                            .collect()
                    })
                    .collect();
                (sigmas, weights)
            }
        }
    }

    /// Fix-ups applied to a network read from a persisted document.
    pub(crate) fn restore(&mut self) {
        for layer in &mut self.layers {
            for unit in &mut layer.units {
                unit.reconcile();
                if unit.layer_index != 0 {
                    unit.output = None;
                }
            }
        }
    }
}
