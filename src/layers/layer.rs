use serde::{Serialize, Deserialize};

use crate::layers::unit::{StepToken, Unit};
use crate::math::numeric::lenient_number;

/// An ordered group of units sharing a layer index.  Layer 0 is the input
/// layer: its units only hold the external input values as outputs.
///
/// `bias` and `activation` are nominal values.  Setting them broadcasts to
/// every unit; reading them does not reflect later per-unit edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub layer_index: usize,
    #[serde(alias = "_bias", default, deserialize_with = "lenient_number")]
    bias: f64,
    #[serde(rename = "fn", alias = "_fn", default)]
    activation: String,
    pub units: Vec<Unit>,
}

impl Layer {
    pub fn new(layer_index: usize, unit_count: usize, bias: f64) -> Layer {
        let units = (0..unit_count)
            .map(|i| Unit::new(layer_index, i, bias))
            .collect();
        Layer { layer_index, bias, activation: String::new(), units }
    }

    /// Builds layer 0 with one unit per external input, holding it as output.
    pub fn input_layer(inputs: &[f64]) -> Layer {
        let mut layer = Layer::new(0, inputs.len(), 0.0);
        for (unit, value) in layer.units.iter_mut().zip(inputs.iter()) {
            unit.output = Some(*value);
        }
        layer
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
        for unit in &mut self.units {
            unit.bias = bias;
        }
    }

    pub fn activation(&self) -> &str {
        &self.activation
    }

    pub fn set_activation(&mut self, name: &str) {
        self.activation = name.to_owned();
        for unit in &mut self.units {
            unit.activation = name.to_owned();
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Collected unit outputs, in unit order.  A cleared output reads as 0.
    pub fn outputs(&self) -> Vec<f64> {
        self.units.iter().map(|u| u.output.unwrap_or(0.0)).collect()
    }

    pub fn clear_outputs(&mut self) {
        for unit in &mut self.units {
            unit.output = None;
        }
    }

    /// Lazily computes each unit in index order, one token per unit.
    pub fn compute_steps(&mut self) -> impl Iterator<Item = StepToken> + '_ {
        self.units.iter_mut().map(Unit::compute_step)
    }

    /// Lazily runs each unit's backward step in index order.
    ///
    /// Unit `j` receives `next_sigmas[j]` and `next_weights[j]`: the sigma of
    /// every downstream unit and the weight each of them places on unit `j`.
    pub fn backward_steps<'a>(
        &'a mut self,
        next_sigmas: &'a [Vec<f64>],
        next_weights: &'a [Vec<f64>],
        learning_rate: f64,
    ) -> impl Iterator<Item = StepToken> + 'a {
        self.units.iter_mut().enumerate().map(move |(j, unit)| {
            unit.backward_step(row(next_sigmas, j), row(next_weights, j), learning_rate)
        })
    }

    /// Single forward step on unit `j`; `None` once past the last unit.
    pub(crate) fn compute_unit(&mut self, j: usize) -> Option<StepToken> {
        self.units.get_mut(j).map(Unit::compute_step)
    }

    /// Single backward step on unit `j`; `None` once past the last unit.
    pub(crate) fn backward_unit(
        &mut self,
        j: usize,
        next_sigmas: &[Vec<f64>],
        next_weights: &[Vec<f64>],
        learning_rate: f64,
    ) -> Option<StepToken> {
        let unit = self.units.get_mut(j)?;
        Some(unit.backward_step(row(next_sigmas, j), row(next_weights, j), learning_rate))
    }

    /// Assigns the same input vector to every unit.
    pub(crate) fn feed(&mut self, inputs: &[f64]) {
        for unit in &mut self.units {
            unit.set_inputs(inputs.to_vec());
        }
    }
}

fn row(matrix: &[Vec<f64>], j: usize) -> &[f64] {
    matrix.get(j).map(Vec::as_slice).unwrap_or(&[])
}
