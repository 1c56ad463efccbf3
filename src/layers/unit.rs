use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::math::numeric::{lenient_number, lenient_numbers, to_number};
use crate::optim::sgd::Sgd;

/// Identifies the unit touched by one step of a pass.
///
/// Hosts use it purely for observation (e.g. highlighting the neuron that was
/// just evaluated or updated); it carries no numeric payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepToken {
    pub layer_index: usize,
    pub unit_index: usize,
}

/// A single neuron.
///
/// `inputs` and `weights` always have the same length.  Both are normalised
/// (NaN → 0) when they are assigned, and a length mismatch is reconciled at
/// assignment time: see `set_inputs` and `set_weights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub layer_index: usize,
    pub unit_index: usize,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bias: f64,
    #[serde(default, deserialize_with = "lenient_numbers")]
    inputs: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    weights: Vec<f64>,
    /// Weighted input sum plus bias; unused for input-layer units.
    #[serde(default)]
    pub net: Option<f64>,
    /// `None` until computed, and again after `clear_outputs`.
    #[serde(default)]
    pub output: Option<f64>,
    /// Activation name, resolved through `ActivationFunction::from_name`.
    #[serde(rename = "fn", default)]
    pub activation: String,
    /// ∂E/∂net; `None` until this unit has taken a backward step.
    #[serde(default)]
    pub sigma: Option<f64>,
}

impl Unit {
    pub fn new(layer_index: usize, unit_index: usize, bias: f64) -> Unit {
        Unit {
            layer_index,
            unit_index,
            bias,
            inputs: Vec::new(),
            weights: Vec::new(),
            net: None,
            output: None,
            activation: String::new(),
            sigma: None,
        }
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Replaces the inputs.  Extra inputs meet new 0 weights (unconnected,
    /// frozen).  Surplus weights are kept and meet 0 inputs, so they neither
    /// contribute to `net` nor move under training until a longer input
    /// vector reaches them again.
    pub fn set_inputs(&mut self, inputs: Vec<f64>) {
        self.inputs = inputs.into_iter().map(to_number).collect();
        if self.inputs.len() < self.weights.len() {
            self.inputs.resize(self.weights.len(), 0.0);
        } else {
            self.weights.resize(self.inputs.len(), 0.0);
        }
    }

    /// Replaces the weights.  Inputs are padded with 0 or truncated to match;
    /// they are reassigned by the next forward pass anyway.
    pub fn set_weights(&mut self, weights: Vec<f64>) {
        self.weights = weights.into_iter().map(to_number).collect();
        self.inputs.resize(self.weights.len(), 0.0);
    }

    pub fn activation_fn(&self) -> ActivationFunction {
        ActivationFunction::from_name(&self.activation)
    }

    /// Whether the unit currently carries a non-zero output.
    pub fn is_active(&self) -> bool {
        matches!(self.output, Some(out) if out != 0.0)
    }

    pub fn token(&self) -> StepToken {
        StepToken { layer_index: self.layer_index, unit_index: self.unit_index }
    }

    /// Forward step: `net = Σ inputs·weights + bias`, `output = f(net)`.
    pub fn compute_step(&mut self) -> StepToken {
        let weighted: f64 = self.inputs.iter().zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum();
        let net = weighted + self.bias;
        self.net = Some(net);
        self.output = Some(self.activation_fn().function(net));
        self.token()
    }

    /// Backward step using the generalised delta rule.
    ///
    /// `next_sigmas[k]` is the sigma of downstream unit `k` and
    /// `next_weights[k]` the weight that unit places on this unit's output.
    /// Sets `sigma = f'(output) · Σ next_sigmas[k]·next_weights[k]` and then
    /// moves every non-zero weight by `-sigma · learning_rate · input`.
    pub fn backward_step(
        &mut self,
        next_sigmas: &[f64],
        next_weights: &[f64],
        learning_rate: f64,
    ) -> StepToken {
        let downstream: f64 = next_sigmas.iter().zip(next_weights.iter())
            .map(|(s, w)| s * w)
            .sum();
        let slope = self.activation_fn().derivative(self.output.unwrap_or(0.0));
        let sigma = downstream * slope;
        self.sigma = Some(sigma);

        Sgd::new(learning_rate).step(&mut self.weights, &self.inputs, sigma);
        self.token()
    }

    /// Restores `len(inputs) == len(weights)` on a unit read from a document.
    pub(crate) fn reconcile(&mut self) {
        self.inputs.resize(self.weights.len(), 0.0);
    }
}
