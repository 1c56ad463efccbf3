use crate::layers::unit::StepToken;
use crate::network::network::Network;
use crate::train::step::{Phase, StepSequence};

/// Cursor over one full forward pass.
///
/// Layers run in increasing index order starting at 1; a layer's inputs are
/// assigned from the previous layer's outputs just before its first unit
/// steps.  Units within a layer step in ascending index order.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    layer: usize,
    unit: usize,
    exhausted: bool,
}

impl ForwardPass {
    pub fn new() -> ForwardPass {
        ForwardPass { layer: 1, unit: 0, exhausted: false }
    }
}

impl Default for ForwardPass {
    fn default() -> Self {
        ForwardPass::new()
    }
}

impl StepSequence for ForwardPass {
    fn advance(&mut self, network: &mut Network) -> Option<StepToken> {
        if self.exhausted {
            return None;
        }
        while self.layer < network.layers.len() {
            if self.unit == 0 {
                network.feed_layer(self.layer);
            }
            if let Some(token) = network.layers[self.layer].compute_unit(self.unit) {
                self.unit += 1;
                tracing::trace!(layer = token.layer_index, unit = token.unit_index, "forward step");
                return Some(token);
            }
            self.layer += 1;
            self.unit = 0;
        }
        self.exhausted = true;
        tracing::debug!(err = network.err(), "forward pass complete");
        None
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn phase(&self) -> Phase {
        Phase::Forward
    }
}

/// Cursor over one full backward pass, from the output layer down to
/// layer 1.  The input layer is never visited.
///
/// The `(next_sigmas, next_weights)` rows for a layer are built when its first
/// unit steps, i.e. after the layer above has finished updating.
#[derive(Debug, Clone)]
pub struct BackwardPass {
    layer: Option<usize>,
    unit: usize,
    rows: Option<(Vec<Vec<f64>>, Vec<Vec<f64>>)>,
    exhausted: bool,
}

impl BackwardPass {
    pub fn new() -> BackwardPass {
        BackwardPass { layer: None, unit: 0, rows: None, exhausted: false }
    }
}

impl Default for BackwardPass {
    fn default() -> Self {
        BackwardPass::new()
    }
}

impl StepSequence for BackwardPass {
    fn advance(&mut self, network: &mut Network) -> Option<StepToken> {
        if self.exhausted {
            return None;
        }
        let mut layer = match self.layer {
            Some(layer) => layer,
            None => network.layers.len().saturating_sub(1),
        };
        while layer > 0 && layer < network.layers.len() {
            self.layer = Some(layer);
            let learning_rate = network.learning_rate;
            let (sigmas, weights) = &*self.rows.get_or_insert_with(|| network.backward_rows(layer));
            if let Some(token) =
                network.layers[layer].backward_unit(self.unit, sigmas, weights, learning_rate)
            {
                self.unit += 1;
                tracing::trace!(layer = token.layer_index, unit = token.unit_index, "backward step");
                return Some(token);
            }
            layer -= 1;
            self.unit = 0;
            self.rows = None;
        }
        self.exhausted = true;
        tracing::debug!("backward pass complete");
        None
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn phase(&self) -> Phase {
        Phase::Backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_network() -> Network {
        let mut net = Network::new(vec![1.0, 2.0], vec![0.5, 0.5], &[2, 2], vec![0.1, 0.2]);
        net.set_activation("sigmoid");
        for layer in net.layers.iter_mut().skip(1) {
            for unit in &mut layer.units {
                unit.set_weights(vec![0.3, 0.6]);
            }
        }
        net
    }

    #[test]
    fn forward_tokens_follow_layer_then_unit_order() {
        let mut net = fixed_network();
        let tokens: Vec<(usize, usize)> = net.compute()
            .map(|t| (t.layer_index, t.unit_index))
            .collect();
        assert_eq!(tokens, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn backward_tokens_run_in_reverse_layer_order() {
        let mut net = fixed_network();
        net.forward();
        let tokens: Vec<(usize, usize)> = net.backward()
            .map(|t| (t.layer_index, t.unit_index))
            .collect();
        assert_eq!(tokens, vec![(2, 0), (2, 1), (1, 0), (1, 1)]);
        assert!(net.layers[0].units.iter().all(|u| u.sigma.is_none()));
    }

    #[test]
    fn forward_cursor_is_resumable() {
        let mut net = fixed_network();
        let mut pass = ForwardPass::new();
        assert_eq!(pass.advance(&mut net).map(|t| t.unit_index), Some(0));
        assert!(net.layers[1].units[1].output.is_none());

        // The host may read or edit the network between steps.
        net.layers[1].units[1].bias = 0.0;
        while pass.advance(&mut net).is_some() {}
        assert!(pass.is_exhausted());
        assert!(pass.advance(&mut net).is_none());
        assert!(net.layers[2].units.iter().all(|u| u.output.is_some()));
    }

    #[test]
    fn passes_over_input_only_network_are_empty() {
        let mut net = Network::new(vec![1.0], vec![], &[], vec![]);
        assert_eq!(net.compute().count(), 0);
        assert_eq!(net.backward().count(), 0);
    }
}
