use crate::layers::unit::StepToken;
use crate::network::network::Network;
use crate::train::passes::{BackwardPass, ForwardPass};
use crate::train::step::{Phase, StepSequence};

/// The unbounded training process: a full forward pass, then a full backward
/// pass, forever.
///
/// There is no convergence check.  The only way the sequence ends is a network
/// with no computational units, where a whole cycle produces no step at all.
#[derive(Debug, Clone)]
pub struct TrainProcess {
    phase: Phase,
    forward: ForwardPass,
    backward: BackwardPass,
    epochs: usize,
    exhausted: bool,
}

impl TrainProcess {
    pub fn new() -> TrainProcess {
        TrainProcess {
            phase: Phase::Forward,
            forward: ForwardPass::new(),
            backward: BackwardPass::new(),
            epochs: 0,
            exhausted: false,
        }
    }

    fn switch_phase(&mut self, network: &Network) {
        match self.phase {
            Phase::Forward => {
                self.phase = Phase::Backward;
                self.backward = BackwardPass::new();
            }
            Phase::Backward => {
                self.phase = Phase::Forward;
                self.forward = ForwardPass::new();
                self.epochs += 1;
                tracing::debug!(epoch = self.epochs, err = network.err(), "training cycle complete");
            }
        }
    }
}

impl Default for TrainProcess {
    fn default() -> Self {
        TrainProcess::new()
    }
}

impl StepSequence for TrainProcess {
    fn advance(&mut self, network: &mut Network) -> Option<StepToken> {
        if self.exhausted {
            return None;
        }
        // A network with units yields within two attempts (finish the current
        // pass, start the next one); a third empty pass means nothing to step.
        for _ in 0..3 {
            let step = match self.phase {
                Phase::Forward => self.forward.advance(network),
                Phase::Backward => self.backward.advance(network),
            };
            if step.is_some() {
                return step;
            }
            self.switch_phase(network);
        }
        self.exhausted = true;
        tracing::debug!("network has no computational units; training ended");
        None
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn epochs(&self) -> usize {
        self.epochs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_forward_and_backward_passes() {
        let mut net = Network::new(vec![0.2, 0.4], vec![0.9], &[2, 1], vec![0.1, 0.1]);
        net.set_activation("sigmoid");
        let mut process = TrainProcess::new();

        let mut phases = Vec::new();
        for _ in 0..12 {
            process.advance(&mut net).unwrap();
            phases.push(process.phase());
        }
        use Phase::*;
        assert_eq!(phases, vec![
            Forward, Forward, Forward, Backward, Backward, Backward,
            Forward, Forward, Forward, Backward, Backward, Backward,
        ]);
        assert_eq!(process.epochs(), 1);
        assert!(!process.is_exhausted());
    }

    #[test]
    fn empty_network_ends_instead_of_spinning() {
        let mut net = Network::new(vec![1.0, 2.0], vec![], &[], vec![]);
        let mut process = TrainProcess::new();
        assert!(process.advance(&mut net).is_none());
        assert!(process.is_exhausted());
    }
}
