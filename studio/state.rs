use std::sync::{Arc, Mutex, MutexGuard, atomic::AtomicBool};

use neurostep::{Network, StepEvent, StepSequence, TrainProcess};

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

pub enum RunStatus {
    /// Nobody is streaming steps; single steps are allowed.
    Idle,
    /// An event stream is advancing the network.
    Running { stop_flag: Arc<AtomicBool> },
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// The network being edited and trained.
    pub network: Option<Network>,
    /// Position of the session's training process.  Single steps and streamed
    /// training share it, so pausing and resuming picks up mid-pass.
    pub process: TrainProcess,
    /// Steps taken by `process` since the network was installed.
    pub steps_taken: usize,
    pub run: RunStatus,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState {
            network: None,
            process: TrainProcess::new(),
            steps_taken: 0,
            run: RunStatus::Idle,
        }
    }

    /// Makes `network` the session network and restarts training from the
    /// beginning of a forward pass.
    pub fn install(&mut self, network: Network) {
        self.network = Some(network);
        self.restart();
    }

    pub fn restart(&mut self) {
        self.process = TrainProcess::new();
        self.steps_taken = 0;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run, RunStatus::Running { .. })
    }

    /// Advances the training process by one unit step.
    pub fn advance(&mut self) -> Option<StepEvent> {
        let network = self.network.as_mut()?;
        let event = advance_observed(network, &mut self.process, self.steps_taken + 1)?;
        self.steps_taken = event.step;
        Some(event)
    }
}

/// Advances `sequence` by one step and describes what happened.
pub fn advance_observed<S: StepSequence>(
    network: &mut Network,
    sequence: &mut S,
    step: usize,
) -> Option<StepEvent> {
    let token = sequence.advance(network)?;
    Some(StepEvent {
        step,
        token,
        phase: sequence.phase(),
        epoch: sequence.epochs(),
        err: network.err(),
    })
}

/// Shared state type: an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the shared state.  A handler that panicked mid-request cannot leave
/// the network half-stepped, so a poisoned lock is still usable.
pub fn lock(state: &SharedState) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurostep::Phase;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 2-2-1 network: three forward steps, then three backward steps.
    fn small_network() -> Network {
        let mut rng = StdRng::seed_from_u64(5);
        let mut net = Network::with_rng(vec![0.3, 0.7], vec![1.0], &[2, 1], vec![0.1, 0.2], &mut rng);
        net.set_activation("sigmoid");
        net
    }

    #[test]
    fn advance_without_network_is_none() {
        let mut st = StudioState::new();
        assert!(st.advance().is_none());
        assert_eq!(st.steps_taken, 0);
    }

    #[test]
    fn single_steps_resume_across_the_pass_boundary() {
        let mut st = StudioState::new();
        st.install(small_network());

        let forward: Vec<StepEvent> = (0..3).filter_map(|_| st.advance()).collect();
        assert_eq!(forward.len(), 3);
        assert!(forward.iter().all(|e| e.phase == Phase::Forward));
        assert_eq!(forward.iter().map(|e| e.step).collect::<Vec<_>>(), vec![1, 2, 3]);

        let event = st.advance().unwrap();
        assert_eq!(event.phase, Phase::Backward);
        assert_eq!((event.token.layer_index, event.token.unit_index), (2, 0));
        assert_eq!(event.step, 4);
        assert_eq!(st.steps_taken, 4);

        for _ in 0..2 {
            st.advance();
        }
        let event = st.advance().unwrap();
        assert_eq!(event.phase, Phase::Forward);
        assert_eq!(event.epoch, 1);
        assert_eq!(st.steps_taken, 7);
    }

    #[test]
    fn restart_discards_the_position() {
        let mut st = StudioState::new();
        st.install(small_network());
        for _ in 0..4 {
            st.advance();
        }

        st.restart();
        assert_eq!(st.steps_taken, 0);
        let event = st.advance().unwrap();
        assert_eq!(event.phase, Phase::Forward);
        assert_eq!((event.token.layer_index, event.token.unit_index), (1, 0));
        assert_eq!(event.step, 1);
    }

    #[test]
    fn install_resets_the_position() {
        let mut st = StudioState::new();
        st.install(small_network());
        for _ in 0..5 {
            st.advance();
        }

        st.install(small_network());
        assert_eq!(st.steps_taken, 0);
        assert_eq!(st.process.epochs(), 0);
        let event = st.advance().unwrap();
        assert_eq!((event.phase, event.step), (Phase::Forward, 1));
    }

    #[test]
    fn running_status() {
        let mut st = StudioState::new();
        assert!(!st.is_running());
        st.run = RunStatus::Running { stop_flag: Arc::new(AtomicBool::new(false)) };
        assert!(st.is_running());
        st.run = RunStatus::Idle;
        assert!(!st.is_running());
    }
}
