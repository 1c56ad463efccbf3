use std::sync::atomic::Ordering;

use serde::{Serialize, Deserialize};

use crate::network::network::Network;
use crate::train::drive_config::DriveConfig;
use crate::train::step::StepSequence;
use crate::train::step_event::StepEvent;

/// Why a `drive` run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The sequence had no more steps.
    Exhausted,
    /// `max_steps` was reached.
    StepLimit,
    /// The stop flag was raised.
    Stopped,
    /// The progress receiver went away.
    Disconnected,
}

/// Summary of a `drive` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveOutcome {
    pub steps: usize,
    pub reason: StopReason,
    pub err: f64,
}

/// Host-side scheduling loop: advances `sequence` one unit step at a time,
/// reporting and pacing between steps, until it is exhausted or the config
/// says to stop.
///
/// The network is left consistent whenever this returns, since every step
/// commits fully before the stop conditions are checked.
pub fn drive<S: StepSequence>(
    network: &mut Network,
    sequence: &mut S,
    config: &DriveConfig,
) -> DriveOutcome {
    let mut steps = 0;

    let reason = loop {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break StopReason::Stopped;
            }
        }
        if config.max_steps.map_or(false, |max| steps >= max) {
            break StopReason::StepLimit;
        }

        let token = match sequence.advance(network) {
            Some(token) => token,
            None => break StopReason::Exhausted,
        };
        steps += 1;

        if let Some(ref tx) = config.progress_tx {
            let event = StepEvent {
                step: steps,
                token,
                phase: sequence.phase(),
                epoch: sequence.epochs(),
                err: network.err(),
            };
            // If the receiver has been dropped, stop driving.
            if tx.send(event).is_err() {
                break StopReason::Disconnected;
            }
        }

        if !config.pause.is_zero() {
            std::thread::sleep(config.pause);
        }
    };

    let err = network.err();
    tracing::info!(steps, ?reason, err, "drive finished");
    DriveOutcome { steps, reason, err }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, atomic::AtomicBool, mpsc};
    use crate::train::process::TrainProcess;
    use crate::train::passes::ForwardPass;

    fn network() -> Network {
        let mut net = Network::new(vec![0.05, 0.1], vec![0.01, 0.99], &[2, 2], vec![0.35, 0.6]);
        net.set_activation("sigmoid");
        net
    }

    #[test]
    fn forward_pass_runs_to_exhaustion() {
        let mut net = network();
        let outcome = drive(&mut net, &mut ForwardPass::new(), &DriveConfig::new(None));
        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.reason, StopReason::Exhausted);
    }

    #[test]
    fn step_limit_bounds_training() {
        let mut net = network();
        let mut process = TrainProcess::new();
        let outcome = drive(&mut net, &mut process, &DriveConfig::new(Some(10)));
        assert_eq!(outcome.steps, 10);
        assert_eq!(outcome.reason, StopReason::StepLimit);

        // Resuming continues where the previous run stopped.
        let outcome = drive(&mut net, &mut process, &DriveConfig::new(Some(7)));
        assert_eq!(outcome.steps, 7);
        assert_eq!(process.epochs(), 2);
    }

    #[test]
    fn raised_stop_flag_takes_no_step() {
        let mut net = network();
        let flag = Arc::new(AtomicBool::new(true));
        let mut config = DriveConfig::new(None);
        config.stop_flag = Some(flag);
        let outcome = drive(&mut net, &mut TrainProcess::new(), &config);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.reason, StopReason::Stopped);
    }

    #[test]
    fn progress_events_carry_tokens() {
        let mut net = network();
        let (tx, rx) = mpsc::channel();
        let mut config = DriveConfig::new(Some(5));
        config.progress_tx = Some(tx);
        drive(&mut net, &mut TrainProcess::new(), &config);
        drop(config);

        let events: Vec<StepEvent> = rx.iter().collect();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].step, 1);
        assert_eq!((events[0].token.layer_index, events[0].token.unit_index), (1, 0));
        assert_eq!(events[4].phase, crate::train::step::Phase::Backward);
        assert_eq!((events[4].token.layer_index, events[4].token.unit_index), (2, 0));
    }

    #[test]
    fn dropped_receiver_stops_the_run() {
        let mut net = network();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut config = DriveConfig::new(None);
        config.progress_tx = Some(tx);
        let outcome = drive(&mut net, &mut TrainProcess::new(), &config);
        assert_eq!(outcome.reason, StopReason::Disconnected);
        assert_eq!(outcome.steps, 1);
    }
}
