use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use std::time::Duration;

use crate::train::step_event::StepEvent;

/// Configuration for a `drive` run.
///
/// # Fields
/// - `max_steps`   : stop after this many unit steps; `None` runs until the
///                   sequence is exhausted, which for `train()` is never
/// - `pause`       : delay after each step, giving an observer time to render
/// - `progress_tx` : optional channel sender; one `StepEvent` is sent per
///                   step.  If the receiver is dropped the run stops.
/// - `stop_flag`   : optional atomic flag; when set to `true` from another
///                   thread the run stops before the next step.
pub struct DriveConfig {
    pub max_steps: Option<usize>,
    pub pause: Duration,
    pub progress_tx: Option<mpsc::Sender<StepEvent>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl DriveConfig {
    /// Creates a `DriveConfig` with no pause, no progress channel and no stop
    /// flag.
    pub fn new(max_steps: Option<usize>) -> Self {
        DriveConfig {
            max_steps,
            pause: Duration::ZERO,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}
