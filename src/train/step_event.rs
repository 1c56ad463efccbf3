use serde::{Serialize, Deserialize};

use crate::layers::unit::StepToken;
use crate::train::step::Phase;

/// One observed step, as reported by `drive` and the studio event stream.
///
/// When a `progress_tx` channel is configured in `DriveConfig`, the driver
/// sends one `StepEvent` after every committed unit step.  Receivers use it to
/// highlight the unit just touched and to chart the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// 1-based count of steps taken in this run.
    pub step: usize,
    #[serde(flatten)]
    pub token: StepToken,
    pub phase: Phase,
    /// Completed forward+backward cycles so far.
    pub epoch: usize,
    /// Network error after the step.  Mid forward pass this still reflects the
    /// previous outputs of the final layer.
    pub err: f64,
}
