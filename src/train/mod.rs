pub mod step;
pub mod passes;
pub mod process;
pub mod step_event;
pub mod drive_config;
pub mod driver;

pub use step::{Phase, StepSequence, Steps};
pub use passes::{BackwardPass, ForwardPass};
pub use process::TrainProcess;
pub use step_event::StepEvent;
pub use drive_config::DriveConfig;
pub use driver::{drive, DriveOutcome, StopReason};
