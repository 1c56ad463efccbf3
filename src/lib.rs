pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use activation::activation::ActivationFunction;
pub use layers::{Layer, StepToken, Unit};
pub use network::{Network, NetworkSpec};
pub use loss::half_sse::HalfSquaredError;
pub use optim::sgd::Sgd;
pub use train::{drive, DriveConfig, DriveOutcome, Phase, StepEvent, StepSequence, Steps, StopReason, TrainProcess};
