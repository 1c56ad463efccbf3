pub mod network;
pub mod persist;
pub mod spec;

pub use network::{Network, SYNTHETIC_OUTPUT_WEIGHT};
pub use spec::NetworkSpec;
