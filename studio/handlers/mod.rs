pub mod edit;
pub mod network;
pub mod steps;
pub mod train_sse;
