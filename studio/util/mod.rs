pub mod body;
pub mod query;
pub mod sse;
