use thiserror::Error;

/// Errors raised at the engine's I/O boundary.
///
/// The numeric core never fails: non-numeric values are coerced to 0 when they
/// are assigned and topology mismatches are reconciled rather than rejected.
/// Only reading/writing persisted documents and specs can go wrong.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
