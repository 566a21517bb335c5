//! Error type shared by the library and the binary.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("shape library error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("zone {zone} has no structures to act on")]
    EmptyZone { zone: usize },
}
