//! Error types for the pursuit crate

use thiserror::Error;

/// Main error type for the pursuit crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed message on the wire: {message}")]
    MalformedMessage { message: String },

    #[error("unexpected {got} message (expected {expected})")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    #[error("transport endpoint disconnected during {operation}")]
    Disconnected { operation: &'static str },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("policy names unknown behavior '{name}'")]
    UnknownBehavior { name: String },

    #[error("policy for behavior '{behavior}' has {got} weights, expected {expected}")]
    WeightCountMismatch {
        behavior: String,
        expected: usize,
        got: usize,
    },

    #[error("non-finite reward {value} violates the learning contract")]
    NonFiniteReward { value: f64 },

    #[error("feature '{name}' produced non-finite value {value}")]
    NonFiniteFeature { name: String, value: f64 },

    #[error("controller thread for agent {agent_id} terminated abnormally")]
    ControllerFailed { agent_id: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
