//! Error types for trajsim
//!
//! Every variant carries enough context (experiment id, unit name, vector
//! dimensions) to locate the offending record without re-running the batch.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trajsim error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing required fields in an experiment, step or unit state
    #[error("Data error in experiment '{experiment}': {message}")]
    Data {
        /// Identifier of the experiment being loaded (may be `<unknown>`)
        experiment: String,
        /// What was wrong with the record
        message: String,
    },

    /// A metric that needs at least one position received an empty trajectory
    #[error("Empty trajectory for unit '{unit}': metric requires at least one position")]
    EmptyTrajectory {
        /// Unit whose trajectory was empty
        unit: String,
    },

    /// Position vectors of different dimensionality were compared
    #[error("Shape mismatch: expected {expected}-dimensional position, found {found}")]
    Shape {
        /// Dimensionality of the left-hand position
        expected: usize,
        /// Dimensionality of the right-hand position
        found: usize,
    },

    /// Analysis configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a [`Error::Data`] for the given experiment.
    pub fn data(experiment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            experiment: experiment.into(),
            message: message.into(),
        }
    }
}
