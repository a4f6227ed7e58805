//! Unified error types for regraph.
//!
//! Structural problems in the logic input surface to the caller with the
//! offending names. Only configuration loading is allowed to degrade to
//! defaults (see [`FailOpen`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for regraph operations.
#[derive(Error, Debug)]
pub enum RegraphError {
    /// I/O errors while reading input or writing output files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input document is structurally unusable (duplicate names, too large).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A clause term has a shape the partitioner cannot classify.
    #[error("malformed term `{term}` in logic for {object}")]
    MalformedTerm { object: String, term: String },

    /// Aggregated graph validation failures.
    #[error("validation failed: {}", problems.join("; "))]
    Validation { problems: Vec<String> },
}

/// A specialized Result type for regraph operations.
pub type Result<T> = std::result::Result<T, RegraphError>;

impl RegraphError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a malformed term error.
    pub fn malformed_term(object: impl Into<String>, term: impl Into<String>) -> Self {
        Self::MalformedTerm {
            object: object.into(),
            term: term.into(),
        }
    }

    /// Create a validation error from every detected problem.
    pub fn validation(problems: Vec<String>) -> Self {
        Self::Validation { problems }
    }

    /// Problems carried by a validation failure, empty for other errors.
    pub fn problems(&self) -> &[String] {
        match self {
            Self::Validation { problems } => problems,
            _ => &[],
        }
    }
}

impl From<io::Error> for RegraphError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RegraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Used where a missing or broken optional input (user or project config)
/// must not stop a run: log a warning and continue with a default.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the regraph CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command failed (bad input, validation failure, I/O error).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
