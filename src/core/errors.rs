//! Error types for the clone-recall library.
//!
//! Configuration and range errors are raised before or instead of any counting
//! work; store errors abort an evaluation run. Empty partitions and undefined
//! recall are results, not errors, and never show up here.

use std::io;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Main result type for clone-recall operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Error type for all clone-recall operations.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Malformed or out-of-domain matcher configuration
    #[error("Configuration error in {strategy}: {message} (input: {input:?})")]
    Configuration {
        /// Strategy whose configuration was rejected
        strategy: String,
        /// Error description
        message: String,
        /// Offending configuration text
        input: String,
    },

    /// A matcher strategy name that is not registered
    #[error("Unknown clone matcher '{name}' (known: {})", .known.join(", "))]
    UnknownStrategy {
        /// Requested strategy name
        name: String,
        /// Registered strategy names
        known: Vec<String>,
    },

    /// Misuse of a dimension query, such as an inverted similarity band
    #[error("Range error [{lo}, {hi}): {message}")]
    Range {
        /// Requested lower bound
        lo: u32,
        /// Requested upper bound
        hi: u32,
        /// Error description
        message: String,
    },

    /// Failure reported by the reference clone store
    #[error("Store error: {message}")]
    Store {
        /// Error description
        message: String,
        /// Underlying store error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested tool does not exist in the store
    #[error("There is no such tool with ID {id}")]
    UnknownTool {
        /// Requested tool identifier
        id: i64,
    },

    /// I/O related errors
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being processed
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for settings and input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },
}

impl EvalError {
    /// Create a new configuration error for a matcher strategy
    pub fn configuration(
        strategy: impl Into<String>,
        message: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            strategy: strategy.into(),
            message: message.into(),
            input: input.into(),
        }
    }

    /// Create a new range error
    pub fn range(lo: u32, hi: u32, message: impl Into<String>) -> Self {
        Self::Range {
            lo,
            hi,
            message: message.into(),
        }
    }

    /// Create a new store error without an underlying cause
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new store error wrapping the cause
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Prefix the message of a store or I/O error with context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Store { message, .. } | Self::Io { message, .. } => {
                *message = format!("{}: {message}", context.into());
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for EvalError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for EvalError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseIntError> for EvalError {
    fn from(err: ParseIntError) -> Self {
        Self::validation(format!("Invalid integer: {err}"))
    }
}

impl From<ParseFloatError> for EvalError {
    fn from(err: ParseFloatError) -> Self {
        Self::validation(format!("Invalid float: {err}"))
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EvalError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: EvalError = e.into();
            err.with_context(f())
        })
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| {
            let err: EvalError = e.into();
            err.with_context(msg)
        })
    }
}
