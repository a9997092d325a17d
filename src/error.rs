//! Error types for untextract library.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for untextract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while submitting, polling, or extracting.
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is missing or has the wrong type.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service rejected the request.
    #[error("Service error ({code}): {message}")]
    Service {
        /// Error type reported by the service
        code: String,
        /// Human readable message from the service
        message: String,
    },

    /// The remote job reached the FAILED terminal status.
    #[error("Job {job_id} failed{}", reason_suffix(.message))]
    JobFailed {
        /// Identifier of the failed job
        job_id: String,
        /// Status message reported by the service, if any
        message: Option<String>,
    },

    /// The poller issued its maximum number of requests without a terminal status.
    #[error("Job {job_id} did not finish after {attempts} status requests")]
    PollLimitExceeded {
        /// Identifier of the job being polled
        job_id: String,
        /// Number of requests issued
        attempts: u32,
    },

    /// The poller exceeded its overall deadline.
    #[error("Job {job_id} did not finish within {elapsed:?}")]
    PollTimeout {
        /// Identifier of the job being polled
        job_id: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// Local waiting was cancelled. The remote job keeps running.
    #[error("Polling of job {job_id} was cancelled")]
    Cancelled {
        /// Identifier of the job being polled
        job_id: String,
    },

    /// The request cannot be expressed for the chosen operation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Error during rendering (lines, forms, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

fn reason_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl Error {
    /// Whether the error came from talking to the remote service.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Service { .. })
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
