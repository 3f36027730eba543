//! Error types shared by the engine, the store and the HTTP layer.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Convenience Result type using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that make a run pointless to retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The reference graph loops back onto itself.
    #[error("reference cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// A playlist references a name the store doesn't know.
    #[error("playlist {from} references unknown playlist {missing}")]
    DanglingReference { from: String, missing: String },

    #[error("playlist {0} cannot reference itself")]
    SelfReference(String),

    #[error("spotify account not linked")]
    NotLinked,

    #[error("playlist {0} has no destination uri")]
    NoDestination(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rate limiting, timeouts and 5xx answers from the provider.
    #[error("transient provider error: {message}")]
    Transient {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Provider answered with an error that retrying will not fix.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("run of {playlist} failed: {reason}")]
    RunFailed { playlist: String, reason: String },

    /// The run exceeded its time budget and was dropped mid-flight.
    #[error("run of {playlist} cancelled after {}s", .after.as_secs())]
    Cancelled { playlist: String, after: Duration },

    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("playlist {0} is already running")]
    AlreadyRunning(String),

    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Only transient provider failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Delay the provider asked for, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Classifies an HTTP status returned by the provider.
    pub fn from_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient {
                message: format!("{status}: {body}"),
                retry_after,
            }
        } else {
            Self::Provider(format!("{status}: {body}"))
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return Self::transient(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status, &err.to_string(), None),
            None => Self::Provider(err.to_string()),
        }
    }
}
