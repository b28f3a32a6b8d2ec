// Waypoint Error Handling Framework
// Central location for error types, traits, and handling utilities

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

// Re-export common error handling tools for convenience
pub use thiserror;

mod macros;

mod config;
mod link;
mod resolve;
mod signal;
mod state;

pub use config::{ConfigError, ConfigResult};
pub use link::{LinkError, LinkResult};
pub use resolve::{ResolveError, ResolveResult};
pub use signal::{SignalError, SignalResult};
pub use state::{StateError, StateResult};

/// Error domains representing the phase of a request an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Resolve, Signal, Link, State, Config, Internal,
}
impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Resolve => write!(f, "resolve"),
            ErrorDomain::Signal => write!(f, "signal"),
            ErrorDomain::Link => write!(f, "link"),
            ErrorDomain::State => write!(f, "state"),
            ErrorDomain::Config => write!(f, "config"),
            ErrorDomain::Internal => write!(f, "internal"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Standard error message format for serialization
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub domain: ErrorDomain,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Base trait for all errors raised by the presenter core.
pub trait WaypointError: StdError + fmt::Debug + Send + Sync + Any + 'static {
    /// Numeric code of this error.
    fn code(&self) -> ErrorCode;

    /// Request phase this error belongs to.
    fn domain(&self) -> ErrorDomain;

    /// Whether the error should surface as a "bad request" to the client
    /// rather than as a server fault.
    fn is_bad_request(&self) -> bool { false }

    /// Builds the serializable form of this error.
    fn to_message(&self) -> ErrorMessage {
        ErrorMessage {
            code: self.code(),
            domain: self.domain(),
            message: self.to_string(),
            details: None,
        }
    }

    /// Returns this error as a `&dyn Any` to allow downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Top-level error of the presenter core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)] Resolve(#[from] ResolveError),
    #[error(transparent)] Signal(#[from] SignalError),
    #[error(transparent)] Link(#[from] LinkError),
    #[error(transparent)] State(#[from] StateError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error("Internal error: {0}")] Internal(String),
}

impl WaypointError for Error {
    fn code(&self) -> ErrorCode {
        match self {
            Error::Resolve(e) => e.code(),
            Error::Signal(e) => e.code(),
            Error::Link(e) => e.code(),
            Error::State(e) => e.code(),
            Error::Config(e) => e.code(),
            Error::Internal(_) => ErrorCode(9001),
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            Error::Resolve(e) => e.domain(),
            Error::Signal(e) => e.domain(),
            Error::Link(e) => e.domain(),
            Error::State(e) => e.domain(),
            Error::Config(e) => e.domain(),
            Error::Internal(_) => ErrorDomain::Internal,
        }
    }

    fn is_bad_request(&self) -> bool {
        match self {
            Error::Signal(e) => e.is_bad_request(),
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}

impl Error {
    /// Create an internal error with the given reason
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal(reason.into())
    }

    /// Returns the link error if this error was raised while building a link
    pub fn as_link_error(&self) -> Option<&LinkError> {
        match self {
            Error::Link(e) => Some(e),
            _ => None,
        }
    }
}

/// Standard Result type of the presenter core
pub type Result<T> = std::result::Result<T, Error>;
