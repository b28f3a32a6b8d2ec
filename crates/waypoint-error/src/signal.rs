// Signal dispatch error types

use std::any::Any;
use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, WaypointError};

/// Signal error codes
pub mod codes {
    use crate::ErrorCode;

    // Signal error codes start with 2000
    pub const UNHANDLED_SIGNAL: ErrorCode = ErrorCode(2001);
    pub const BAD_SIGNAL: ErrorCode = ErrorCode(2002);
}

/// Errors raised while dispatching an inbound signal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// No handler is registered for the signal on the receiving component
    #[error("There is no handler for signal '{signal}' in class {class}.")]
    UnhandledSignal { signal: String, class: String },

    /// The signal could not be routed to a receiver
    #[error("{0}")]
    BadSignal(String),
}

impl WaypointError for SignalError {
    fn code(&self) -> ErrorCode {
        match self {
            SignalError::UnhandledSignal { .. } => codes::UNHANDLED_SIGNAL,
            SignalError::BadSignal(_) => codes::BAD_SIGNAL,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Signal
    }

    fn is_bad_request(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Convenient Result type for signal operations
pub type SignalResult<T> = Result<T, SignalError>;
