// Link construction error types
// These errors never escape `link()` directly, they are handed to the
// presenter's invalid link policy first

use std::any::Any;
use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, WaypointError};

/// Link error codes
pub mod codes {
    use crate::ErrorCode;

    // Link error codes start with 3000
    pub const INVALID_LINK: ErrorCode = ErrorCode(3001);
    pub const UNKNOWN_SIGNAL: ErrorCode = ErrorCode(3002);
    pub const EXTRA_PARAMETER: ErrorCode = ErrorCode(3003);
}

/// Errors raised while building a link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Generic invalid link
    #[error("{0}")]
    InvalidLink(String),

    /// The destination names a signal without a callable handler
    #[error("Unknown signal '{class}:{signal}!'.")]
    UnknownSignal { class: String, signal: String },

    /// A positional argument had no parameter to bind to
    #[error("Extra parameter for signal '{class}:{signal}!'.")]
    ExtraParameter { class: String, signal: String },
}

impl WaypointError for LinkError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            LinkError::InvalidLink(_) => INVALID_LINK,
            LinkError::UnknownSignal { .. } => UNKNOWN_SIGNAL,
            LinkError::ExtraParameter { .. } => EXTRA_PARAMETER,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Link
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Convenient Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;

impl LinkError {
    /// Create a new generic invalid link error
    pub fn invalid(message: impl Into<String>) -> Self {
        LinkError::InvalidLink(message.into())
    }
}
