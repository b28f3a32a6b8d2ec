// Resolution error types
// Raised while turning a presenter name into an instantiated handler

use std::any::Any;
use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, WaypointError};

/// Resolution error codes
pub mod codes {
    use crate::ErrorCode;

    // Resolution error codes start with 1000
    pub const INVALID_NAME: ErrorCode = ErrorCode(1001);
    pub const HANDLER_NOT_FOUND: ErrorCode = ErrorCode(1002);
    pub const NOT_A_HANDLER: ErrorCode = ErrorCode(1003);
    pub const ABSTRACT_HANDLER: ErrorCode = ErrorCode(1004);
    pub const INVALID_MAPPING: ErrorCode = ErrorCode(1005);
    pub const INSTANTIATION: ErrorCode = ErrorCode(1006);
    pub const REGISTRY: ErrorCode = ErrorCode(1007);
}

/// Errors raised by presenter name resolution and instantiation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The symbolic name is not a valid presenter name
    #[error("Presenter name must be alphanumeric string, '{name}' is invalid.")]
    InvalidName { name: String },

    /// The formatted class does not exist in the class registry
    #[error("Cannot load presenter '{name}', class '{class}' was not found.")]
    HandlerNotFound { name: String, class: String },

    /// The class exists but is not a request handler
    #[error("Cannot load presenter '{name}', class '{class}' is not a request handler.")]
    NotAHandler { name: String, class: String },

    /// The class is abstract and cannot be instantiated
    #[error("Cannot load presenter '{name}', class '{class}' is abstract.")]
    AbstractHandler { name: String, class: String },

    /// A mapping mask failed validation
    #[error("Invalid mapping mask '{mask}'.")]
    InvalidMapping { mask: String },

    /// The handler container could not build an instance
    #[error("Cannot create instance of '{class}': {reason}")]
    Instantiation { class: String, reason: String },

    /// Shared registry state could not be accessed
    #[error("Registry error: {0}")]
    Registry(String),
}

impl WaypointError for ResolveError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ResolveError::InvalidName { .. } => INVALID_NAME,
            ResolveError::HandlerNotFound { .. } => HANDLER_NOT_FOUND,
            ResolveError::NotAHandler { .. } => NOT_A_HANDLER,
            ResolveError::AbstractHandler { .. } => ABSTRACT_HANDLER,
            ResolveError::InvalidMapping { .. } => INVALID_MAPPING,
            ResolveError::Instantiation { .. } => INSTANTIATION,
            ResolveError::Registry(_) => REGISTRY,
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            ResolveError::InvalidMapping { .. } => ErrorDomain::Config,
            _ => ErrorDomain::Resolve,
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Convenient Result type for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;

impl ResolveError {
    /// Create a new registry error
    pub fn registry(message: impl Into<String>) -> Self {
        ResolveError::Registry(message.into())
    }
}
