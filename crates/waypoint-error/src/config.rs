// Configuration error types

use std::any::Any;
use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, WaypointError};

/// Configuration error codes
pub mod codes {
    use crate::ErrorCode;

    // Configuration error codes start with 6000
    pub const IO: ErrorCode = ErrorCode(6001);
    pub const PARSE: ErrorCode = ErrorCode(6002);
    pub const INVALID_VALUE: ErrorCode = ErrorCode(6003);
}

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(String),

    #[error("Cannot parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl WaypointError for ConfigError {
    fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Io(_) => codes::IO,
            ConfigError::Parse(_) => codes::PARSE,
            ConfigError::InvalidValue(_) => codes::INVALID_VALUE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Convenient Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}
