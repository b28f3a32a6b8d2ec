// Component state and tree error types

use std::any::Any;
use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, WaypointError};

/// State error codes
pub mod codes {
    use crate::ErrorCode;

    // State error codes start with 4000
    pub const NON_SCALAR_PERSISTENT_VALUE: ErrorCode = ErrorCode(4001);
    pub const PRESENTER_NOT_FOUND: ErrorCode = ErrorCode(4002);
    pub const COMPONENT_NOT_FOUND: ErrorCode = ErrorCode(4003);
    pub const DUPLICATE_COMPONENT: ErrorCode = ErrorCode(4004);
    pub const INVALID_COMPONENT_NAME: ErrorCode = ErrorCode(4005);
    pub const ALREADY_ATTACHED: ErrorCode = ErrorCode(4006);
    pub const COERCION: ErrorCode = ErrorCode(4007);
    pub const CYCLE: ErrorCode = ErrorCode(4008);
    pub const UNKNOWN_NODE: ErrorCode = ErrorCode(4009);
}

/// Errors raised by the component tree and the persistence protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A persistent field held a composite value
    #[error("Persistent parameter must be scalar or array, '{class}::${name}' is {kind}.")]
    NonScalarPersistentValue { class: String, name: String, kind: String },

    /// The component is not attached to a presenter
    #[error("Component '{component}' is not attached to a presenter.")]
    PresenterNotFound { component: String },

    /// No child component of that name exists or can be created
    #[error("Component with name '{name}' does not exist in '{container}'.")]
    ComponentNotFound { name: String, container: String },

    /// A sibling with the same name is already attached
    #[error("Component with name '{name}' already exists in '{container}'.")]
    DuplicateComponent { name: String, container: String },

    /// Component names must be non-empty and free of the path separator
    #[error("Component name must be non-empty alphanumeric string, '{0}' given.")]
    InvalidComponentName(String),

    /// The component already has a parent
    #[error("Component '{0}' already has a parent.")]
    AlreadyAttached(String),

    /// Attaching the component would make it its own ancestor
    #[error("Component '{0}' cannot be attached beneath itself.")]
    Cycle(String),

    /// The node id was issued by a different component tree
    #[error("Component #{0} does not belong to this tree.")]
    UnknownNode(usize),

    /// A value cannot be coerced to the requested type
    #[error("Cannot convert {kind} to {target}.")]
    Coercion { kind: String, target: String },
}

impl WaypointError for StateError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            StateError::NonScalarPersistentValue { .. } => NON_SCALAR_PERSISTENT_VALUE,
            StateError::PresenterNotFound { .. } => PRESENTER_NOT_FOUND,
            StateError::ComponentNotFound { .. } => COMPONENT_NOT_FOUND,
            StateError::DuplicateComponent { .. } => DUPLICATE_COMPONENT,
            StateError::InvalidComponentName(_) => INVALID_COMPONENT_NAME,
            StateError::AlreadyAttached(_) => ALREADY_ATTACHED,
            StateError::Coercion { .. } => COERCION,
            StateError::Cycle(_) => CYCLE,
            StateError::UnknownNode(_) => UNKNOWN_NODE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::State
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Convenient Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
