//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A variable name does not satisfy the naming rules.
    #[error("invalid variable name '{name}': {reason}")]
    InvalidVariableName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A project name cannot be embedded in a reference.
    #[error("invalid project name '{0}': only letters, digits, '_' and '-' are allowed")]
    InvalidProjectName(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
