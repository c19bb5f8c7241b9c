//! Application error types

use envlink_domain::{DomainError, VariableKind};
use thiserror::Error;

use crate::ports::StoreError;
use crate::variable_resolver::{ResolveError, ValidationError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A variable could not be resolved.
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// The candidate variable references something it may not.
    #[error("invalid variable references: {}", join(.0))]
    InvalidReferences(Vec<ValidationError>),

    /// Other variables still reference the one being removed or reshaped.
    #[error("variable '{variable}' is referenced by: {}", .dependents.join(", "))]
    DanglingDependents {
        /// The variable being removed or reshaped.
        variable: String,
        /// Names of the variables referencing it.
        dependents: Vec<String>,
    },

    /// An update tried to change the shape of a variable.
    #[error("variable '{variable}' is {current}; use a type change to make it {requested}")]
    KindMismatch {
        /// The variable being updated.
        variable: String,
        /// Its current shape.
        current: VariableKind,
        /// The shape requested.
        requested: VariableKind,
    },

    /// An entity with the same name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The project has no variable that resolves to a value.
    #[error("no resolvable variables to export in project '{0}'")]
    NothingToExport(String),

    /// Writing an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
