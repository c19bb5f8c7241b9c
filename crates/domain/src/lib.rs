//! Envlink Domain - Core business types
//!
//! This crate defines the domain model for project-scoped variables:
//! projects, variables whose values may reference other variables, and
//! export snapshots. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod export;
pub mod id;
pub mod project;
pub mod variable;

pub use error::{DomainError, DomainResult};
pub use export::{
    DiffStatus, ExportSnapshot, GitMetadata, NameAffixes, ResolvedValues, ValueDifference,
    diff_values, render_env, values_hash,
};
pub use id::{ExportId, ProjectId, VariableId};
pub use project::{Project, is_reference_char, validate_project_name};
pub use variable::{
    Variable, VariableDraft, VariableKind, VariableValue, validate_variable_name,
};
