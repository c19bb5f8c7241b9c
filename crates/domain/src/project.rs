//! Projects: named namespaces that own variables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::ProjectId;

/// A named namespace owning a set of variables.
///
/// The project name is the key embedded in `PROJECT:VAR` references, so it is
/// restricted to the reference token alphabet. Renaming a project does not
/// rewrite references that embed the old name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,
    /// Unique, human-readable name used inside references.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project after validating its name.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProjectName` if the name cannot be used
    /// inside a reference.
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_project_name(&name)?;
        Ok(Self {
            id: ProjectId::new(),
            name,
            description: None,
            created_at: Utc::now(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the reference string other variables use to point at `variable_name`
    /// in this project.
    #[must_use]
    pub fn reference_to(&self, variable_name: &str) -> String {
        format!("{}:{variable_name}", self.name)
    }
}

/// Returns true if `c` may appear in a project or variable token of a reference.
#[must_use]
pub const fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validates a project name.
///
/// # Errors
/// Returns `DomainError::InvalidProjectName` if the name is empty or contains
/// characters outside `[A-Za-z0-9_-]`.
pub fn validate_project_name(name: &str) -> DomainResult<()> {
    if name.is_empty() || !name.chars().all(is_reference_char) {
        return Err(DomainError::InvalidProjectName(name.to_string()));
    }
    Ok(())
}
