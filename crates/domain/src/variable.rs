//! Variable types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{ProjectId, VariableId};

const MAX_NAME_LEN: usize = 255;
const REPRESENTATION_PREVIEW_CHARS: usize = 50;

/// The stored shape of a variable's value.
///
/// Exactly one shape is held at a time; `Empty` resolves to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    /// An opaque literal string.
    Raw(String),
    /// A single `PROJECT:VAR` reference.
    Linked(String),
    /// An expression of one or more `"PROJECT:VAR"` tokens and literal separators,
    /// or the legacy unquoted `PROJECT:VAR|PROJECT:VAR` form.
    Concatenated(String),
    /// No value.
    #[default]
    Empty,
}

impl VariableValue {
    /// Creates a raw value.
    #[must_use]
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    /// Creates a linked value.
    #[must_use]
    pub fn linked(reference: impl Into<String>) -> Self {
        Self::Linked(reference.into())
    }

    /// Creates a concatenated value.
    #[must_use]
    pub fn concatenated(expression: impl Into<String>) -> Self {
        Self::Concatenated(expression.into())
    }

    /// Returns the shape of this value.
    #[must_use]
    pub const fn kind(&self) -> VariableKind {
        match self {
            Self::Raw(_) => VariableKind::Raw,
            Self::Linked(_) => VariableKind::Linked,
            Self::Concatenated(_) => VariableKind::Concatenated,
            Self::Empty => VariableKind::Empty,
        }
    }

    /// Returns the stored reference text for linked and concatenated values.
    #[must_use]
    pub fn reference_text(&self) -> Option<&str> {
        match self {
            Self::Linked(text) | Self::Concatenated(text) => Some(text),
            Self::Raw(_) | Self::Empty => None,
        }
    }

    /// Returns a short human-readable representation for listings.
    #[must_use]
    pub fn representation(&self) -> String {
        match self {
            Self::Raw(value) => {
                let preview: String = value.chars().take(REPRESENTATION_PREVIEW_CHARS).collect();
                let ellipsis = if value.chars().count() > REPRESENTATION_PREVIEW_CHARS {
                    "..."
                } else {
                    ""
                };
                format!("RAW: {preview}{ellipsis}")
            }
            Self::Linked(reference) => format!("LINKED: {reference}"),
            Self::Concatenated(expression) => format!("CONCAT: {expression}"),
            Self::Empty => "EMPTY".to_string(),
        }
    }
}

/// The kind of a [`VariableValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Literal value.
    Raw,
    /// Single reference.
    Linked,
    /// Concatenation of references.
    Concatenated,
    /// No value.
    Empty,
}

impl VariableKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Linked => "linked",
            Self::Concatenated => "concatenated",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named value within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique identifier.
    pub id: VariableId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Name, unique within the owning project.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The stored shape.
    #[serde(default)]
    pub value: VariableValue,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Variable {
    /// Creates a new variable with a fresh id.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>, value: VariableValue) -> Self {
        let now = Utc::now();
        Self {
            id: VariableId::new(),
            project_id,
            name: name.into(),
            description: None,
            value,
            created_at: now,
            updated_at: now,
        }
    }

    /// Materializes a draft into a new variable.
    #[must_use]
    pub fn from_draft(draft: VariableDraft) -> Self {
        let mut variable = Self::new(draft.project_id, draft.name, draft.value);
        variable.description = draft.description;
        variable
    }

    /// Returns the shape of this variable's value.
    #[must_use]
    pub const fn kind(&self) -> VariableKind {
        self.value.kind()
    }

    /// Returns true if this variable is a link.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        matches!(self.value, VariableValue::Linked(_))
    }
}

/// A candidate variable submitted on the create/update path, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDraft {
    /// Owning project.
    pub project_id: ProjectId,
    /// Proposed name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Proposed value.
    pub value: VariableValue,
}

impl VariableDraft {
    /// Creates a draft without description.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>, value: VariableValue) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
            value,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validates a variable name.
///
/// Names are 1 to 255 characters of letters, digits and underscores, start with
/// a letter, and neither start nor end with an underscore.
///
/// # Errors
/// Returns `DomainError::InvalidVariableName` describing the first rule broken.
pub fn validate_variable_name(name: &str) -> DomainResult<()> {
    let reject = |reason| {
        Err(DomainError::InvalidVariableName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return reject("must be between 1 and 255 characters");
    }
    if name.contains(' ') {
        return reject("cannot contain spaces");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return reject("can only contain letters, numbers, and underscores");
    }
    if name.starts_with('_') || name.ends_with('_') {
        return reject("cannot start or end with underscore");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return reject("must start with a letter");
    }
    Ok(())
}
