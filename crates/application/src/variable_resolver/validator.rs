//! Write-time reference validation
//!
//! Checks a candidate variable's references against the store before it is
//! persisted. Every violation is collected; nothing short-circuits.

use envlink_domain::{VariableDraft, VariableValue};

use super::parser::{ParseError, VariableRef, parse_concatenation};
use crate::ports::{StoreError, VariableStore};

/// A rule broken by a candidate variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The link text is not a `PROJECT:VAR` reference.
    #[error("malformed reference: {0}")]
    MalformedReference(String),

    /// The referenced (or owning) project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// The referenced variable does not exist.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// A link may only target a raw or concatenated variable.
    #[error("cannot link to {0}: it is itself a linked variable")]
    ChainedLinkViolation(String),

    /// Concatenations may only reference the owning project.
    #[error("concatenation can only reference project '{owner}', not '{reference}'")]
    CrossProjectConcatViolation {
        /// Name of the owning project.
        owner: String,
        /// The offending reference.
        reference: String,
    },
}

/// Validates candidate variables against the current store contents.
#[derive(Debug)]
pub struct ReferenceValidator<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> ReferenceValidator<'s, S> {
    /// Creates a validator reading from `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns every violation of `candidate`. An empty list means it is valid.
    ///
    /// # Errors
    /// Returns `StoreError` only when the store itself fails.
    pub async fn validate(
        &self,
        candidate: &VariableDraft,
    ) -> Result<Vec<ValidationError>, StoreError> {
        match &candidate.value {
            VariableValue::Linked(reference) => self.validate_link(reference).await,
            VariableValue::Concatenated(expression) => {
                self.validate_concatenation(candidate, expression).await
            }
            VariableValue::Raw(_) | VariableValue::Empty => Ok(Vec::new()),
        }
    }

    async fn validate_link(&self, text: &str) -> Result<Vec<ValidationError>, StoreError> {
        let Ok(reference) = VariableRef::parse(text) else {
            return Ok(vec![ValidationError::MalformedReference(text.to_string())]);
        };

        let Some(project) = self.store.project_by_name(&reference.project).await? else {
            return Ok(vec![ValidationError::ProjectNotFound(reference.project)]);
        };

        let errors = match self
            .store
            .variable_by_name(project.id, &reference.variable)
            .await?
        {
            None => vec![ValidationError::VariableNotFound(reference.to_string())],
            Some(target) if target.is_linked() => {
                vec![ValidationError::ChainedLinkViolation(reference.to_string())]
            }
            Some(_) => Vec::new(),
        };
        Ok(errors)
    }

    async fn validate_concatenation(
        &self,
        candidate: &VariableDraft,
        expression: &str,
    ) -> Result<Vec<ValidationError>, StoreError> {
        let Some(owner) = self.store.project(candidate.project_id).await? else {
            return Ok(vec![ValidationError::ProjectNotFound(
                candidate.project_id.to_string(),
            )]);
        };

        let concatenation = match parse_concatenation(expression) {
            Ok(concatenation) => concatenation,
            Err(ParseError::EmptyExpression) => return Ok(Vec::new()),
            Err(ParseError::MalformedReference(text)) => {
                return Ok(vec![ValidationError::MalformedReference(text)]);
            }
        };

        let mut errors = Vec::new();
        for reference in concatenation.references() {
            if reference.project != owner.name {
                errors.push(ValidationError::CrossProjectConcatViolation {
                    owner: owner.name.clone(),
                    reference: reference.to_string(),
                });
            } else if self
                .store
                .variable_by_name(owner.id, &reference.variable)
                .await?
                .is_none()
            {
                errors.push(ValidationError::VariableNotFound(reference.to_string()));
            }
        }
        Ok(errors)
    }
}
