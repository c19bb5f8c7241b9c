//! Create variable use case.

use envlink_domain::{Variable, VariableDraft, validate_variable_name};
use tracing::info;

use super::ensure_valid;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;

/// Use case for creating a variable.
pub struct CreateVariable<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> CreateVariable<'r, R> {
    /// Creates a new `CreateVariable` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Validates and persists a new variable.
    ///
    /// # Errors
    /// - `Domain` if the name breaks the naming rules
    /// - `NotFound` if the owning project does not exist
    /// - `AlreadyExists` if the project already has a variable with that name
    /// - `InvalidReferences` listing every reference violation
    pub async fn execute(&self, draft: VariableDraft) -> ApplicationResult<Variable> {
        validate_variable_name(&draft.name)?;

        let mut tx = self.repository.begin().await?;
        let project = tx
            .project(draft.project_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("project {}", draft.project_id)))?;

        if tx.variable_by_name(project.id, &draft.name).await?.is_some() {
            return Err(ApplicationError::AlreadyExists(
                project.reference_to(&draft.name),
            ));
        }

        ensure_valid(&*tx, &draft).await?;

        let variable = Variable::from_draft(draft);
        tx.insert_variable(variable.clone()).await?;
        tx.commit().await?;

        info!(
            variable = %project.reference_to(&variable.name),
            kind = %variable.kind(),
            "Created variable"
        );
        Ok(variable)
    }
}
