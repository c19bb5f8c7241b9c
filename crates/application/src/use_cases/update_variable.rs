//! Update variable use case.

use chrono::Utc;
use envlink_domain::{Variable, VariableDraft, VariableId, VariableValue, validate_variable_name};
use tracing::info;

use super::{ensure_no_dependents, ensure_valid};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;

/// Input for updating a variable in place.
///
/// Unset fields keep their current value.
#[derive(Debug, Clone)]
pub struct UpdateVariableInput {
    /// The variable to update.
    pub variable_id: VariableId,
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New value of the same kind as the current one.
    pub value: Option<VariableValue>,
}

impl UpdateVariableInput {
    /// Creates an input that changes nothing.
    #[must_use]
    pub const fn new(variable_id: VariableId) -> Self {
        Self {
            variable_id,
            name: None,
            description: None,
            value: None,
        }
    }
}

/// Use case for updating a variable without changing its kind.
pub struct UpdateVariable<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> UpdateVariable<'r, R> {
    /// Creates a new `UpdateVariable` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Updates name, description and value in place.
    ///
    /// A rename is refused while other variables reference the old name.
    ///
    /// # Errors
    /// - `NotFound` if the variable does not exist
    /// - `KindMismatch` if the new value has a different kind
    /// - `AlreadyExists` if the new name is taken
    /// - `DanglingDependents` if a rename would break references
    /// - `InvalidReferences` listing every reference violation
    pub async fn execute(&self, input: UpdateVariableInput) -> ApplicationResult<Variable> {
        let mut tx = self.repository.begin().await?;
        let mut variable = tx
            .variable(input.variable_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {}", input.variable_id)))?;

        if let Some(value) = &input.value
            && value.kind() != variable.kind()
        {
            return Err(ApplicationError::KindMismatch {
                current: variable.kind(),
                requested: value.kind(),
                variable: variable.name,
            });
        }

        let draft = VariableDraft {
            project_id: variable.project_id,
            name: input.name.unwrap_or_else(|| variable.name.clone()),
            description: input.description.or_else(|| variable.description.clone()),
            value: input.value.unwrap_or_else(|| variable.value.clone()),
        };

        if draft.name != variable.name {
            validate_variable_name(&draft.name)?;
            if tx
                .variable_by_name(variable.project_id, &draft.name)
                .await?
                .is_some()
            {
                return Err(ApplicationError::AlreadyExists(draft.name));
            }
            ensure_no_dependents(&*tx, &variable).await?;
        }

        ensure_valid(&*tx, &draft).await?;

        variable.name = draft.name;
        variable.description = draft.description;
        variable.value = draft.value;
        variable.updated_at = Utc::now();

        tx.update_variable(variable.clone()).await?;
        tx.commit().await?;

        info!(variable = %variable.name, id = %variable.id, "Updated variable");
        Ok(variable)
    }
}
