//! Delete variable use case.

use envlink_domain::{Variable, VariableId};
use tracing::info;

use super::ensure_no_dependents;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;

/// Use case for deleting a variable that nothing references.
pub struct DeleteVariable<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> DeleteVariable<'r, R> {
    /// Creates a new `DeleteVariable` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Deletes the variable and returns it.
    ///
    /// The dependents check and the delete share one transaction.
    ///
    /// # Errors
    /// - `NotFound` if the variable does not exist
    /// - `DanglingDependents` if other variables reference it
    pub async fn execute(&self, id: VariableId) -> ApplicationResult<Variable> {
        let mut tx = self.repository.begin().await?;
        let variable = tx
            .variable(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {id}")))?;

        ensure_no_dependents(&*tx, &variable).await?;

        tx.delete_variable(id).await?;
        tx.commit().await?;

        info!(variable = %variable.name, %id, "Deleted variable");
        Ok(variable)
    }
}
