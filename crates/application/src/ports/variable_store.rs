//! Variable store ports
//!
//! Defines the read interface the resolution engine depends on, and the
//! transactional write interface used by the mutation use cases.

use async_trait::async_trait;

use envlink_domain::{ExportId, ExportSnapshot, Project, ProjectId, Variable, VariableId};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The entity to modify does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Read access to projects, variables and export snapshots.
///
/// Implementations must give each call a consistent (read-committed) view.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Looks up a project by id.
    async fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Looks up a project by its unique name.
    async fn project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError>;

    /// Lists all projects ordered by name.
    async fn projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Looks up a variable by id.
    async fn variable(&self, id: VariableId) -> Result<Option<Variable>, StoreError>;

    /// Looks up a variable by name within a project.
    async fn variable_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Option<Variable>, StoreError>;

    /// Lists the variables of a project ordered by name.
    async fn variables_in_project(&self, project_id: ProjectId)
    -> Result<Vec<Variable>, StoreError>;

    /// Returns every linked variable whose reference equals `reference` exactly.
    async fn variables_linked_to(&self, reference: &str) -> Result<Vec<Variable>, StoreError>;

    /// Returns every concatenated variable whose expression contains `fragment`.
    async fn variables_concatenating(&self, fragment: &str) -> Result<Vec<Variable>, StoreError>;

    /// Looks up an export snapshot by id.
    async fn export(&self, id: ExportId) -> Result<Option<ExportSnapshot>, StoreError>;

    /// Lists the export snapshots recorded for a project, oldest first.
    async fn exports_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ExportSnapshot>, StoreError>;
}

/// A unit of work against the store.
///
/// Reads through the transaction observe its own uncommitted writes. Dropping
/// the transaction without calling [`commit`](Self::commit) discards every write.
#[async_trait]
pub trait VariableTransaction: VariableStore {
    /// Inserts a new project.
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the name is taken.
    async fn insert_project(&mut self, project: Project) -> Result<(), StoreError>;

    /// Inserts a new variable.
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the name is taken within the project,
    /// or `StoreError::NotFound` if the project does not exist.
    async fn insert_variable(&mut self, variable: Variable) -> Result<(), StoreError>;

    /// Replaces an existing variable with the same id.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the variable does not exist, or
    /// `StoreError::Conflict` if a rename collides.
    async fn update_variable(&mut self, variable: Variable) -> Result<(), StoreError>;

    /// Deletes a variable.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the variable does not exist.
    async fn delete_variable(&mut self, id: VariableId) -> Result<(), StoreError>;

    /// Records an export snapshot.
    async fn insert_export(&mut self, export: ExportSnapshot) -> Result<(), StoreError>;

    /// Makes every write of this transaction visible to other readers.
    async fn commit(&mut self) -> Result<(), StoreError>;
}

/// A store that supports transactional writes.
#[async_trait]
pub trait VariableRepository: VariableStore {
    /// Starts a transaction. Concurrent transactions are serialized.
    async fn begin(&self) -> Result<Box<dyn VariableTransaction + '_>, StoreError>;
}
