//! In-memory variable store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use envlink_application::ports::{
    StoreError, VariableRepository, VariableStore, VariableTransaction,
};
use envlink_domain::{ExportId, ExportSnapshot, Project, ProjectId, Variable, VariableId};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tracing::debug;

use super::StoreState;
use crate::serialization::to_json_stable_bytes;

/// Implements [`VariableStore`] for a type with an async `state()` accessor.
macro_rules! impl_variable_store {
    ($ty:ty) => {
        #[async_trait]
        impl VariableStore for $ty {
            async fn project(
                &self,
                id: ProjectId,
            ) -> Result<Option<Project>, StoreError> {
                Ok(self.state().await.project(id).cloned())
            }

            async fn project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
                Ok(self.state().await.project_by_name(name).cloned())
            }

            async fn projects(&self) -> Result<Vec<Project>, StoreError> {
                Ok(self.state().await.projects_by_name())
            }

            async fn variable(&self, id: VariableId) -> Result<Option<Variable>, StoreError> {
                Ok(self.state().await.variable(id).cloned())
            }

            async fn variable_by_name(
                &self,
                project_id: ProjectId,
                name: &str,
            ) -> Result<Option<Variable>, StoreError> {
                Ok(self
                    .state()
                    .await
                    .variable_by_name(project_id, name)
                    .cloned())
            }

            async fn variables_in_project(
                &self,
                project_id: ProjectId,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self
                    .state()
                    .await
                    .variables_where(|v| v.project_id == project_id))
            }

            async fn variables_linked_to(
                &self,
                reference: &str,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self.state().await.linked_to(reference))
            }

            async fn variables_concatenating(
                &self,
                fragment: &str,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self.state().await.concatenating(fragment))
            }

            async fn export(
                &self,
                id: ExportId,
            ) -> Result<Option<ExportSnapshot>, StoreError> {
                Ok(self.state().await.exports.get(&id).cloned())
            }

            async fn exports_for_project(
                &self,
                project_id: ProjectId,
            ) -> Result<Vec<ExportSnapshot>, StoreError> {
                Ok(self.state().await.exports_for_project(project_id))
            }
        }
    };
}

pub(crate) use impl_variable_store;

/// A transactional store kept entirely in memory.
///
/// Transactions are serialized: [`begin`](VariableRepository::begin) holds the
/// store lock until the transaction is dropped, so a task holding a
/// transaction must read through it rather than through the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVariableStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryVariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `state`.
    #[must_use]
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns a copy of the committed state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    pub(crate) async fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().await
    }

    /// Starts a transaction that, when `persist_to` is set, writes the new
    /// state to that file before publishing it.
    pub(crate) async fn begin_with(&self, persist_to: Option<PathBuf>) -> MemoryTransaction {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        MemoryTransaction {
            guard,
            working,
            persist_to,
        }
    }
}

impl_variable_store!(InMemoryVariableStore);

#[async_trait]
impl VariableRepository for InMemoryVariableStore {
    async fn begin(&self) -> Result<Box<dyn VariableTransaction + '_>, StoreError> {
        Ok(Box::new(self.begin_with(None).await))
    }
}

/// A transaction over [`InMemoryVariableStore`].
///
/// Writes go to a private working copy; `commit` publishes it. Dropping the
/// transaction releases the lock and discards the copy.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
    persist_to: Option<PathBuf>,
}

impl MemoryTransaction {
    #[allow(clippy::unused_async)]
    async fn state(&self) -> &StoreState {
        &self.working
    }
}

impl_variable_store!(MemoryTransaction);

#[async_trait]
impl VariableTransaction for MemoryTransaction {
    async fn insert_project(&mut self, project: Project) -> Result<(), StoreError> {
        self.working.insert_project(project)
    }

    async fn insert_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        self.working.insert_variable(variable)
    }

    async fn update_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        self.working.update_variable(variable)
    }

    async fn delete_variable(&mut self, id: VariableId) -> Result<(), StoreError> {
        self.working.delete_variable(id)
    }

    async fn insert_export(&mut self, export: ExportSnapshot) -> Result<(), StoreError> {
        self.working.insert_export(export)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if let Some(path) = &self.persist_to {
            write_state(path, &self.working).await?;
        }
        *self.guard = self.working.clone();
        debug!(
            projects = self.working.projects.len(),
            variables = self.working.variables.len(),
            exports = self.working.exports.len(),
            "Committed transaction"
        );
        Ok(())
    }
}

/// Writes the state next to `path` and renames it into place.
async fn write_state(path: &Path, state: &StoreState) -> Result<(), StoreError> {
    let content =
        to_json_stable_bytes(state).map_err(|e| StoreError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    tokio::fs::write(&staging, &content).await?;
    tokio::fs::rename(&staging, path).await?;
    Ok(())
}
