//! Durable variable store backed by a single JSON file.
//!
//! The whole store is one deterministic JSON document:
//! ```text
//! {
//!   "projects": { "<project id>": { ... } },
//!   "variables": { "<variable id>": { ... } },
//!   "exports": { "<export id>": { ... } }
//! }
//! ```
//! The file is read once on open and rewritten on every commit.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use envlink_application::ports::{
    StoreError, VariableRepository, VariableStore, VariableTransaction,
};
use envlink_domain::{ExportId, ExportSnapshot, Project, ProjectId, Variable, VariableId};
use tokio::sync::MutexGuard;
use tracing::{debug, info};

use super::memory_store::impl_variable_store;
use super::{InMemoryVariableStore, StoreState};
use crate::serialization::from_json_bytes;

/// A [`InMemoryVariableStore`] whose commits are written to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileVariableStore {
    inner: InMemoryVariableStore,
    path: PathBuf,
}

impl JsonFileVariableStore {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be read, or
    /// `StoreError::Serialization` if it is not a valid store document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => from_json_bytes::<StoreState>(&bytes)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Store file not found, starting empty");
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            path = %path.display(),
            projects = state.projects.len(),
            variables = state.variables.len(),
            "Opened store"
        );

        Ok(Self {
            inner: InMemoryVariableStore::with_state(state),
            path,
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state().await
    }
}

impl_variable_store!(JsonFileVariableStore);

#[async_trait]
impl VariableRepository for JsonFileVariableStore {
    async fn begin(&self) -> Result<Box<dyn VariableTransaction + '_>, StoreError> {
        Ok(Box::new(
            self.inner.begin_with(Some(self.path.clone())).await,
        ))
    }
}
