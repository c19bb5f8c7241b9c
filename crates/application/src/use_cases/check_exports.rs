//! Check exports use case.

use envlink_domain::{ExportSnapshot, ProjectId, values_hash};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableStore;
use crate::variable_resolver::VariableResolver;

/// Freshness of one recorded export.
#[derive(Debug, Clone)]
pub struct ExportStatus {
    /// The recorded snapshot.
    pub snapshot: ExportSnapshot,
    /// Hash of what the export would contain now.
    pub current_hash: String,
    /// True when the current values differ from the recorded ones.
    pub outdated: bool,
}

/// Reports which exports of a project no longer match the current values.
pub struct CheckExports<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> CheckExports<'s, S> {
    /// Creates a new `CheckExports` use case.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Checks every export of the project, oldest first.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown project.
    pub async fn execute(&self, project_id: ProjectId) -> ApplicationResult<Vec<ExportStatus>> {
        if self.store.project(project_id).await?.is_none() {
            return Err(ApplicationError::NotFound(format!("project {project_id}")));
        }

        let snapshots = self.store.exports_for_project(project_id).await?;
        if snapshots.is_empty() {
            return Ok(Vec::new());
        }

        let values = VariableResolver::new(self.store)
            .resolve_all(project_id)
            .await?;

        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                let current = snapshot.affixes.apply_all(&values);
                ExportStatus {
                    current_hash: values_hash(&current),
                    outdated: snapshot.is_outdated(&current),
                    snapshot,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::FakeStore;
    use envlink_domain::{NameAffixes, ResolvedValues, VariableValue as V};

    fn values(pairs: &[(&str, &str)]) -> ResolvedValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_fresh_and_outdated() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        store.add_var(p, "A", V::raw("1"));

        let fresh = store.add_export(ExportSnapshot::new(
            p,
            "/a/.env",
            NameAffixes::new(Some("PRE_".into()), None),
            values(&[("PRE_A", "1")]),
        ));
        let stale = store.add_export(ExportSnapshot::new(
            p,
            "/b/.env",
            NameAffixes::default(),
            values(&[("A", "0")]),
        ));

        let statuses = CheckExports::new(&store).execute(p).await.unwrap();
        assert_eq!(statuses.len(), 2);

        let by_id = |id| statuses.iter().find(|s| s.snapshot.id == id).unwrap();
        assert!(!by_id(fresh).outdated);
        assert!(by_id(stale).outdated);
    }

    #[tokio::test]
    async fn test_empty_current_values_never_outdated() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        store.add_var(p, "A", V::Empty);
        store.add_export(ExportSnapshot::new(
            p,
            "/a/.env",
            NameAffixes::default(),
            values(&[("A", "1")]),
        ));

        let statuses = CheckExports::new(&store).execute(p).await.unwrap();
        assert!(!statuses[0].outdated);
    }

    #[tokio::test]
    async fn test_no_exports() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        assert!(CheckExports::new(&store).execute(p).await.unwrap().is_empty());
    }
}
