//! Resolve variables use case.

use envlink_domain::{NameAffixes, ProjectId, ResolvedValues, VariableId};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableStore;
use crate::variable_resolver::VariableResolver;

/// Resolves single variables or whole projects to their final values.
pub struct ResolveVariables<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> ResolveVariables<'s, S> {
    /// Creates a new `ResolveVariables` use case.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolves one variable. `None` means it has no value.
    ///
    /// # Errors
    /// Returns `Resolve` with the typed resolution failure.
    pub async fn variable(&self, id: VariableId) -> ApplicationResult<Option<String>> {
        Ok(VariableResolver::new(self.store).resolve(id).await?)
    }

    /// Resolves every variable of a project, with `affixes` applied to the names.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown project, or `Resolve` on store failure.
    pub async fn project(
        &self,
        project_id: ProjectId,
        affixes: &NameAffixes,
    ) -> ApplicationResult<ResolvedValues> {
        if self.store.project(project_id).await?.is_none() {
            return Err(ApplicationError::NotFound(format!("project {project_id}")));
        }

        let values = VariableResolver::new(self.store)
            .resolve_all(project_id)
            .await?;
        Ok(affixes.apply_all(&values))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::FakeStore;
    use crate::variable_resolver::ResolveError;
    use envlink_domain::VariableValue as V;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_project_with_affixes() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        store.add_var(p, "HOST", V::raw("localhost"));
        store.add_var(p, "PORT", V::raw("5432"));
        store.add_var(p, "URL", V::concatenated(r#""P:HOST":"P:PORT""#));
        store.add_var(p, "UNSET", V::Empty);

        let affixes = NameAffixes::new(Some("DB_".into()), Some("_V1".into()));
        let values = ResolveVariables::new(&store).project(p, &affixes).await.unwrap();

        let expected: ResolvedValues = [
            ("DB_HOST_V1", "localhost"),
            ("DB_PORT_V1", "5432"),
            ("DB_URL_V1", "localhost:5432"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(values, expected);
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let store = FakeStore::new();
        let err = ResolveVariables::new(&store)
            .project(ProjectId::new(), &NameAffixes::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_single_variable_failure_is_typed() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::linked("P:b"));

        let err = ResolveVariables::new(&store).variable(a).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Resolve(ResolveError::VariableNotFound(_))
        ));
    }
}
