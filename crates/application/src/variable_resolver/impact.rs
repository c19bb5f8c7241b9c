//! Reverse-dependency queries
//!
//! Answers "who references this variable" and "which recorded exports would
//! change if it changed". Matching is textual on `PROJECT:VAR`, so a
//! concatenation mentioning a longer name with the same prefix is reported too.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use envlink_domain::{ExportId, GitMetadata, ProjectId, Variable, VariableId};

use crate::ports::{StoreError, VariableStore};

/// An export snapshot that contains a variable affected by a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedExport {
    /// The snapshot.
    pub export_id: ExportId,
    /// Project the snapshot was taken from.
    pub project_id: ProjectId,
    /// Where the `.env` file was written.
    pub export_path: String,
    /// When the snapshot was taken.
    pub exported_at: DateTime<Utc>,
    /// Name of the variable found in the snapshot.
    pub affected_variable: String,
    /// Git metadata recorded with the snapshot.
    pub git: Option<GitMetadata>,
}

/// Reverse-dependency analyzer over a store.
#[derive(Debug)]
pub struct ImpactAnalyzer<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> ImpactAnalyzer<'s, S> {
    /// Creates an analyzer reading from `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns the variables that link to, or concatenate, the given variable.
    ///
    /// Links match the reference exactly; concatenations match by substring.
    /// The variable itself is never listed. An unknown id yields an empty list.
    ///
    /// # Errors
    /// Returns `StoreError` if the store fails.
    pub async fn direct_dependents(&self, id: VariableId) -> Result<Vec<Variable>, StoreError> {
        let Some(variable) = self.store.variable(id).await? else {
            return Ok(Vec::new());
        };
        self.dependents_of(&variable).await
    }

    /// Returns the exports containing the variable or one of its direct dependents.
    ///
    /// Only one hop is followed. Each (export, variable) pair appears once.
    ///
    /// # Errors
    /// Returns `StoreError` if the store fails.
    pub async fn affected_exports(
        &self,
        id: VariableId,
    ) -> Result<Vec<AffectedExport>, StoreError> {
        let Some(variable) = self.store.variable(id).await? else {
            return Ok(Vec::new());
        };

        let mut candidates = vec![variable.clone()];
        candidates.extend(self.dependents_of(&variable).await?);

        let mut seen = HashSet::new();
        let mut affected = Vec::new();

        for candidate in &candidates {
            for export in self.store.exports_for_project(candidate.project_id).await? {
                let key = export.affixes.apply(&candidate.name);
                if !export.contains(&candidate.name) && !export.contains(&key) {
                    continue;
                }
                if !seen.insert((export.id, candidate.name.clone())) {
                    continue;
                }
                affected.push(AffectedExport {
                    export_id: export.id,
                    project_id: export.project_id,
                    export_path: export.export_path,
                    exported_at: export.exported_at,
                    affected_variable: candidate.name.clone(),
                    git: export.git,
                });
            }
        }

        Ok(affected)
    }

    async fn dependents_of(&self, variable: &Variable) -> Result<Vec<Variable>, StoreError> {
        let Some(project) = self.store.project(variable.project_id).await? else {
            return Ok(Vec::new());
        };
        let reference = project.reference_to(&variable.name);

        let mut dependents = self.store.variables_linked_to(&reference).await?;
        dependents.extend(self.store.variables_concatenating(&reference).await?);

        let mut seen = HashSet::new();
        dependents.retain(|dependent| dependent.id != variable.id && seen.insert(dependent.id));
        Ok(dependents)
    }
}
