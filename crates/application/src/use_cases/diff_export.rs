//! Diff export use case.

use envlink_domain::{ExportId, ExportSnapshot, ResolvedValues, ValueDifference, diff_values};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableStore;
use crate::variable_resolver::VariableResolver;

/// Output from comparing a snapshot with the current values.
#[derive(Debug, Clone)]
pub struct DiffExportOutput {
    /// The stored snapshot.
    pub snapshot: ExportSnapshot,
    /// Current values, with the snapshot's affixes applied.
    pub current: ResolvedValues,
    /// Keys that differ, in name order.
    pub differences: Vec<ValueDifference>,
}

impl DiffExportOutput {
    /// Returns true if nothing changed since the export.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Compares a recorded export with what the project resolves to now.
pub struct DiffExport<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> DiffExport<'s, S> {
    /// Creates a new `DiffExport` use case.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Re-resolves the snapshot's project and reports differing keys.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown export.
    pub async fn execute(&self, export_id: ExportId) -> ApplicationResult<DiffExportOutput> {
        let snapshot = self
            .store
            .export(export_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("export {export_id}")))?;

        let current = VariableResolver::new(self.store)
            .resolve_all(snapshot.project_id)
            .await?;
        let current = snapshot.affixes.apply_all(&current);
        let differences = diff_values(&snapshot.resolved_values, &current);

        Ok(DiffExportOutput {
            snapshot,
            current,
            differences,
        })
    }
}
