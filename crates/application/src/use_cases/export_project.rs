//! Export project use case.

use std::path::PathBuf;

use envlink_domain::{ExportSnapshot, GitMetadata, NameAffixes, ProjectId, render_env};
use tracing::info;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;
use crate::variable_resolver::VariableResolver;

/// Input for exporting a project.
#[derive(Debug, Clone)]
pub struct ExportProjectInput {
    /// The project to export.
    pub project_id: ProjectId,
    /// Directory the `.env` file is written to.
    pub output_dir: PathBuf,
    /// File name inside `output_dir`.
    pub file_name: String,
    /// Transform applied to exported names.
    pub affixes: NameAffixes,
    /// Git metadata to record with the snapshot.
    pub git: Option<GitMetadata>,
}

/// Output from exporting a project.
#[derive(Debug, Clone)]
pub struct ExportProjectOutput {
    /// The recorded snapshot.
    pub snapshot: ExportSnapshot,
    /// The file that was written.
    pub path: PathBuf,
}

/// Writes a project's resolved values to a `.env` file and records a snapshot.
pub struct ExportProject<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> ExportProject<'r, R> {
    /// Creates a new `ExportProject` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Resolves, writes and records the export.
    ///
    /// # Errors
    /// - `NotFound` if the project does not exist
    /// - `NothingToExport` if no variable resolves to a value
    /// - `Io` if the file cannot be written
    pub async fn execute(&self, input: ExportProjectInput) -> ApplicationResult<ExportProjectOutput> {
        let project = self
            .repository
            .project(input.project_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("project {}", input.project_id)))?;

        let values = VariableResolver::new(self.repository)
            .resolve_all(project.id)
            .await?;
        if values.is_empty() {
            return Err(ApplicationError::NothingToExport(project.name));
        }
        let values = input.affixes.apply_all(&values);

        tokio::fs::create_dir_all(&input.output_dir).await?;
        let path = input.output_dir.join(&input.file_name);
        tokio::fs::write(&path, render_env(&values)).await?;

        let mut snapshot = ExportSnapshot::new(
            project.id,
            path.display().to_string(),
            input.affixes,
            values,
        );
        if let Some(git) = input.git {
            snapshot = snapshot.with_git(git);
        }

        let mut tx = self.repository.begin().await?;
        tx.insert_export(snapshot.clone()).await?;
        tx.commit().await?;

        info!(
            project = %project.name,
            path = %path.display(),
            variables = snapshot.resolved_values.len(),
            "Exported project"
        );
        Ok(ExportProjectOutput { snapshot, path })
    }
}
