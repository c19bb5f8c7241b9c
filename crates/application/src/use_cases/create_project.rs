//! Create project use case.

use envlink_domain::Project;
use tracing::info;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Unique project name, used inside references.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Use case for creating a project.
pub struct CreateProject<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> CreateProject<'r, R> {
    /// Creates a new `CreateProject` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Creates and persists a project.
    ///
    /// # Errors
    /// - `Domain` if the name cannot be used in references
    /// - `AlreadyExists` if the name is taken
    pub async fn execute(&self, input: CreateProjectInput) -> ApplicationResult<Project> {
        let mut project = Project::new(input.name)?;
        project.description = input.description;

        let mut tx = self.repository.begin().await?;
        if tx.project_by_name(&project.name).await?.is_some() {
            return Err(ApplicationError::AlreadyExists(format!(
                "project '{}'",
                project.name
            )));
        }

        tx.insert_project(project.clone()).await?;
        tx.commit().await?;

        info!(project = %project.name, "Created project");
        Ok(project)
    }
}
