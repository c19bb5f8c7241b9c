//! Impact report use case.

use std::collections::BTreeMap;

use envlink_domain::{Project, ProjectId, Variable, VariableId};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableStore;
use crate::variable_resolver::{AffectedExport, ImpactAnalyzer};

/// Dependents of the source variable that live in one project.
#[derive(Debug, Clone)]
pub struct ProjectImpact {
    /// The project.
    pub project: Project,
    /// Its variables that reference the source, ordered by name.
    pub variables: Vec<Variable>,
}

/// Headline numbers of an impact report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactSummary {
    /// Number of projects with at least one dependent.
    pub total_projects_affected: usize,
    /// Number of direct dependents.
    pub total_variables_affected: usize,
    /// Number of (export, variable) hits.
    pub total_exports_affected: usize,
    /// True when a dependent lives outside the source's project.
    pub has_cross_project_impact: bool,
}

/// What would be affected by changing a variable.
#[derive(Debug, Clone)]
pub struct ImpactReportOutput {
    /// The variable being analyzed.
    pub source: Variable,
    /// The project owning it.
    pub source_project: Project,
    /// Direct dependents grouped by project, ordered by project name.
    pub affected_projects: Vec<ProjectImpact>,
    /// Exports containing the source or a direct dependent.
    pub affected_exports: Vec<AffectedExport>,
    /// Headline numbers.
    pub summary: ImpactSummary,
}

impl ImpactReportOutput {
    /// Advice matching the report, one line each.
    #[must_use]
    pub fn recommendations(&self) -> Vec<&'static str> {
        let summary = &self.summary;
        vec![
            "Review all affected variables before making changes",
            if summary.total_projects_affected > 1 {
                "Consider the impact on other projects"
            } else {
                "Impact is contained within current project"
            },
            if summary.total_exports_affected > 0 {
                "Update affected exports after changes"
            } else {
                "No exports will be affected"
            },
            if summary.total_variables_affected > 0 {
                "Test dependent variables after making changes"
            } else {
                "No dependent variables found"
            },
        ]
    }
}

/// Builds an advisory report of what a change to a variable would touch.
pub struct ImpactReport<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: VariableStore + ?Sized> ImpactReport<'s, S> {
    /// Creates a new `ImpactReport` use case.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Builds the report.
    ///
    /// # Errors
    /// Returns `NotFound` if the variable or its project does not exist.
    pub async fn execute(&self, id: VariableId) -> ApplicationResult<ImpactReportOutput> {
        let source = self
            .store
            .variable(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {id}")))?;
        let source_project = self
            .store
            .project(source.project_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("project {}", source.project_id)))?;

        let analyzer = ImpactAnalyzer::new(self.store);
        let dependents = analyzer.direct_dependents(id).await?;
        let affected_exports = analyzer.affected_exports(id).await?;
        let total_variables_affected = dependents.len();

        let mut grouped: BTreeMap<ProjectId, Vec<Variable>> = BTreeMap::new();
        for dependent in dependents {
            grouped.entry(dependent.project_id).or_default().push(dependent);
        }

        let mut affected_projects = Vec::with_capacity(grouped.len());
        for (project_id, mut variables) in grouped {
            let Some(project) = self.store.project(project_id).await? else {
                continue;
            };
            variables.sort_by(|a, b| a.name.cmp(&b.name));
            affected_projects.push(ProjectImpact { project, variables });
        }
        affected_projects.sort_by(|a, b| a.project.name.cmp(&b.project.name));

        let summary = ImpactSummary {
            total_projects_affected: affected_projects.len(),
            total_variables_affected,
            total_exports_affected: affected_exports.len(),
            has_cross_project_impact: affected_projects
                .iter()
                .any(|impact| impact.project.id != source_project.id),
        };

        Ok(ImpactReportOutput {
            source,
            source_project,
            affected_projects,
            affected_exports,
            summary,
        })
    }
}
