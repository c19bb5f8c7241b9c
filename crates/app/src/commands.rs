//! Command handlers: resolve CLI arguments to use case calls and print results.

use anyhow::{Context, Result, anyhow, bail};
use envlink_application::ports::VariableStore;
use envlink_application::use_cases::{
    ChangeVariableType, ChangeVariableTypeInput, CheckExports, CreateProject, CreateProjectInput,
    CreateVariable, DeleteVariable, DiffExport, ExportProject, ExportProjectInput, ImpactReport,
    ResolveVariables,
};
use envlink_application::variable_resolver::ImpactAnalyzer;
use envlink_domain::{
    DiffStatus, ExportId, NameAffixes, Project, Variable, VariableDraft, render_env,
};
use envlink_infrastructure::{JsonFileVariableStore, Settings};

use crate::cli::{AffixArgs, Commands, ProjectCommand, VarCommand};

/// Runs one command against the store.
pub async fn run(command: Commands, settings: &Settings, store: &JsonFileVariableStore) -> Result<()> {
    let handler = Handler { settings, store };

    match command {
        Commands::Project(ProjectCommand::Add { name, description }) => {
            let project = CreateProject::new(store)
                .execute(CreateProjectInput { name, description })
                .await?;
            println!("Created project {} ({})", project.name, project.id);
        }
        Commands::Project(ProjectCommand::List) => {
            for project in store.projects().await? {
                match &project.description {
                    Some(description) => println!("{}\t{description}", project.name),
                    None => println!("{}", project.name),
                }
            }
        }
        Commands::Var(command) => handler.var(command).await?,
        Commands::Resolve { project, affixes } => {
            let project = handler.project(project.as_deref()).await?;
            let values = ResolveVariables::new(store)
                .project(project.id, &affixes.into_affixes())
                .await?;
            print!("{}", render_env(&values));
        }
        Commands::Dependents { project, name } => {
            let variable = handler.variable(&project, &name).await?;
            let dependents = ImpactAnalyzer::new(store)
                .direct_dependents(variable.id)
                .await?;
            for dependent in dependents {
                let owner = handler.project_name(&dependent).await?;
                println!(
                    "{owner}:{}\t{}",
                    dependent.name,
                    dependent.value.representation()
                );
            }
        }
        Commands::Impact { project, name } => handler.impact(&project, &name).await?,
        Commands::Export {
            project,
            out,
            file_name,
            affixes,
        } => {
            let project = handler.project(project.as_deref()).await?;
            let output = ExportProject::new(store)
                .execute(ExportProjectInput {
                    project_id: project.id,
                    output_dir: out,
                    file_name: file_name.unwrap_or_else(|| settings.env_file_name.clone()),
                    affixes: affixes.into_affixes(),
                    git: None,
                })
                .await?;
            println!(
                "Exported {} variables to {}",
                output.snapshot.resolved_values.len(),
                output.path.display()
            );
            println!("export {}", output.snapshot.id);
            println!("hash   {}", output.snapshot.export_hash);
        }
        Commands::Diff { export_id } => {
            let id: ExportId = export_id
                .parse()
                .with_context(|| format!("invalid export id '{export_id}'"))?;
            let output = DiffExport::new(store).execute(id).await?;
            if output.is_unchanged() {
                println!("No changes since export {id}");
            }
            for difference in &output.differences {
                let stored = difference.stored_value.as_deref().unwrap_or_default();
                let current = difference.current_value.as_deref().unwrap_or_default();
                match difference.status {
                    DiffStatus::Added => println!("+ {}={current}", difference.variable),
                    DiffStatus::Removed => println!("- {}={stored}", difference.variable),
                    DiffStatus::Modified => {
                        println!("~ {}={stored} -> {current}", difference.variable);
                    }
                }
            }
        }
        Commands::Check { project } => {
            let project = handler.project(project.as_deref()).await?;
            for status in CheckExports::new(store).execute(project.id).await? {
                let state = if status.outdated { "outdated" } else { "up to date" };
                println!(
                    "{}\t{}\t{}\t{state}",
                    status.snapshot.id,
                    status.snapshot.exported_at.format("%Y-%m-%d %H:%M:%S"),
                    status.snapshot.export_path
                );
            }
        }
    }

    Ok(())
}

struct Handler<'a> {
    settings: &'a Settings,
    store: &'a JsonFileVariableStore,
}

impl Handler<'_> {
    async fn var(&self, command: VarCommand) -> Result<()> {
        match command {
            VarCommand::Set {
                project,
                name,
                value,
                description,
            } => {
                let project = self.project(Some(&project)).await?;
                let value = value.into_value();

                match self.store.variable_by_name(project.id, &name).await? {
                    None => {
                        let mut draft = VariableDraft::new(project.id, name, value);
                        draft.description = description;
                        let variable = CreateVariable::new(self.store).execute(draft).await?;
                        println!("Created {}", project.reference_to(&variable.name));
                    }
                    Some(existing) => {
                        let variable = ChangeVariableType::new(self.store)
                            .execute(ChangeVariableTypeInput {
                                variable_id: existing.id,
                                name: None,
                                description,
                                value,
                            })
                            .await?;
                        println!("Updated {}", project.reference_to(&variable.name));
                    }
                }
            }
            VarCommand::Get { project, name } => {
                let variable = self.variable(&project, &name).await?;
                match ResolveVariables::new(self.store).variable(variable.id).await? {
                    Some(value) => println!("{value}"),
                    None => eprintln!("{project}:{name} has no value"),
                }
            }
            VarCommand::List { project } => {
                let project = self.project(project.as_deref()).await?;
                for variable in self.store.variables_in_project(project.id).await? {
                    println!(
                        "{}\t{}\t{}",
                        variable.name,
                        variable.kind(),
                        variable.value.representation()
                    );
                }
            }
            VarCommand::Rm { project, name } => {
                let variable = self.variable(&project, &name).await?;
                DeleteVariable::new(self.store).execute(variable.id).await?;
                println!("Deleted {project}:{name}");
            }
        }
        Ok(())
    }

    async fn impact(&self, project: &str, name: &str) -> Result<()> {
        let variable = self.variable(project, name).await?;
        let report = ImpactReport::new(self.store).execute(variable.id).await?;
        let summary = &report.summary;

        println!(
            "{} ({})",
            report.source_project.reference_to(&report.source.name),
            report.source.kind()
        );
        println!(
            "projects: {}  variables: {}  exports: {}  cross-project: {}",
            summary.total_projects_affected,
            summary.total_variables_affected,
            summary.total_exports_affected,
            if summary.has_cross_project_impact { "yes" } else { "no" }
        );

        for impact in &report.affected_projects {
            println!("\n[{}]", impact.project.name);
            for variable in &impact.variables {
                println!("  {}\t{}", variable.name, variable.value.representation());
            }
        }

        if !report.affected_exports.is_empty() {
            println!("\nexports:");
            for export in &report.affected_exports {
                let branch = export
                    .git
                    .as_ref()
                    .and_then(|git| git.branch.as_deref())
                    .map(|branch| format!(" ({branch})"))
                    .unwrap_or_default();
                println!(
                    "  {}\t{}\t{}{branch}",
                    export.export_id, export.affected_variable, export.export_path
                );
            }
        }

        println!();
        for recommendation in report.recommendations() {
            println!("- {recommendation}");
        }
        Ok(())
    }

    /// Looks up a project by name, falling back to the configured default.
    async fn project(&self, name: Option<&str>) -> Result<Project> {
        let name = name
            .or(self.settings.default_project.as_deref())
            .ok_or_else(|| anyhow!("no project given and no default_project configured"))?;

        self.store
            .project_by_name(name)
            .await?
            .with_context(|| format!("project '{name}' not found"))
    }

    async fn variable(&self, project: &str, name: &str) -> Result<Variable> {
        let project = self.project(Some(project)).await?;
        match self.store.variable_by_name(project.id, name).await? {
            Some(variable) => Ok(variable),
            None => bail!("variable '{}' not found", project.reference_to(name)),
        }
    }

    async fn project_name(&self, variable: &Variable) -> Result<String> {
        let project = self
            .store
            .project(variable.project_id)
            .await?
            .with_context(|| format!("project {} not found", variable.project_id))?;
        Ok(project.name)
    }
}

impl AffixArgs {
    fn into_affixes(self) -> NameAffixes {
        NameAffixes::new(self.prefix, self.suffix)
    }
}
