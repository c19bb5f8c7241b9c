//! The full contents of a variable store.

use std::collections::BTreeMap;

use envlink_application::ports::StoreError;
use envlink_domain::{
    ExportId, ExportSnapshot, Project, ProjectId, Variable, VariableId, VariableValue,
};
use serde::{Deserialize, Serialize};

/// Every project, variable and export snapshot, keyed by id.
///
/// This is also the on-disk document of [`JsonFileVariableStore`](super::JsonFileVariableStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Projects by id.
    #[serde(default)]
    pub projects: BTreeMap<ProjectId, Project>,

    /// Variables by id.
    #[serde(default)]
    pub variables: BTreeMap<VariableId, Variable>,

    /// Export snapshots by id.
    #[serde(default)]
    pub exports: BTreeMap<ExportId, ExportSnapshot>,
}

impl StoreState {
    /// Returns the project with this id.
    #[must_use]
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    /// Returns the project with this name.
    #[must_use]
    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.values().find(|p| p.name == name)
    }

    /// Returns all projects ordered by name.
    #[must_use]
    pub fn projects_by_name(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    /// Returns the variable with this id.
    #[must_use]
    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(&id)
    }

    /// Returns the variable named `name` in the project.
    #[must_use]
    pub fn variable_by_name(&self, project_id: ProjectId, name: &str) -> Option<&Variable> {
        self.variables
            .values()
            .find(|v| v.project_id == project_id && v.name == name)
    }

    /// Returns the variables matching `predicate`, ordered by name.
    pub fn variables_where(&self, predicate: impl Fn(&Variable) -> bool) -> Vec<Variable> {
        let mut variables: Vec<Variable> = self
            .variables
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));
        variables
    }

    /// Returns linked variables whose reference equals `reference`.
    #[must_use]
    pub fn linked_to(&self, reference: &str) -> Vec<Variable> {
        self.variables_where(|v| matches!(&v.value, VariableValue::Linked(r) if r == reference))
    }

    /// Returns concatenated variables whose expression contains `fragment`.
    #[must_use]
    pub fn concatenating(&self, fragment: &str) -> Vec<Variable> {
        self.variables_where(
            |v| matches!(&v.value, VariableValue::Concatenated(e) if e.contains(fragment)),
        )
    }

    /// Returns the exports of a project, oldest first.
    #[must_use]
    pub fn exports_for_project(&self, project_id: ProjectId) -> Vec<ExportSnapshot> {
        let mut exports: Vec<ExportSnapshot> = self
            .exports
            .values()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect();
        exports.sort_by(|a, b| a.exported_at.cmp(&b.exported_at).then(a.id.cmp(&b.id)));
        exports
    }

    /// Adds a project.
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the id or name is taken.
    pub fn insert_project(&mut self, project: Project) -> Result<(), StoreError> {
        if self.projects.contains_key(&project.id) || self.project_by_name(&project.name).is_some()
        {
            return Err(StoreError::Conflict(format!("project '{}'", project.name)));
        }
        self.projects.insert(project.id, project);
        Ok(())
    }

    /// Adds a variable.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` for an unknown project, or
    /// `StoreError::Conflict` if the id or the name within the project is taken.
    pub fn insert_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        if self.project(variable.project_id).is_none() {
            return Err(StoreError::NotFound(format!("project {}", variable.project_id)));
        }
        if self.variables.contains_key(&variable.id)
            || self
                .variable_by_name(variable.project_id, &variable.name)
                .is_some()
        {
            return Err(StoreError::Conflict(format!("variable '{}'", variable.name)));
        }
        self.variables.insert(variable.id, variable);
        Ok(())
    }

    /// Replaces a variable.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` for an unknown id, or
    /// `StoreError::Conflict` if a rename collides with another variable.
    pub fn update_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        if !self.variables.contains_key(&variable.id) {
            return Err(StoreError::NotFound(format!("variable {}", variable.id)));
        }
        if self
            .variable_by_name(variable.project_id, &variable.name)
            .is_some_and(|other| other.id != variable.id)
        {
            return Err(StoreError::Conflict(format!("variable '{}'", variable.name)));
        }
        self.variables.insert(variable.id, variable);
        Ok(())
    }

    /// Removes a variable.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` for an unknown id.
    pub fn delete_variable(&mut self, id: VariableId) -> Result<(), StoreError> {
        self.variables
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("variable {id}")))
    }

    /// Records an export snapshot.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` for an unknown project.
    pub fn insert_export(&mut self, export: ExportSnapshot) -> Result<(), StoreError> {
        if self.project(export.project_id).is_none() {
            return Err(StoreError::NotFound(format!("project {}", export.project_id)));
        }
        self.exports.insert(export.id, export);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state_with_project(name: &str) -> (StoreState, ProjectId) {
        let mut state = StoreState::default();
        let project = Project::new(name).unwrap();
        let id = project.id;
        state.insert_project(project).unwrap();
        (state, id)
    }

    #[test]
    fn test_project_name_unique() {
        let (mut state, _) = state_with_project("api");
        let err = state.insert_project(Project::new("api").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_variable_name_unique_per_project() {
        let (mut state, api) = state_with_project("api");
        let web = Project::new("web").unwrap();
        let web_id = web.id;
        state.insert_project(web).unwrap();

        state
            .insert_variable(Variable::new(api, "HOST", VariableValue::raw("a")))
            .unwrap();
        state
            .insert_variable(Variable::new(web_id, "HOST", VariableValue::raw("b")))
            .unwrap();

        let err = state
            .insert_variable(Variable::new(api, "HOST", VariableValue::raw("c")))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_variable_requires_project() {
        let mut state = StoreState::default();
        let err = state
            .insert_variable(Variable::new(ProjectId::new(), "A", VariableValue::Empty))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_rename_collision() {
        let (mut state, p) = state_with_project("p");
        let a = Variable::new(p, "A", VariableValue::raw("1"));
        state.insert_variable(a.clone()).unwrap();
        state
            .insert_variable(Variable::new(p, "B", VariableValue::raw("2")))
            .unwrap();

        let mut renamed = a.clone();
        renamed.name = "B".into();
        assert!(matches!(
            state.update_variable(renamed).unwrap_err(),
            StoreError::Conflict(_)
        ));

        let mut same_name = a;
        same_name.value = VariableValue::raw("3");
        state.update_variable(same_name).unwrap();
    }

    #[test]
    fn test_reverse_lookups() {
        let (mut state, p) = state_with_project("p");
        for (name, value) in [
            ("L", VariableValue::linked("p:A")),
            ("LL", VariableValue::linked("p:AB")),
            ("C", VariableValue::concatenated(r#""p:AB"-x"#)),
            ("R", VariableValue::raw("p:A")),
        ] {
            state.insert_variable(Variable::new(p, name, value)).unwrap();
        }

        let linked: Vec<String> = state.linked_to("p:A").into_iter().map(|v| v.name).collect();
        let concat: Vec<String> = state
            .concatenating("p:A")
            .into_iter()
            .map(|v| v.name)
            .collect();

        assert_eq!(linked, vec!["L"]);
        assert_eq!(concat, vec!["C"]);
    }

    #[test]
    fn test_serde_document_shape() {
        let (mut state, p) = state_with_project("p");
        state
            .insert_variable(Variable::new(p, "A", VariableValue::linked("q:B")))
            .unwrap();

        let json = serde_json::to_value(&state).unwrap();
        let variable = json["variables"].as_object().unwrap().values().next().unwrap();
        assert_eq!(variable["value"]["type"], "linked");
        assert_eq!(variable["value"]["value"], "q:B");

        let restored: StoreState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }
}
