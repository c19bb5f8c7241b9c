//! In-memory store used by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::significant_drop_tightening)]

use std::sync::Mutex;

use async_trait::async_trait;
use envlink_domain::{
    ExportId, ExportSnapshot, Project, ProjectId, Variable, VariableId, VariableValue,
};

use crate::ports::{StoreError, VariableRepository, VariableStore, VariableTransaction};

#[derive(Debug, Clone, Default)]
pub struct State {
    pub projects: Vec<Project>,
    pub variables: Vec<Variable>,
    pub exports: Vec<ExportSnapshot>,
}

impl State {
    fn sorted(mut variables: Vec<Variable>) -> Vec<Variable> {
        variables.sort_by(|a, b| a.name.cmp(&b.name));
        variables
    }

    fn project(&self, id: ProjectId) -> Option<Project> {
        self.projects.iter().find(|p| p.id == id).cloned()
    }

    fn project_by_name(&self, name: &str) -> Option<Project> {
        self.projects.iter().find(|p| p.name == name).cloned()
    }

    fn variable(&self, id: VariableId) -> Option<Variable> {
        self.variables.iter().find(|v| v.id == id).cloned()
    }

    fn variable_by_name(&self, project_id: ProjectId, name: &str) -> Option<Variable> {
        self.variables
            .iter()
            .find(|v| v.project_id == project_id && v.name == name)
            .cloned()
    }

    fn filter(&self, predicate: impl Fn(&Variable) -> bool) -> Vec<Variable> {
        Self::sorted(self.variables.iter().filter(|v| predicate(v)).cloned().collect())
    }

    fn insert_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        if self.project(variable.project_id).is_none() {
            return Err(StoreError::NotFound(variable.project_id.to_string()));
        }
        if self.variable_by_name(variable.project_id, &variable.name).is_some() {
            return Err(StoreError::Conflict(variable.name));
        }
        self.variables.push(variable);
        Ok(())
    }
}

/// Mutex-guarded [`State`]; transactions work on a copy and write it back on commit.
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, name: &str) -> ProjectId {
        let project = Project::new(name).expect("valid project name");
        let id = project.id;
        self.state.lock().unwrap().projects.push(project);
        id
    }

    pub fn add_var(&self, project_id: ProjectId, name: &str, value: VariableValue) -> VariableId {
        let variable = Variable::new(project_id, name, value);
        let id = variable.id;
        self.state.lock().unwrap().insert_variable(variable).unwrap();
        id
    }

    pub fn add_export(&self, export: ExportSnapshot) -> ExportId {
        let id = export.id;
        self.state.lock().unwrap().exports.push(export);
        id
    }

    pub fn set_value(&self, id: VariableId, value: VariableValue) {
        let mut state = self.state.lock().unwrap();
        let variable = state.variables.iter_mut().find(|v| v.id == id).unwrap();
        variable.value = value;
    }

    pub fn get(&self, id: VariableId) -> Variable {
        self.state.lock().unwrap().variable(id).unwrap()
    }

    pub fn find(&self, project_id: ProjectId, name: &str) -> Option<Variable> {
        self.state.lock().unwrap().variable_by_name(project_id, name)
    }

    pub fn variable_count(&self) -> usize {
        self.state.lock().unwrap().variables.len()
    }

    pub fn export_count(&self) -> usize {
        self.state.lock().unwrap().exports.len()
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

macro_rules! impl_reads {
    ($ty:ty, $read:ident) => {
        #[async_trait]
        impl VariableStore for $ty {
            async fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
                Ok(self.$read(|s| s.project(id)))
            }

            async fn project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
                Ok(self.$read(|s| s.project_by_name(name)))
            }

            async fn projects(&self) -> Result<Vec<Project>, StoreError> {
                Ok(self.$read(|s| s.projects.clone()))
            }

            async fn variable(&self, id: VariableId) -> Result<Option<Variable>, StoreError> {
                Ok(self.$read(|s| s.variable(id)))
            }

            async fn variable_by_name(
                &self,
                project_id: ProjectId,
                name: &str,
            ) -> Result<Option<Variable>, StoreError> {
                Ok(self.$read(|s| s.variable_by_name(project_id, name)))
            }

            async fn variables_in_project(
                &self,
                project_id: ProjectId,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self.$read(|s| s.filter(|v| v.project_id == project_id)))
            }

            async fn variables_linked_to(
                &self,
                reference: &str,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self.$read(|s| {
                    s.filter(|v| matches!(&v.value, VariableValue::Linked(r) if r == reference))
                }))
            }

            async fn variables_concatenating(
                &self,
                fragment: &str,
            ) -> Result<Vec<Variable>, StoreError> {
                Ok(self.$read(|s| {
                    s.filter(
                        |v| matches!(&v.value, VariableValue::Concatenated(e) if e.contains(fragment)),
                    )
                }))
            }

            async fn export(&self, id: ExportId) -> Result<Option<ExportSnapshot>, StoreError> {
                Ok(self.$read(|s| s.exports.iter().find(|e| e.id == id).cloned()))
            }

            async fn exports_for_project(
                &self,
                project_id: ProjectId,
            ) -> Result<Vec<ExportSnapshot>, StoreError> {
                Ok(self.$read(|s| {
                    s.exports
                        .iter()
                        .filter(|e| e.project_id == project_id)
                        .cloned()
                        .collect()
                }))
            }
        }
    };
}

impl_reads!(FakeStore, read);
impl_reads!(FakeTransaction<'_>, read);

pub struct FakeTransaction<'a> {
    store: &'a FakeStore,
    working: State,
}

impl FakeTransaction<'_> {
    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.working)
    }
}

#[async_trait]
impl VariableTransaction for FakeTransaction<'_> {
    async fn insert_project(&mut self, project: Project) -> Result<(), StoreError> {
        if self.working.project_by_name(&project.name).is_some() {
            return Err(StoreError::Conflict(project.name));
        }
        self.working.projects.push(project);
        Ok(())
    }

    async fn insert_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        self.working.insert_variable(variable)
    }

    async fn update_variable(&mut self, variable: Variable) -> Result<(), StoreError> {
        let slot = self
            .working
            .variables
            .iter_mut()
            .find(|v| v.id == variable.id)
            .ok_or_else(|| StoreError::NotFound(variable.id.to_string()))?;
        *slot = variable;
        Ok(())
    }

    async fn delete_variable(&mut self, id: VariableId) -> Result<(), StoreError> {
        let before = self.working.variables.len();
        self.working.variables.retain(|v| v.id != id);
        if self.working.variables.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn insert_export(&mut self, export: ExportSnapshot) -> Result<(), StoreError> {
        self.working.exports.push(export);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        *self.store.state.lock().unwrap() = self.working.clone();
        Ok(())
    }
}

#[async_trait]
impl VariableRepository for FakeStore {
    async fn begin(&self) -> Result<Box<dyn VariableTransaction + '_>, StoreError> {
        let working = self.state.lock().unwrap().clone();
        Ok(Box::new(FakeTransaction {
            store: self,
            working,
        }))
    }
}
