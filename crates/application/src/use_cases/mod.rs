//! Application use cases (business logic orchestration).

mod change_variable_type;
mod check_exports;
mod create_project;
mod create_variable;
mod delete_variable;
mod diff_export;
mod export_project;
mod impact_report;
mod resolve_variables;
mod update_variable;

pub use change_variable_type::*;
pub use check_exports::*;
pub use create_project::*;
pub use create_variable::*;
pub use delete_variable::*;
pub use diff_export::*;
pub use export_project::*;
pub use impact_report::*;
pub use resolve_variables::*;
pub use update_variable::*;

use envlink_domain::{Variable, VariableDraft};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableStore;
use crate::variable_resolver::{ImpactAnalyzer, ReferenceValidator};

/// Fails with `InvalidReferences` listing every violation of `draft`.
pub(crate) async fn ensure_valid<S: VariableStore + ?Sized>(
    store: &S,
    draft: &VariableDraft,
) -> ApplicationResult<()> {
    let violations = ReferenceValidator::new(store).validate(draft).await?;
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApplicationError::InvalidReferences(violations))
    }
}

/// Fails with `DanglingDependents` while anything still references `variable`.
pub(crate) async fn ensure_no_dependents<S: VariableStore + ?Sized>(
    store: &S,
    variable: &Variable,
) -> ApplicationResult<()> {
    let dependents = ImpactAnalyzer::new(store)
        .direct_dependents(variable.id)
        .await?;
    if dependents.is_empty() {
        return Ok(());
    }

    Err(ApplicationError::DanglingDependents {
        variable: variable.name.clone(),
        dependents: dependents.into_iter().map(|d| d.name).collect(),
    })
}
