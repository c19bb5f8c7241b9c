//! Change variable type use case.

use envlink_domain::{Variable, VariableDraft, VariableId, VariableValue, validate_variable_name};
use tracing::info;

use super::{UpdateVariable, UpdateVariableInput, ensure_no_dependents, ensure_valid};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::VariableRepository;

/// Input for changing a variable's kind.
#[derive(Debug, Clone)]
pub struct ChangeVariableTypeInput {
    /// The variable to reshape.
    pub variable_id: VariableId,
    /// Name for the recreated variable; the current name when unset.
    pub name: Option<String>,
    /// Description for the recreated variable; the current one when unset.
    pub description: Option<String>,
    /// The new value.
    pub value: VariableValue,
}

/// Use case for changing the kind of a variable.
///
/// A different kind is applied by deleting the variable and creating a new
/// one (new id) in the same transaction. The same kind is a plain update.
pub struct ChangeVariableType<'r, R: ?Sized> {
    repository: &'r R,
}

impl<'r, R: VariableRepository + ?Sized> ChangeVariableType<'r, R> {
    /// Creates a new `ChangeVariableType` use case.
    #[must_use]
    pub const fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Applies the new value, recreating the variable when its kind changes.
    ///
    /// # Errors
    /// - `NotFound` if the variable does not exist
    /// - `InvalidReferences` listing every reference violation of the new value
    /// - `DanglingDependents` if other variables reference it
    /// - `AlreadyExists` if the new name is taken
    pub async fn execute(&self, input: ChangeVariableTypeInput) -> ApplicationResult<Variable> {
        let mut tx = self.repository.begin().await?;
        let current = tx
            .variable(input.variable_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {}", input.variable_id)))?;

        if current.kind() == input.value.kind() {
            drop(tx);
            return UpdateVariable::new(self.repository)
                .execute(UpdateVariableInput {
                    variable_id: input.variable_id,
                    name: input.name,
                    description: input.description,
                    value: Some(input.value),
                })
                .await;
        }

        let draft = VariableDraft {
            project_id: current.project_id,
            name: input.name.unwrap_or_else(|| current.name.clone()),
            description: input.description.or_else(|| current.description.clone()),
            value: input.value,
        };

        validate_variable_name(&draft.name)?;
        if draft.name != current.name
            && tx
                .variable_by_name(current.project_id, &draft.name)
                .await?
                .is_some()
        {
            return Err(ApplicationError::AlreadyExists(draft.name));
        }

        ensure_no_dependents(&*tx, &current).await?;

        // Validated without the old shape, so a link back to itself is unknown.
        tx.delete_variable(current.id).await?;
        ensure_valid(&*tx, &draft).await?;

        let replacement = Variable::from_draft(draft);
        tx.insert_variable(replacement.clone()).await?;
        tx.commit().await?;

        info!(
            variable = %replacement.name,
            from = %current.kind(),
            to = %replacement.kind(),
            "Changed variable type"
        );
        Ok(replacement)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::FakeStore;
    use crate::variable_resolver::ValidationError;
    use envlink_domain::{VariableKind, VariableValue as V};
    use pretty_assertions::assert_eq;

    fn change(id: VariableId, value: VariableValue) -> ChangeVariableTypeInput {
        ChangeVariableTypeInput {
            variable_id: id,
            name: None,
            description: None,
            value,
        }
    }

    #[tokio::test]
    async fn test_change_recreates_with_new_id() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        store.add_var(p, "a", V::raw("1"));
        let b = store.add_var(p, "b", V::raw("2"));

        let changed = ChangeVariableType::new(&store)
            .execute(change(b, V::linked("P:a")))
            .await
            .unwrap();

        assert_ne!(changed.id, b);
        assert_eq!(changed.name, "b");
        assert_eq!(changed.kind(), VariableKind::Linked);
        assert_eq!(store.find(p, "b").unwrap().id, changed.id);
        assert_eq!(store.variable_count(), 2);
    }

    #[tokio::test]
    async fn test_change_with_rename() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::raw("1"));

        let changed = ChangeVariableType::new(&store)
            .execute(ChangeVariableTypeInput {
                name: Some("nothing".into()),
                ..change(a, V::Empty)
            })
            .await
            .unwrap();

        assert_eq!(changed.name, "nothing");
        assert!(store.find(p, "a").is_none());
    }

    #[tokio::test]
    async fn test_same_kind_updates_in_place() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::raw("1"));

        let changed = ChangeVariableType::new(&store)
            .execute(change(a, V::raw("2")))
            .await
            .unwrap();

        assert_eq!(changed.id, a);
        assert_eq!(store.get(a).value, V::raw("2"));
    }

    #[tokio::test]
    async fn test_blocked_by_dependents() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::raw("1"));
        store.add_var(p, "l", V::linked("P:a"));

        let err = ChangeVariableType::new(&store)
            .execute(change(a, V::Empty))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::DanglingDependents { ref dependents, .. } if dependents == &["l"]
        ));
        assert_eq!(store.get(a).value, V::raw("1"));
    }

    #[tokio::test]
    async fn test_invalid_new_shape_leaves_variable_untouched() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::raw("1"));

        let err = ChangeVariableType::new(&store)
            .execute(change(a, V::linked("Q:x")))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidReferences(_)));
        assert_eq!(store.get(a).kind(), VariableKind::Raw);
    }

    #[tokio::test]
    async fn test_link_to_itself_is_rejected() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::raw("1"));

        let err = ChangeVariableType::new(&store)
            .execute(change(a, V::linked("P:a")))
            .await
            .unwrap_err();

        match err {
            ApplicationError::InvalidReferences(violations) => assert_eq!(
                violations,
                vec![ValidationError::VariableNotFound("P:a".into())]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.get(a).value, V::raw("1"));
        assert_eq!(store.variable_count(), 1);
    }

    #[tokio::test]
    async fn test_link_to_own_new_name_is_rejected() {
        let store = FakeStore::new();
        let p = store.add_project("P");
        let a = store.add_var(p, "a", V::concatenated("P:a"));

        let err = ChangeVariableType::new(&store)
            .execute(ChangeVariableTypeInput {
                name: Some("b".into()),
                ..change(a, V::linked("P:a"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidReferences(_)));
        assert_eq!(store.get(a).name, "a");
    }
}
