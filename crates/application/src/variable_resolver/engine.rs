//! Variable resolution engine
//!
//! Turns a variable's stored shape into its final string value, following
//! links and concatenations across projects.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use envlink_domain::{ProjectId, ResolvedValues, Variable, VariableId, VariableValue};
use tracing::{debug, warn};

use super::parser::{Concatenation, ParseError, ReferenceToken, VariableRef, parse_concatenation};
use crate::ports::{StoreError, VariableStore};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur while resolving a variable.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A stored reference does not follow the `PROJECT:VAR` grammar.
    #[error("malformed reference: {0}")]
    MalformedReference(String),

    /// A reference names a project that does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// A reference names a variable that does not exist.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// The variable depends on itself, directly or transitively.
    #[error("circular reference detected for variable {0}")]
    CircularReference(String),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// The variable resolution engine.
///
/// Every top-level call builds its own [`ResolutionSession`], so nothing is
/// cached between calls and concurrent calls share only the store.
#[derive(Debug)]
pub struct VariableResolver<'s, S: ?Sized> {
    store: &'s S,
}

impl<S: ?Sized> Clone for VariableResolver<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for VariableResolver<'_, S> {}

impl<'s, S: VariableStore + ?Sized> VariableResolver<'s, S> {
    /// Creates a resolver reading from `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolves a single variable by id.
    ///
    /// Returns `Ok(None)` when the variable is empty or resolves to nothing.
    ///
    /// # Errors
    /// Returns `ResolveError::VariableNotFound` for an unknown id, and any
    /// resolution failure of the variable or its dependencies.
    pub async fn resolve(&self, id: VariableId) -> ResolveResult<Option<String>> {
        let variable = self
            .store
            .variable(id)
            .await?
            .ok_or_else(|| ResolveError::VariableNotFound(id.to_string()))?;

        self.resolve_variable(&variable).await
    }

    /// Resolves an already loaded variable.
    ///
    /// # Errors
    /// Returns any resolution failure of the variable or its dependencies.
    pub async fn resolve_variable(&self, variable: &Variable) -> ResolveResult<Option<String>> {
        ResolutionSession::new(self.store).resolve_one(variable).await
    }

    /// Resolves every variable of a project into a `name -> value` map.
    ///
    /// Resolution is best-effort: a variable that fails to resolve is logged
    /// and left out, and variables resolving to nothing are omitted.
    ///
    /// # Errors
    /// Only store failures abort the whole call.
    pub async fn resolve_all(&self, project_id: ProjectId) -> ResolveResult<ResolvedValues> {
        let variables = self.store.variables_in_project(project_id).await?;
        let mut session = ResolutionSession::new(self.store);
        let mut resolved = ResolvedValues::new();

        for variable in &variables {
            match session.resolve_one(variable).await {
                Ok(Some(value)) => {
                    resolved.insert(variable.name.clone(), value);
                }
                Ok(None) => {}
                Err(ResolveError::Store(error)) => return Err(error.into()),
                Err(error) => {
                    warn!(variable = %variable.name, %error, "Failed to resolve variable");
                }
            }
        }

        debug!(
            project = %project_id,
            resolved = resolved.len(),
            total = variables.len(),
            "Resolved project variables"
        );
        Ok(resolved)
    }
}

/// State of one top-level resolution call.
///
/// `memo` holds values already produced in this session; `in_progress` holds
/// the variables on the current descent path and is only used to detect cycles.
pub struct ResolutionSession<'s, S: ?Sized> {
    store: &'s S,
    memo: HashMap<VariableId, String>,
    in_progress: HashSet<VariableId>,
}

impl<'s, S: VariableStore + ?Sized> ResolutionSession<'s, S> {
    /// Creates an empty session.
    #[must_use]
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Resolves `variable`, reusing values produced earlier in this session.
    pub fn resolve_one<'a>(
        &'a mut self,
        variable: &'a Variable,
    ) -> BoxFuture<'a, ResolveResult<Option<String>>> {
        Box::pin(async move {
            if let Some(value) = self.memo.get(&variable.id) {
                return Ok(Some(value.clone()));
            }

            if !self.in_progress.insert(variable.id) {
                return Err(ResolveError::CircularReference(variable.name.clone()));
            }

            let outcome = self.evaluate(variable).await;
            self.in_progress.remove(&variable.id);

            let value = outcome?;
            if let Some(value) = &value {
                self.memo.insert(variable.id, value.clone());
            }
            Ok(value)
        })
    }

    async fn evaluate(&mut self, variable: &Variable) -> ResolveResult<Option<String>> {
        match &variable.value {
            VariableValue::Raw(value) => Ok(Some(value.clone())),
            VariableValue::Linked(reference) => {
                let reference = VariableRef::parse(reference)
                    .map_err(|_| ResolveError::MalformedReference(reference.clone()))?;
                let target = self.lookup(&reference).await?;
                self.resolve_one(&target).await
            }
            VariableValue::Concatenated(expression) => match parse_concatenation(expression) {
                Ok(Concatenation::Quoted(tokens)) => self.splice(expression, &tokens).await,
                Ok(Concatenation::Legacy(references)) => self.join(&references).await,
                Err(ParseError::EmptyExpression) => Ok(None),
                Err(ParseError::MalformedReference(text)) => {
                    Err(ResolveError::MalformedReference(text))
                }
            },
            VariableValue::Empty => Ok(None),
        }
    }

    /// Replaces each quoted token with its target's value, keeping every other byte.
    /// Tokens whose target resolves to nothing stay as written.
    async fn splice(
        &mut self,
        expression: &str,
        tokens: &[ReferenceToken],
    ) -> ResolveResult<Option<String>> {
        let mut result = String::with_capacity(expression.len());
        let mut last_end = 0;

        for token in tokens {
            result.push_str(&expression[last_end..token.span.start]);

            let target = self.lookup(&token.reference).await?;
            match self.resolve_one(&target).await? {
                Some(value) => result.push_str(&value),
                None => result.push_str(&expression[token.span.clone()]),
            }

            last_end = token.span.end;
        }

        result.push_str(&expression[last_end..]);
        Ok(Some(result))
    }

    /// Concatenates target values with nothing between them.
    async fn join(&mut self, references: &[VariableRef]) -> ResolveResult<Option<String>> {
        let mut parts = Vec::with_capacity(references.len());

        for reference in references {
            let target = self.lookup(reference).await?;
            if let Some(value) = self.resolve_one(&target).await? {
                parts.push(value);
            }
        }

        Ok((!parts.is_empty()).then(|| parts.concat()))
    }

    async fn lookup(&self, reference: &VariableRef) -> ResolveResult<Variable> {
        let project = self
            .store
            .project_by_name(&reference.project)
            .await?
            .ok_or_else(|| ResolveError::ProjectNotFound(reference.project.clone()))?;

        self.store
            .variable_by_name(project.id, &reference.variable)
            .await?
            .ok_or_else(|| ResolveError::VariableNotFound(reference.to_string()))
    }
}
