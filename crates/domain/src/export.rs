//! Export snapshots: resolved `name -> value` maps captured at a point in time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::id::{ExportId, ProjectId};

/// A resolved `name -> value` map, ordered by name.
pub type ResolvedValues = BTreeMap<String, String>;

/// Cosmetic name transform applied to exported variable names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAffixes {
    /// Prepended to every name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Appended to every name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl NameAffixes {
    /// Creates affixes from optional prefix and suffix. Empty strings count as unset.
    #[must_use]
    pub fn new(prefix: Option<String>, suffix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            suffix: suffix.filter(|s| !s.is_empty()),
        }
    }

    /// Returns the exported form of `name`.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        format!(
            "{}{name}{}",
            self.prefix.as_deref().unwrap_or_default(),
            self.suffix.as_deref().unwrap_or_default()
        )
    }

    /// Applies the transform to every key of `values`.
    #[must_use]
    pub fn apply_all(&self, values: &ResolvedValues) -> ResolvedValues {
        values
            .iter()
            .map(|(name, value)| (self.apply(name), value.clone()))
            .collect()
    }
}

/// Git metadata recorded alongside an export. Captured by the caller; opaque here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitMetadata {
    /// Repository root.
    pub repo_path: Option<String>,
    /// Checked-out branch.
    pub branch: Option<String>,
    /// HEAD commit hash.
    pub commit_hash: Option<String>,
    /// Remote URL.
    pub remote_url: Option<String>,
}

/// A persisted export of a project's resolved variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    /// Unique identifier.
    pub id: ExportId,
    /// Exported project.
    pub project_id: ProjectId,
    /// Where the export was written.
    pub export_path: String,
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    /// Name transform used for this export.
    #[serde(default)]
    pub affixes: NameAffixes,
    /// Final (affixed) names mapped to their resolved values.
    pub resolved_values: ResolvedValues,
    /// Hash of `resolved_values`, see [`values_hash`].
    pub export_hash: String,
    /// Git metadata, when the export target was inside a repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitMetadata>,
}

impl ExportSnapshot {
    /// Creates a snapshot and computes its hash.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        export_path: impl Into<String>,
        affixes: NameAffixes,
        resolved_values: ResolvedValues,
    ) -> Self {
        let export_hash = values_hash(&resolved_values);
        Self {
            id: ExportId::new(),
            project_id,
            export_path: export_path.into(),
            exported_at: Utc::now(),
            affixes,
            resolved_values,
            export_hash,
            git: None,
        }
    }

    /// Attaches git metadata.
    #[must_use]
    pub fn with_git(mut self, git: GitMetadata) -> Self {
        self.git = Some(git);
        self
    }

    /// Returns true if the snapshot contains `name` as a key.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolved_values.contains_key(name)
    }

    /// Returns true if `current` (already affixed) differs from what was exported.
    /// An empty current map is never considered outdated.
    #[must_use]
    pub fn is_outdated(&self, current: &ResolvedValues) -> bool {
        !current.is_empty() && values_hash(current) != self.export_hash
    }
}

/// SHA-256 hex digest over the compact JSON encoding of `values` (keys sorted).
#[must_use]
pub fn values_hash(values: &ResolvedValues) -> String {
    let mut hasher = Sha256::new();
    // A map of strings always serializes.
    let json = serde_json::to_string(values).unwrap_or_default();
    hasher.update(json.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Renders values as `.env` text, one `NAME=value` line per entry.
#[must_use]
pub fn render_env(values: &ResolvedValues) -> String {
    values
        .iter()
        .map(|(name, value)| format!("{name}={value}\n"))
        .collect()
}

/// How a key differs between a stored export and the current values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    /// Present now, absent in the export.
    Added,
    /// Present in the export, absent now.
    Removed,
    /// Present in both with different values.
    Modified,
}

/// One differing key between a stored export and current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDifference {
    /// The (affixed) variable name.
    pub variable: String,
    /// Value recorded in the export.
    pub stored_value: Option<String>,
    /// Value resolved now.
    pub current_value: Option<String>,
    /// Kind of change.
    pub status: DiffStatus,
}

/// Compares stored and current maps, returning differing keys in name order.
#[must_use]
pub fn diff_values(stored: &ResolvedValues, current: &ResolvedValues) -> Vec<ValueDifference> {
    let keys: BTreeSet<&String> = stored.keys().chain(current.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let stored_value = stored.get(key);
            let current_value = current.get(key);
            let status = match (stored_value, current_value) {
                (Some(s), Some(c)) if s == c => return None,
                (Some(_), Some(_)) => DiffStatus::Modified,
                (None, Some(_)) => DiffStatus::Added,
                (Some(_), None) => DiffStatus::Removed,
                (None, None) => return None,
            };
            Some(ValueDifference {
                variable: key.clone(),
                stored_value: stored_value.cloned(),
                current_value: current_value.cloned(),
                status,
            })
        })
        .collect()
}
