//! `artifact-prune` task: CI artifact retention.
//!
//! The selection logic (age cutoff, name pattern, keep-latest-per-name) is
//! pure and lives here; listing and deletion go through `ArtifactApi`, with
//! a reqwest-backed GitHub Actions implementation wired in by the runner
//! and fakes in tests. `dryRun` computes the planned deletes without
//! invoking any delete operation.

use super::{TaskError, TaskOutcome};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtifactPruneOptions {
    /// Delete artifacts created earlier than this many days ago.
    #[serde(alias = "older-than-days")]
    pub older_than_days: Option<i64>,

    /// Retain the N most recently created artifacts per name as
    /// not-matched, regardless of age.
    #[serde(alias = "keep-latest-per-name")]
    pub keep_latest_per_name: Option<usize>,

    /// Only artifacts whose name matches this glob are candidates.
    #[serde(alias = "name-pattern")]
    pub name_pattern: Option<String>,

    /// Compute planned deletes without deleting.
    #[serde(alias = "dry-run")]
    pub dry_run: bool,

    /// `owner/repo` for the GitHub implementation.
    pub repo: Option<String>,

    /// API token for the GitHub implementation.
    pub token: Option<String>,
}

/// One listed CI artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "size_in_bytes")]
    pub size_in_bytes: u64,
}

/// Listing and deletion, kept behind a trait so the selection logic is
/// testable offline.
pub trait ArtifactApi {
    fn list(&self) -> Result<Vec<Artifact>, String>;
    fn delete(&self, id: u64) -> Result<(), String>;
}

pub fn run(api: &dyn ArtifactApi, opts: &ArtifactPruneOptions) -> Result<TaskOutcome, TaskError> {
    let artifacts = api.list().map_err(TaskError::Network)?;
    let planned = select_prunable(&artifacts, opts, Utc::now())?;

    let planned_json: Vec<_> = planned
        .iter()
        .map(|a| json!({ "id": a.id, "name": a.name, "createdAt": a.created_at.to_rfc3339() }))
        .collect();

    if opts.dry_run {
        return Ok(TaskOutcome {
            message: format!("dry run: {} planned delete(s)", planned.len()),
            payload: json!({
                "listed": artifacts.len(),
                "plannedDeletes": planned_json,
                "deleted": 0,
            }),
        });
    }

    let mut deleted = 0usize;
    for artifact in &planned {
        api.delete(artifact.id).map_err(TaskError::Network)?;
        deleted += 1;
    }

    Ok(TaskOutcome {
        message: format!("deleted {deleted} of {} listed artifact(s)", artifacts.len()),
        payload: json!({
            "listed": artifacts.len(),
            "plannedDeletes": planned_json,
            "deleted": deleted,
        }),
    })
}

/// Pure selection of prunable artifacts.
pub fn select_prunable(
    artifacts: &[Artifact],
    opts: &ArtifactPruneOptions,
    now: DateTime<Utc>,
) -> Result<Vec<Artifact>, TaskError> {
    let pattern = opts
        .name_pattern
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| TaskError::Options(format!("invalid namePattern: {e}")))?;
    let cutoff = opts.older_than_days.map(|days| now - Duration::days(days));

    // Most recent K per name are protected from any match.
    let mut protected: Vec<u64> = Vec::new();
    if let Some(keep) = opts.keep_latest_per_name {
        let mut by_name: BTreeMap<&str, Vec<&Artifact>> = BTreeMap::new();
        for artifact in artifacts {
            by_name.entry(&artifact.name).or_default().push(artifact);
        }
        for group in by_name.values_mut() {
            group.sort_by_key(|a| std::cmp::Reverse(a.created_at));
            protected.extend(group.iter().take(keep).map(|a| a.id));
        }
    }

    let selected = artifacts
        .iter()
        .filter(|a| !protected.contains(&a.id))
        .filter(|a| pattern.as_ref().is_none_or(|p| p.matches(&a.name)))
        .filter(|a| cutoff.is_none_or(|c| a.created_at < c))
        .cloned()
        .collect();
    Ok(selected)
}

// ============================================================================
// GitHub Actions implementation
// ============================================================================

/// GitHub Actions artifact API over HTTPS.
pub struct GithubArtifactApi {
    client: reqwest::blocking::Client,
    repo: String,
    token: String,
}

impl GithubArtifactApi {
    pub fn new(repo: String, token: String) -> Result<Self, TaskError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("sitewright/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TaskError::Network(format!("http client: {e}")))?;
        Ok(Self { client, repo, token })
    }
}

impl ArtifactApi for GithubArtifactApi {
    fn list(&self) -> Result<Vec<Artifact>, String> {
        #[derive(Deserialize)]
        struct Listing {
            artifacts: Vec<Artifact>,
        }
        let url = format!(
            "https://api.github.com/repos/{}/actions/artifacts?per_page=100",
            self.repo
        );
        let listing: Listing = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| format!("list artifacts: {e}"))?
            .json()
            .map_err(|e| format!("decode artifact listing: {e}"))?;
        Ok(listing.artifacts)
    }

    fn delete(&self, id: u64) -> Result<(), String> {
        let url = format!(
            "https://api.github.com/repos/{}/actions/artifacts/{id}",
            self.repo
        );
        self.client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| format!("delete artifact {id}: {e}"))?;
        Ok(())
    }
}
