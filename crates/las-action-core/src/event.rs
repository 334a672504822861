//! Pull-request metadata from the workflow event payload.

use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// The subset of a `pull_request` event this action reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubEvent {
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub head: Option<PullRequestHead>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestHead {
    #[serde(default)]
    pub sha: Option<String>,
}

/// Load the event referenced by `GITHUB_EVENT_PATH`.
pub fn load_event(env: &ActionEnv) -> Result<GitHubEvent> {
    let path = env
        .var_path("GITHUB_EVENT_PATH")
        .filter(|p| p.exists())
        .ok_or(ActionError::EventPathMissing)?;
    read_event(&path)
}

pub fn read_event(path: &Path) -> Result<GitHubEvent> {
    let content = std::fs::read_to_string(path).map_err(|source| ActionError::EventRead {
        path: path.to_path_buf(),
        source,
    })?;

    // A literal `null` payload is treated like an event without a pull request.
    let event: Option<GitHubEvent> =
        serde_json::from_str(&content).map_err(|source| ActionError::EventParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(event.unwrap_or_default())
}

impl GitHubEvent {
    pub fn pr_number(&self) -> Result<u64> {
        let number = self
            .pull_request
            .as_ref()
            .and_then(|pr| pr.number)
            .ok_or(ActionError::NoPullRequest)?;
        debug!("Found PR number {number}.");
        Ok(number)
    }

    pub fn head_sha(&self) -> Result<String> {
        let sha = self
            .pull_request
            .as_ref()
            .and_then(|pr| pr.head.as_ref())
            .and_then(|head| head.sha.clone())
            .filter(|sha| !sha.is_empty())
            .ok_or(ActionError::NoPullRequestHead)?;
        debug!("Found SHA {sha}.");
        Ok(sha)
    }
}
