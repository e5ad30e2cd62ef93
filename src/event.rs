//! Workflow event payload: figuring out which content node triggered us.
//!
//! The payload is an opaque webhook object. The only parts this action reads
//! are `issue.node_id` and `pull_request.node_id`; an event carrying neither
//! is simply not ours to handle and ends the run successfully.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// The content node a workflow event points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventItem {
    /// Global node ID of the issue or pull request.
    pub node_id: String,
    pub is_pull_request: bool,
}

/// The slice of a webhook payload this action cares about. All other keys
/// are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    issue: Option<ContentNode>,
    #[serde(default)]
    pull_request: Option<ContentNode>,
}

#[derive(Debug, Deserialize)]
struct ContentNode {
    #[serde(default)]
    node_id: Option<String>,
}

impl EventPayload {
    /// Extract the targeted content node, if the event has one.
    /// Issues are checked first; real payloads never carry both at top level.
    pub fn item(&self) -> Option<EventItem> {
        if let Some(node_id) = self.issue.as_ref().and_then(|n| n.node_id.clone()) {
            return Some(EventItem {
                node_id,
                is_pull_request: false,
            });
        }
        if let Some(node_id) = self.pull_request.as_ref().and_then(|n| n.node_id.clone()) {
            return Some(EventItem {
                node_id,
                is_pull_request: true,
            });
        }
        None
    }
}

/// Load the event payload the runner wrote for this job.
///
/// An unset `GITHUB_EVENT_PATH` behaves like an empty payload (matching the
/// official actions toolkit); a path that is set but unreadable is an error.
pub fn current_payload() -> Result<EventPayload> {
    match std::env::var("GITHUB_EVENT_PATH") {
        Ok(path) if !path.is_empty() => read_payload(Path::new(&path)),
        _ => Ok(EventPayload::default()),
    }
}

fn read_payload(path: &Path) -> Result<EventPayload> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse event payload at {}", path.display()))
}
