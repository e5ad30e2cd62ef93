//! Typed error hierarchy for the project-sync action.
//!
//! Two top-level enums cover the two failure surfaces:
//! - `GatewayError` — GraphQL transport and API-level failures
//! - `SyncError` — everything the sync flow itself can reject
//!
//! Callers match on variants instead of inspecting message strings; the
//! binary's top-level handler is the only place errors are flattened to text.

use thiserror::Error;

/// Failures from the GraphQL gateway. Opaque to the sync flow: it propagates
/// them unmodified and never retries.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("GraphQL request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GraphQL API error: {message}")]
    Api { message: String },

    #[error("Malformed GraphQL response ({context})")]
    MalformedResponse { context: String },
}

/// Failures from the sync flow proper.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid project URL: {url}")]
    InvalidUrl { url: String },

    #[error("GitHub token is empty or not a recognized token format")]
    InvalidCredential,

    #[error("Project {number} not found for '{owner}' (does not exist, or token lacks access)")]
    ProjectNotFound { owner: String, number: u32 },

    #[error("Project not initialized; init() must succeed before item operations")]
    Uninitialized,

    #[error("Status '{name}' not found: the project has no 'Status' field or no option by that name")]
    UnknownStatus { name: String },

    #[error("Project item ID mismatch: expected '{expected}', got '{actual}'")]
    StatusUpdateMismatch { expected: String, actual: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
