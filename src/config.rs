//! Invocation inputs for one action run.
//!
//! GitHub Actions passes `with:` inputs to the process as `INPUT_<NAME>`
//! environment variables (uppercased, dashes replaced by underscores). The
//! same values can be given as command-line flags for local runs.

use clap::Parser;

use crate::errors::SyncError;

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Inputs for one invocation, resolved before anything touches the network.
#[derive(Debug, Parser)]
#[command(name = "project-sync")]
#[command(version, about = "Sync issues and pull requests onto a GitHub Projects (v2) board")]
pub struct ActionConfig {
    /// Target project board URL, e.g. https://github.com/orgs/acme/projects/7
    #[arg(long, env = "INPUT_PROJECT_URL")]
    pub project_url: String,

    /// GitHub token with access to the project
    #[arg(long, env = "INPUT_GH_TOKEN", hide_env_values = true)]
    pub gh_token: String,

    /// Status assigned to issues added to the board
    #[arg(long, env = "INPUT_DEFAULT_ISSUE_STATUS")]
    pub default_issue_status: String,

    /// Status assigned to pull requests added to the board
    #[arg(long, env = "INPUT_DEFAULT_PR_STATUS")]
    pub default_pr_status: String,
}

impl ActionConfig {
    /// Reject empty or unrecognizable credentials up front; the GraphQL API
    /// would only report them as opaque 401s after a round trip.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !is_valid_github_token(&self.gh_token) {
            return Err(SyncError::InvalidCredential);
        }
        Ok(())
    }
}

/// Validate that a string looks like a GitHub token based on its prefix.
///
/// This performs a format check only — it does not verify the token is
/// active or has appropriate scopes.
pub fn is_valid_github_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token(token: &str) -> ActionConfig {
        ActionConfig {
            project_url: "https://github.com/orgs/acme/projects/7".to_string(),
            gh_token: token.to_string(),
            default_issue_status: "Todo".to_string(),
            default_pr_status: "In Progress".to_string(),
        }
    }

    // ── is_valid_github_token ────────────────────────────────────────

    #[test]
    fn test_valid_personal_access_token_classic() {
        assert!(is_valid_github_token("ghp_abc123def456"));
    }

    #[test]
    fn test_valid_fine_grained_pat() {
        assert!(is_valid_github_token("github_pat_abc123def456"));
    }

    #[test]
    fn test_valid_app_server_token() {
        assert!(is_valid_github_token("ghs_xyz789"));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        assert!(!is_valid_github_token(""));
    }

    #[test]
    fn test_random_string_is_invalid() {
        assert!(!is_valid_github_token("not-a-token"));
    }

    #[test]
    fn test_uppercase_prefix_is_invalid() {
        assert!(!is_valid_github_token("GHP_abc123"));
    }

    // ── validate ─────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_known_prefix() {
        assert!(config_with_token("ghp_abc123").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let err = config_with_token("").validate().unwrap_err();
        assert!(matches!(err, SyncError::InvalidCredential));
    }

    #[test]
    fn test_validate_rejects_malformed_token() {
        let err = config_with_token("hunter2").validate().unwrap_err();
        assert!(matches!(err, SyncError::InvalidCredential));
    }

    // ── clap parsing ─────────────────────────────────────────────────

    #[test]
    fn test_parse_from_command_line_flags() {
        let config = ActionConfig::try_parse_from([
            "project-sync",
            "--project-url",
            "https://github.com/users/jane/projects/3",
            "--gh-token",
            "ghp_token",
            "--default-issue-status",
            "Todo",
            "--default-pr-status",
            "In Review",
        ])
        .unwrap();
        assert_eq!(config.project_url, "https://github.com/users/jane/projects/3");
        assert_eq!(config.default_pr_status, "In Review");
    }

    #[test]
    fn test_parse_fails_without_required_inputs() {
        assert!(ActionConfig::try_parse_from(["project-sync"]).is_err());
    }
}
