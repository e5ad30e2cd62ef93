//! Integration tests for project-sync.
//!
//! These drive the compiled binary the way the Actions runner would: inputs
//! as `INPUT_*` environment variables, the event payload behind
//! `GITHUB_EVENT_PATH`, and step outputs collected in `GITHUB_OUTPUT`.
//! Every scenario here fails or finishes before any network call.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VALID_URL: &str = "https://github.com/orgs/acme/projects/7";
const VALID_TOKEN: &str = "ghp_integration_test_token";

/// Helper to create a project-sync Command with a clean action environment.
fn project_sync() -> Command {
    let mut cmd = cargo_bin_cmd!("project-sync");
    for var in [
        "INPUT_PROJECT_URL",
        "INPUT_GH_TOKEN",
        "INPUT_DEFAULT_ISSUE_STATUS",
        "INPUT_DEFAULT_PR_STATUS",
        "GITHUB_EVENT_PATH",
        "GITHUB_OUTPUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper wiring up the full set of required inputs.
fn configured(url: &str, token: &str) -> Command {
    let mut cmd = project_sync();
    cmd.env("INPUT_PROJECT_URL", url)
        .env("INPUT_GH_TOKEN", token)
        .env("INPUT_DEFAULT_ISSUE_STATUS", "Todo")
        .env("INPUT_DEFAULT_PR_STATUS", "In Review");
    cmd
}

/// Write an event payload file, returning its owning directory and path.
fn event_file(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("event.json");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        project_sync().arg("--help").assert().success();
    }

    #[test]
    fn test_version() {
        project_sync().arg("--version").assert().success();
    }

    #[test]
    fn test_missing_inputs_is_usage_error() {
        project_sync()
            .assert()
            .failure()
            .stderr(predicate::str::contains("--project-url"));
    }
}

mod input_validation {
    use super::*;

    #[test]
    fn test_malformed_token_fails_before_anything_else() {
        configured(VALID_URL, "not-a-token")
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::"))
            .stdout(predicate::str::contains("token"));
    }

    #[test]
    fn test_malformed_url_fails_without_network() {
        // An issue is present, so only URL parsing stands between the run
        // and the network; the bad URL must stop it.
        let (_dir, path) = event_file(r#"{"issue": {"node_id": "I_abc"}}"#);
        configured("https://github.com/acme/widget", VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &path)
            .assert()
            .failure()
            .stdout(predicate::str::contains("Invalid project URL"));
    }

    #[test]
    fn test_non_numeric_project_number_is_rejected() {
        let (_dir, path) = event_file(r#"{"issue": {"node_id": "I_abc"}}"#);
        configured("https://github.com/orgs/acme/projects/seven", VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &path)
            .assert()
            .failure()
            .stdout(predicate::str::contains("Invalid project URL"));
    }
}

mod event_handling {
    use super::*;

    #[test]
    fn test_event_without_issue_or_pr_succeeds_with_no_output() {
        let (_dir, event_path) = event_file(r#"{"action": "created", "comment": {"id": 1}}"#);
        let output_dir = TempDir::new().unwrap();
        let output_path = output_dir.path().join("output");

        configured(VALID_URL, VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &event_path)
            .env("GITHUB_OUTPUT", &output_path)
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to do"));

        // No project-item-id may be published for an early exit.
        let written = fs::read_to_string(&output_path).unwrap_or_default();
        assert!(!written.contains("project-item-id"));
    }

    #[test]
    fn test_empty_payload_succeeds() {
        let (_dir, event_path) = event_file("{}");
        configured(VALID_URL, VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &event_path)
            .assert()
            .success();
    }

    #[test]
    fn test_unset_event_path_behaves_like_empty_payload() {
        configured(VALID_URL, VALID_TOKEN)
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to do"));
    }

    #[test]
    fn test_unreadable_event_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist.json");
        configured(VALID_URL, VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &missing)
            .assert()
            .failure()
            .stdout(predicate::str::contains("event payload"));
    }

    #[test]
    fn test_invalid_payload_json_fails() {
        let (_dir, event_path) = event_file("not json at all");
        configured(VALID_URL, VALID_TOKEN)
            .env("GITHUB_EVENT_PATH", &event_path)
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::"));
    }
}
