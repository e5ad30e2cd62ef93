//! GitHub Actions runner surface: workflow commands and step outputs.
//!
//! The runner interprets specially formatted stdout lines (`::debug::`,
//! `::error::`) and reads step outputs from the file named by the
//! `GITHUB_OUTPUT` environment variable. Everything here is plain stdout
//! and file appends; there is no logging framework between us and the
//! runner's parser.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Escape message data per the workflow-command encoding rules.
/// `%`, CR and LF would otherwise terminate or corrupt the command line.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Emit a debug line. Hidden unless the workflow enables step debug logging.
pub fn debug(message: &str) {
    println!("::debug::{}", escape_data(message));
}

/// Emit a plain informational line.
pub fn info(message: &str) {
    println!("{message}");
}

/// Emit an error annotation. The runner surfaces these in the job summary.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Publish a step output for downstream workflow steps.
///
/// Appends `name=value` to the `GITHUB_OUTPUT` file when the runner provides
/// one, falling back to the legacy `::set-output` command otherwise.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match std::env::var("GITHUB_OUTPUT") {
        Ok(path) if !path.is_empty() => write_output(Path::new(&path), name, value),
        _ => {
            println!("::set-output name={}::{}", name, escape_data(value));
            Ok(())
        }
    }
}

fn write_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file at {}", path.display()))?;
    writeln!(file, "{name}={value}")
        .with_context(|| format!("Failed to append output '{name}'"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn escape_data_encodes_percent_and_newlines() {
        assert_eq!(escape_data("50% done"), "50%25 done");
        assert_eq!(escape_data("line1\nline2"), "line1%0Aline2");
        assert_eq!(escape_data("a\r\nb"), "a%0D%0Ab");
    }

    #[test]
    fn escape_data_leaves_plain_text_alone() {
        assert_eq!(escape_data("nothing special here"), "nothing special here");
    }

    #[test]
    fn write_output_appends_name_value_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");

        write_output(&path, "project-item-id", "PVTI_abc123").unwrap();
        write_output(&path, "second", "value").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "project-item-id=PVTI_abc123\nsecond=value\n");
    }

    #[test]
    fn write_output_fails_on_unwritable_path() {
        let result = write_output(Path::new("/nonexistent-dir/output"), "k", "v");
        assert!(result.is_err());
    }
}
