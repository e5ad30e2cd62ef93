use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use project_sync::config::ActionConfig;
use project_sync::event;
use project_sync::gateway::GitHubGateway;
use project_sync::project::{DefaultStatus, Project};
use project_sync::workflow;

#[tokio::main]
async fn main() {
    let config = ActionConfig::parse();
    if let Err(err) = run(config).await {
        workflow::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(config: ActionConfig) -> Result<()> {
    config.validate()?;

    let gateway = Arc::new(GitHubGateway::new(&config.gh_token));
    let mut project = Project::new(
        gateway,
        &config.project_url,
        DefaultStatus {
            issues: config.default_issue_status.clone(),
            prs: config.default_pr_status.clone(),
        },
    )?;
    let desc = project.descriptor();
    workflow::debug(&format!(
        "Working with project '{}' from '{}'",
        desc.number, desc.owner
    ));

    // Events without an issue or PR are not ours; succeed without output.
    let Some(item) = event::current_payload()?.item() else {
        workflow::info("Event payload carries no issue or pull request; nothing to do");
        return Ok(());
    };

    project.init().await?;
    let project_item_id = project
        .add_to_project(&item.node_id, item.is_pull_request)
        .await?;
    workflow::set_output("project-item-id", &project_item_id)?;
    Ok(())
}
