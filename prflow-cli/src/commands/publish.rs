//! Publish command - commit pending changes and open a pull request

use clap::Args;
use prflow_core::{Settings, SystemRunner, Workspace};
use prflow_github::{GitHubClient, PublishOutcome, PublishRequest};

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Name of the branch to create for the changes
    #[arg(required = true)]
    pub branch: String,

    /// Pull request title
    #[arg(short, long)]
    pub title: String,

    /// Pull request body
    #[arg(short, long, default_value = "")]
    pub body: String,
}

impl PublishArgs {
    /// Execute the publish command, returning the process exit code
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<i32> {
        let runner = SystemRunner::new(settings.ssh_key.clone());
        let client = GitHubClient::from_settings(&settings)?;

        let workspace = Workspace::setup(settings, runner)?;

        let request = PublishRequest {
            branch: self.branch.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
        };

        let outcome = client.publish(&workspace, &request).await?;

        if let Some(pr) = outcome.pull_request() {
            println!("Pull request #{} created: {}", pr.number, pr.html_url);
        }
        match &outcome {
            PublishOutcome::Opened(_) => {}
            PublishOutcome::CreateFailed(failure) => {
                eprintln!("ERROR: Failed to create pull request");
                eprintln!("{}", failure);
            }
            PublishOutcome::ReviewersFailed { failure, .. } => {
                eprintln!("ERROR: Failed to add reviewers to the pull request");
                eprintln!("{}", failure);
            }
        }

        Ok(if outcome.is_success() { 0 } else { 1 })
    }
}
