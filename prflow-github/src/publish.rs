//! Publishing local changes as a pull request
//!
//! Git failures abort immediately and propagate as [`Error`]. API failures
//! are recorded in the [`PublishOutcome`] and the local branch is still
//! cleaned up.

use crate::{ApiFailure, CreatedPullRequest, GitHubClient, NewPullRequest, Result};
use prflow_core::git::ops;
use prflow_core::{CommandRunner, Workspace};
use tracing::{error, info};

/// What to publish
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// New local branch holding the changes
    pub branch: String,
    /// Pull request title
    pub title: String,
    /// Pull request body
    pub body: String,
}

/// How a publish attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// PR opened and reviewers (if any) requested
    Opened(CreatedPullRequest),
    /// The PR could not be created
    CreateFailed(ApiFailure),
    /// The PR exists but requesting reviewers failed
    ReviewersFailed {
        /// The pull request that was opened
        pull_request: CreatedPullRequest,
        /// Why the reviewer request failed
        failure: ApiFailure,
    },
}

impl PublishOutcome {
    /// True only when every API call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Opened(_))
    }

    /// The created pull request, if there is one
    pub fn pull_request(&self) -> Option<&CreatedPullRequest> {
        match self {
            PublishOutcome::Opened(pr) => Some(pr),
            PublishOutcome::ReviewersFailed { pull_request, .. } => Some(pull_request),
            PublishOutcome::CreateFailed(_) => None,
        }
    }
}

impl GitHubClient {
    /// Commit all pending changes on a new branch, push it and open a PR
    ///
    /// Steps:
    /// 1. `git checkout -b <branch>`, `git add --all`, commit, push
    /// 2. Create the PR against the default branch
    /// 3. Request the configured reviewers
    /// 4. Check out the default branch and delete the local branch
    pub async fn publish<R: CommandRunner>(
        &self,
        workspace: &Workspace<R>,
        request: &PublishRequest,
    ) -> Result<PublishOutcome> {
        let dir = workspace.repo_dir();
        let settings = workspace.settings();

        workspace.run(&ops::checkout_new_branch(dir, &request.branch))?;
        info!(branch = %request.branch, "Checked out branch");

        workspace.run(&ops::add_all(dir))?;

        // Read back from the checkout rather than trusting the request
        let head = workspace.active_branch()?;
        workspace.run(&ops::commit(dir, &ops::commit_message(&head)))?;
        workspace.run(&ops::push_upstream(dir, &head))?;

        let new_pr = NewPullRequest {
            title: request.title.clone(),
            body: request.body.clone(),
            head,
            base: settings.default_branch.clone(),
        };

        let outcome = match self.create_pull_request(&new_pr).await {
            Err(failure) => {
                error!(%failure, "Failed to create pull request");
                PublishOutcome::CreateFailed(failure)
            }
            Ok(pull_request) if settings.reviewers.is_empty() => {
                PublishOutcome::Opened(pull_request)
            }
            Ok(pull_request) => {
                match self
                    .request_reviewers(pull_request.number, &settings.reviewers)
                    .await
                {
                    Ok(()) => PublishOutcome::Opened(pull_request),
                    Err(failure) => {
                        error!(%failure, number = pull_request.number, "Failed to add reviewers to the pull request");
                        PublishOutcome::ReviewersFailed {
                            pull_request,
                            failure,
                        }
                    }
                }
            }
        };

        workspace.run(&ops::checkout(dir, &settings.default_branch))?;
        workspace.run(&ops::delete_branch(dir, &request.branch))?;
        info!(branch = %request.branch, "Deleted local branch");

        Ok(outcome)
    }
}
