//! prflow GitHub - pull request publishing
//!
//! This crate talks to the GitHub REST API to open pull requests and request
//! reviewers, and drives the full publish workflow on a prepared checkout.

mod client;
mod error;
mod publish;

pub use client::{CreatedPullRequest, GitHubClient, NewPullRequest};
pub use error::{ApiFailure, ApiResult, Error, Result};
pub use publish::{PublishOutcome, PublishRequest};
