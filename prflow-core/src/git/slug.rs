//! Repository slug parsing

use std::fmt;

use crate::{Error, Result};

const GITHUB_HOST: &str = "github.com";
const GITHUB_HTTPS_PREFIX: &str = "https://github.com/";

/// An `owner/repo` pair on a hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Host (e.g., "github.com")
    pub host: String,
}

impl RepoSlug {
    /// Parse a repository URL or shorthand
    ///
    /// Supports:
    /// - `https://github.com/owner/repo` (the prefix is stripped verbatim)
    /// - `https://github.com/owner/repo.git`
    /// - `git@github.com:owner/repo.git`
    /// - `owner/repo` (assumes GitHub)
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(path) = input.strip_prefix(GITHUB_HTTPS_PREFIX) {
            return Self::from_path(input, GITHUB_HOST, path);
        }

        // git@host:owner/repo.git
        if let Some(rest) = input.strip_prefix("git@") {
            if let Some((host, path)) = rest.split_once(':') {
                return Self::from_path(input, host, path);
            }
        }

        if !input.contains("://") && !input.contains('@') {
            return Self::from_path(input, GITHUB_HOST, input);
        }

        Err(invalid(input))
    }

    fn from_path(input: &str, host: &str, path: &str) -> Result<Self> {
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        match path.split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() && !host.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    host: host.to_string(),
                })
            }
            _ => Err(invalid(input)),
        }
    }

    /// The `owner/repo` form used in API paths
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// SSH clone URL, e.g. `git@github.com:owner/repo.git`
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}/{}.git", self.host, self.owner, self.repo)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn invalid(input: &str) -> Error {
    Error::Config(format!(
        "Invalid repository URL: {}. Expected format: owner/repo, https://github.com/owner/repo, or git@github.com:owner/repo.git",
        input
    ))
}
