//! Configuration management for prflow
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PRFLOW_*)
//! 3. Config file (~/.config/prflow/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::git::RepoSlug;
use crate::secrets::Secrets;
use crate::{Error, Result};

/// Default branch that review requests target
pub const DEFAULT_BRANCH: &str = "master";
/// Directory name the repository is cloned into
pub const DEFAULT_CHECKOUT_DIR: &str = "website";
/// GitHub REST API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository URL, e.g. `https://github.com/owner/repo`
    pub url: Option<String>,

    /// Directory the checkout lives in
    pub working_dir: Option<PathBuf>,

    /// Name of the checkout directory inside `working_dir`
    pub checkout_dir: String,

    /// Branch review requests are opened against
    pub default_branch: String,

    /// SSH private key loaded for clone, pull and push
    pub ssh_key: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: None,
            working_dir: None,
            checkout_dir: DEFAULT_CHECKOUT_DIR.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
            ssh_key: None,
        }
    }
}

/// Review-related configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Users requested as reviewers on every pull request
    pub reviewers: Vec<String>,
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API root
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Repository configuration
    pub repository: RepositoryConfig,

    /// Review configuration
    pub review: ReviewConfig,

    /// GitHub configuration
    pub github: GitHubConfig,
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--repo`
    pub repo: Option<String>,
    /// `--workdir`
    pub working_dir: Option<PathBuf>,
    /// `--ssh-key`
    pub ssh_key: Option<PathBuf>,
    /// `--reviewer`, repeated; empty keeps the configured list
    pub reviewers: Vec<String>,
    /// `--default-branch`
    pub default_branch: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/prflow/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prflow").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PRFLOW_REPO: Repository URL
    /// - PRFLOW_WORKDIR: Working directory
    /// - PRFLOW_SSH_KEY: SSH private key path
    /// - PRFLOW_REVIEWERS: Comma separated reviewer logins
    /// - PRFLOW_DEFAULT_BRANCH: Target branch
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("PRFLOW_REPO") {
            self.repository.url = Some(url);
        }

        if let Some(dir) = var("PRFLOW_WORKDIR") {
            self.repository.working_dir = Some(PathBuf::from(dir));
        }

        if let Some(key) = var("PRFLOW_SSH_KEY") {
            self.repository.ssh_key = Some(PathBuf::from(key));
        }

        if let Some(reviewers) = var("PRFLOW_REVIEWERS") {
            self.review.reviewers = split_list(&reviewers);
        }

        if let Some(branch) = var("PRFLOW_DEFAULT_BRANCH") {
            self.repository.default_branch = branch;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Self {
        if let Some(url) = cli.repo {
            self.repository.url = Some(url);
        }

        if let Some(dir) = cli.working_dir {
            self.repository.working_dir = Some(dir);
        }

        if let Some(key) = cli.ssh_key {
            self.repository.ssh_key = Some(key);
        }

        if !cli.reviewers.is_empty() {
            self.review.reviewers = cli.reviewers;
        }

        if let Some(branch) = cli.default_branch {
            self.repository.default_branch = branch;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base.with_env_overrides().with_cli_overrides(cli))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fully resolved settings for one run
#[derive(Clone)]
pub struct Settings {
    /// Repository the checkout tracks
    pub repo: RepoSlug,
    /// Directory holding the checkout
    pub working_dir: PathBuf,
    /// Name of the checkout directory inside `working_dir`
    pub checkout_dir: String,
    /// Branch review requests target
    pub default_branch: String,
    /// SSH private key for network git operations
    pub ssh_key: PathBuf,
    /// API token
    pub token: String,
    /// Reviewers requested on new pull requests
    pub reviewers: Vec<String>,
    /// REST API root, without trailing slash
    pub api_url: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("repo", &self.repo)
            .field("working_dir", &self.working_dir)
            .field("checkout_dir", &self.checkout_dir)
            .field("default_branch", &self.default_branch)
            .field("ssh_key", &self.ssh_key)
            .field("token", &"<redacted>")
            .field("reviewers", &self.reviewers)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Settings {
    /// Validate configuration and secrets into runnable settings
    pub fn resolve(config: &Config, secrets: &Secrets) -> Result<Self> {
        let url = config.repository.url.as_deref().ok_or_else(|| {
            Error::Config(
                "Repository URL not set. Use --repo, PRFLOW_REPO or [repository] url".to_string(),
            )
        })?;
        let repo = RepoSlug::parse(url)?;

        let working_dir = config.repository.working_dir.as_deref().ok_or_else(|| {
            Error::Config(
                "Working directory not set. Use --workdir, PRFLOW_WORKDIR or [repository] working_dir"
                    .to_string(),
            )
        })?;

        let ssh_key = config.repository.ssh_key.as_deref().ok_or_else(|| {
            Error::Config(
                "SSH key not set. Use --ssh-key, PRFLOW_SSH_KEY or [repository] ssh_key".to_string(),
            )
        })?;

        // Commands run with their own cwd, so relative paths must be pinned here
        let working_dir = absolute(working_dir)?;
        let ssh_key = absolute(ssh_key)?;

        let token = secrets.token()?;

        let checkout_dir = config.repository.checkout_dir.trim().to_string();
        if checkout_dir.is_empty() || checkout_dir.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "Invalid checkout directory name: '{}'",
                config.repository.checkout_dir
            )));
        }

        let default_branch = config.repository.default_branch.trim().to_string();
        if default_branch.is_empty() {
            return Err(Error::Config("Default branch must not be empty".to_string()));
        }

        let api_url = url::Url::parse(&config.github.api_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", config.github.api_url, e)))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API URL must be http or https: {}",
                config.github.api_url
            )));
        }

        Ok(Self {
            repo,
            working_dir,
            checkout_dir,
            default_branch,
            ssh_key,
            token,
            reviewers: config.review.reviewers.clone(),
            api_url: config.github.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path of the local checkout
    pub fn repo_dir(&self) -> PathBuf {
        self.working_dir.join(&self.checkout_dir)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| Error::Config(format!("Invalid path '{}': {}", path.display(), e)))
}
