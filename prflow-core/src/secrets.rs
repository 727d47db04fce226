//! API token lookup
//!
//! The token comes from `GITHUB_TOKEN` when set, otherwise from
//! `~/.config/prflow/secrets.toml`. That file must not be readable by group
//! or others on Unix.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

const TOKEN_ENV: &str = "GITHUB_TOKEN";

const TEMPLATE: &str = r#"# prflow secrets - keep this file private (chmod 600)

[github]
# Token with permission to open pull requests and request reviewers
token = ""
"#;

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The `GITHUB_TOKEN` environment variable
    Env,
    /// The secrets file
    File,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Env => write!(f, "{}", TOKEN_ENV),
            TokenSource::File => write!(f, "secrets file"),
        }
    }
}

/// Contents of the secrets file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
}

/// `[github]` table of the secrets file
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubSecrets {
    pub token: Option<String>,
}

impl std::fmt::Debug for GitHubSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSecrets")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Read the default secrets file, or empty secrets when there is none
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Read a secrets file, refusing one with loose permissions
    pub fn load_from_file(path: &Path) -> Result<Self> {
        check_private(path)?;

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))
    }

    /// `~/.config/prflow/secrets.toml`
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prflow").join("secrets.toml"))
    }

    /// The token to authenticate with, or a config error naming both sources
    pub fn token(&self) -> Result<String> {
        self.lookup().map(|(token, _)| token).ok_or_else(|| {
            Error::Config(format!(
                "GitHub token not found. Set {} or add token to ~/.config/prflow/secrets.toml",
                TOKEN_ENV
            ))
        })
    }

    /// Which source would supply the token, if any
    pub fn token_source(&self) -> Option<TokenSource> {
        self.lookup().map(|(_, source)| source)
    }

    fn lookup(&self) -> Option<(String, TokenSource)> {
        self.lookup_with(std::env::var(TOKEN_ENV).ok())
    }

    fn lookup_with(&self, env_token: Option<String>) -> Option<(String, TokenSource)> {
        let from_env = env_token.map(|t| (t, TokenSource::Env));
        let from_file = self.github.token.clone().map(|t| (t, TokenSource::File));

        from_env
            .into_iter()
            .chain(from_file)
            .map(|(t, source)| (t.trim().to_string(), source))
            .find(|(t, _)| !t.is_empty())
            .inspect(|(_, source)| debug!(%source, "Using GitHub token"))
    }

    /// Write an empty secrets file at the default location
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;

        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Write an empty secrets file at `path`, mode 0600
    pub fn create_template_at(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        std::fs::write(path, TEMPLATE).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template, add a token to it");
        Ok(())
    }
}

#[cfg(unix)]
fn check_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} has insecure permissions {:o}; run chmod 600 on it",
            path.display(),
            mode
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_private(_path: &Path) -> Result<()> {
    Ok(())
}
