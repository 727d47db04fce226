//! Local checkout setup
//!
//! A [`Workspace`] is a checkout of the configured repository positioned on
//! the default branch. Setting one up either pulls an existing checkout or
//! clones a fresh one.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Settings;
use crate::git::{ops, CommandRunner, GitRepo, Invocation};
use crate::{Error, Result};

/// Whether the checkout directory already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing at the checkout path; setup clones
    Absent,
    /// Checkout directory exists; setup pulls
    Present,
}

impl CheckoutState {
    /// Inspect the filesystem for the checkout described by `settings`
    pub fn detect(settings: &Settings) -> Self {
        if settings.repo_dir().is_dir() {
            CheckoutState::Present
        } else {
            CheckoutState::Absent
        }
    }
}

/// A ready checkout plus the runner used to operate on it
pub struct Workspace<R> {
    settings: Settings,
    runner: R,
    repo: GitRepo,
    repo_dir: PathBuf,
}

impl<R> std::fmt::Debug for Workspace<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("settings", &self.settings)
            .field("repo_dir", &self.repo_dir)
            .finish_non_exhaustive()
    }
}

impl<R: CommandRunner> Workspace<R> {
    /// Clone or update the checkout and leave it on the default branch
    ///
    /// Any failing command aborts setup with that command's error.
    pub fn setup(settings: Settings, runner: R) -> Result<Self> {
        if !settings.working_dir.is_dir() {
            return Err(Error::Config(format!(
                "Working directory does not exist: {}",
                settings.working_dir.display()
            )));
        }

        let repo_dir = settings.repo_dir();

        match CheckoutState::detect(&settings) {
            CheckoutState::Present => {
                info!(path = %repo_dir.display(), "Pulling repository");
                runner.run(&ops::checkout(&repo_dir, &settings.default_branch))?;
                runner.run(&ops::pull(&repo_dir))?;
            }
            CheckoutState::Absent => {
                let url = settings.repo.ssh_url();
                info!(%url, path = %repo_dir.display(), "Cloning repository");
                runner.run(&ops::clone(&settings.working_dir, &url, &settings.checkout_dir))?;
            }
        }

        runner.run(&ops::checkout(&repo_dir, &settings.default_branch))?;

        let repo = GitRepo::open(&repo_dir)?;

        Ok(Self {
            settings,
            runner,
            repo,
            repo_dir,
        })
    }

    /// Run a command through this workspace's runner
    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        self.runner.run(invocation)
    }

    /// Name of the branch currently checked out
    pub fn active_branch(&self) -> Result<String> {
        self.repo.active_branch()
    }
}

impl<R> Workspace<R> {
    /// Settings this workspace was set up with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle on the local checkout
    #[cfg(any(test, feature = "test-support"))]
    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    /// Path of the local checkout
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// The runner commands go through
    pub fn runner(&self) -> &R {
        &self.runner
    }
}
