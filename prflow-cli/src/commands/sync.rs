//! Sync command - clone or update the checkout

use clap::Args;
use prflow_core::{CheckoutState, Settings, SystemRunner, Workspace};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub fn execute(&self, settings: Settings) -> anyhow::Result<i32> {
        let state = CheckoutState::detect(&settings);
        let runner = SystemRunner::new(settings.ssh_key.clone());

        let workspace = Workspace::setup(settings, runner)?;

        let action = match state {
            CheckoutState::Absent => "Cloned",
            CheckoutState::Present => "Updated",
        };
        println!(
            "{} {} at {} ({})",
            action,
            workspace.settings().repo,
            workspace.repo_dir().display(),
            workspace.active_branch()?
        );

        Ok(0)
    }
}
