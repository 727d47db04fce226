//! prflow core - configuration, git operations and checkout setup
//!
//! This crate provides everything needed to get a local checkout of the
//! configured repository onto its default branch, and to run git commands
//! against it.

pub mod config;
pub mod error;
pub mod git;
pub mod secrets;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{CliOverrides, Config, Settings};
pub use error::{Error, Result};
pub use git::{CommandRunner, GitRepo, Invocation, RepoSlug, SystemRunner};
pub use secrets::{Secrets, TokenSource};
pub use workspace::{CheckoutState, Workspace};
