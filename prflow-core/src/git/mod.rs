//! Git operations for prflow
//!
//! This module provides repository slug parsing, command execution and a
//! handle on the local checkout.

mod command;
pub mod ops;
mod repo;
mod slug;

pub use command::{CommandRunner, Invocation, SystemRunner};
pub use repo::GitRepo;
pub use slug::RepoSlug;
