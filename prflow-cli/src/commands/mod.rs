//! CLI command implementations

pub mod publish;
pub mod sync;

pub use publish::PublishArgs;
pub use sync::SyncArgs;
