//! Error types for prflow

use thiserror::Error;

/// Result type alias for prflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for prflow operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// libgit2 error while inspecting the checkout
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// An external command exited unsuccessfully
    #[error("Command '{command}' failed with exit code {code}")]
    Command {
        /// The command line as it was run
        command: String,
        /// Exit code of the process (1 when killed by a signal)
        code: i32,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Exit code a process should terminate with for this error
    ///
    /// Command failures propagate the child's exit code; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Command { code, .. } => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exit_code() {
        let err = Error::Command {
            command: "git pull".to_string(),
            code: 128,
            stdout: String::new(),
            stderr: "fatal: not a git repository".to_string(),
        };
        assert_eq!(err.exit_code(), 128);
        assert_eq!(
            err.to_string(),
            "Command 'git pull' failed with exit code 128"
        );
    }

    #[test]
    fn test_other_exit_code() {
        assert_eq!(Error::Config("missing".to_string()).exit_code(), 1);
    }
}
