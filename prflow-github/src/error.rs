//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
///
/// These are fatal. A rejected API call is reported as an [`ApiFailure`]
/// instead, so the caller can still clean up.
#[derive(Error, Debug)]
pub enum Error {
    /// Git or configuration error from the core crate
    #[error(transparent)]
    Core(#[from] prflow_core::Error),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Exit code a process should terminate with for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Core(e) => e.exit_code(),
            _ => 1,
        }
    }
}

/// A GitHub API call that did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The API answered with something other than 201 Created
    #[error("GitHub API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never got a response
    #[error("GitHub API request failed: {0}")]
    Transport(String),

    /// A 201 response whose body could not be understood
    #[error("Unexpected GitHub API response: {0}")]
    Parse(String),
}

/// Result of a single API call
pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_passes_through_command_failures() {
        let err = Error::from(prflow_core::Error::Command {
            command: "git push".to_string(),
            code: 128,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(err.exit_code(), 128);
        assert_eq!(Error::Auth("bad".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_api_failure_display() {
        let failure = ApiFailure::Status {
            status: 422,
            body: "{\"message\":\"Validation Failed\"}".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "GitHub API returned 422: {\"message\":\"Validation Failed\"}"
        );
    }
}
