//! Synchronous command execution
//!
//! Every git operation is described as an [`Invocation`] and handed to a
//! [`CommandRunner`]. Arguments are always passed as a list, never through a
//! shell string, and the working directory is set per invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::{Error, Result};

/// Script run under `ssh-agent`: load the key in `$0`, then exec the real
/// command passed as the remaining positional parameters.
const SSH_AGENT_SCRIPT: &str = r#"ssh-add "$0"; exec "$@""#;

/// A single command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Directory the command runs in
    pub cwd: PathBuf,
    /// Whether the command needs the SSH key loaded (network operations)
    pub authenticated: bool,
}

impl Invocation {
    /// Create an unauthenticated invocation
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            authenticated: false,
        }
    }

    /// Mark this invocation as requiring SSH key authentication
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// Arguments without the program name, as `&str`
    pub fn arg_strs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Executes invocations, returning an error on non-zero exit
pub trait CommandRunner {
    /// Run the command to completion
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        (**self).run(invocation)
    }
}

/// Runs invocations as real subprocesses
#[derive(Debug, Clone)]
pub struct SystemRunner {
    ssh_key: PathBuf,
}

impl SystemRunner {
    /// Create a runner that loads `ssh_key` for authenticated invocations
    pub fn new(ssh_key: impl Into<PathBuf>) -> Self {
        Self {
            ssh_key: ssh_key.into(),
        }
    }

    /// Build the process for an invocation
    ///
    /// Authenticated invocations become
    /// `ssh-agent sh -c '<script>' <key> <program> <args...>`.
    pub fn build_command(&self, invocation: &Invocation) -> Command {
        let mut cmd = if invocation.authenticated {
            let mut cmd = Command::new("ssh-agent");
            cmd.arg("sh")
                .arg("-c")
                .arg(SSH_AGENT_SCRIPT)
                .arg(&self.ssh_key)
                .arg(&invocation.program)
                .args(&invocation.args);
            cmd
        } else {
            let mut cmd = Command::new(&invocation.program);
            cmd.args(&invocation.args);
            cmd
        };

        cmd.current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        debug!(
            command = %invocation,
            cwd = %invocation.cwd.display(),
            authenticated = invocation.authenticated,
            "Running command"
        );

        let output = self.build_command(invocation).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Other(format!(
                    "Failed to run '{}': executable not found",
                    invocation
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(1);
            error!(command = %invocation, code, "Command failed");
            return Err(Error::Command {
                command: invocation.to_string(),
                code,
                stdout,
                stderr,
            });
        }

        debug!(command = %invocation, %stdout, %stderr, "Command succeeded");
        Ok(())
    }
}
