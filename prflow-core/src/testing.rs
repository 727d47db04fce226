//! Test support: a command runner that fakes the network
//!
//! [`RecordingRunner`] records every invocation. Authenticated invocations
//! (clone, pull, push) are simulated locally; everything else is executed
//! with real `git`.

use std::path::Path;
use std::sync::Mutex;

use git2::Repository;

use crate::git::{CommandRunner, Invocation, SystemRunner};
use crate::{Error, Result};

/// Create a repository at `path` with one commit on `branch`
///
/// Committer identity is written to the repository config so that `git commit`
/// works regardless of the host's global configuration.
pub fn init_repo(path: &Path, branch: &str) -> Result<Repository> {
    std::fs::create_dir_all(path)?;
    let repo = Repository::init(path)?;
    {
        let mut config = repo.config()?;
        config.set_str("user.name", "prflow test")?;
        config.set_str("user.email", "prflow@example.com")?;
        config.set_bool("commit.gpgsign", false)?;
    }

    repo.set_head(&format!("refs/heads/{}", branch))?;
    std::fs::write(path.join("README.md"), "# site\n")?;
    {
        let mut index = repo.index()?;
        index.add_path(Path::new("README.md"))?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let sig = git2::Signature::now("prflow test", "prflow@example.com")?;
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])?;
    }

    Ok(repo)
}

/// Records invocations, simulating the ones that need the network
#[derive(Debug)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    failures: Vec<(Vec<String>, i32)>,
    local: SystemRunner,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Vec::new(),
            local: SystemRunner::new("/dev/null"),
        }
    }

    /// Fail any invocation whose arguments start with `args`, exiting `code`
    pub fn fail_on(mut self, args: &[&str], code: i32) -> Self {
        self.failures
            .push((args.iter().map(|s| s.to_string()).collect(), code));
        self
    }

    /// Every invocation seen so far, including failed ones
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Invocations rendered as command lines
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    fn simulate(&self, invocation: &Invocation) -> Result<()> {
        match invocation.arg_strs().as_slice() {
            ["clone", _url, dest] => {
                init_repo(&invocation.cwd.join(dest), "master")?;
                Ok(())
            }
            ["pull"] | ["push", ..] => Ok(()),
            other => Err(Error::Other(format!(
                "No simulation for authenticated command: {:?}",
                other
            ))),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }

        for (prefix, code) in &self.failures {
            if invocation.args.starts_with(prefix) {
                return Err(Error::Command {
                    command: invocation.to_string(),
                    code: *code,
                    stdout: String::new(),
                    stderr: "simulated failure".to_string(),
                });
            }
        }

        if invocation.authenticated {
            self.simulate(invocation)
        } else {
            self.local.run(invocation)
        }
    }
}
