//! Git command builders
//!
//! Only the operations that talk to the remote (clone, pull, push) are marked
//! authenticated; everything else runs without the SSH agent.

use std::path::Path;

use super::command::Invocation;

/// Remote that new branches are pushed to
pub const REMOTE: &str = "origin";

fn git<const N: usize>(args: [&str; N], cwd: &Path) -> Invocation {
    Invocation::new("git", args, cwd)
}

/// `git clone <url> <dest>` run from `workdir`
pub fn clone(workdir: &Path, url: &str, dest: &str) -> Invocation {
    git(["clone", url, dest], workdir).authenticated()
}

/// `git pull`
pub fn pull(repo_dir: &Path) -> Invocation {
    git(["pull"], repo_dir).authenticated()
}

/// `git checkout <branch>`
pub fn checkout(repo_dir: &Path, branch: &str) -> Invocation {
    git(["checkout", branch], repo_dir)
}

/// `git checkout -b <branch>`
pub fn checkout_new_branch(repo_dir: &Path, branch: &str) -> Invocation {
    git(["checkout", "-b", branch], repo_dir)
}

/// `git add --all`
pub fn add_all(repo_dir: &Path) -> Invocation {
    git(["add", "--all"], repo_dir)
}

/// `git commit -m <message>`
pub fn commit(repo_dir: &Path, message: &str) -> Invocation {
    git(["commit", "-m", message], repo_dir)
}

/// `git push --set-upstream origin <branch>`
pub fn push_upstream(repo_dir: &Path, branch: &str) -> Invocation {
    git(["push", "--set-upstream", REMOTE, branch], repo_dir).authenticated()
}

/// `git branch -D <branch>`
pub fn delete_branch(repo_dir: &Path, branch: &str) -> Invocation {
    git(["branch", "-D", branch], repo_dir)
}

/// Commit message used for published changes
pub fn commit_message(branch: &str) -> String {
    format!("Session update for {}", branch)
}
