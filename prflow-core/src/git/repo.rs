//! Local checkout handle

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::{Error, Result};

/// A handle on the local checkout, used to inspect its state
///
/// HEAD is re-read on every query, so the handle stays accurate after
/// external `git` commands switch branches.
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the git repository rooted at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Git(e)
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the current branch name
    ///
    /// Returns `None` for a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                // HEAD points at a branch with no commits yet
                let head = self.repo.find_reference("HEAD")?;
                return Ok(head
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(|s| s.to_string()));
            }
            Err(e) => return Err(Error::Git(e)),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Get the active branch name, failing on a detached HEAD
    pub fn active_branch(&self) -> Result<String> {
        self.current_branch()?.ok_or_else(|| {
            Error::Other(format!(
                "Repository at {} has a detached HEAD",
                self.root.display()
            ))
        })
    }

    /// Check whether a local branch exists
    #[cfg(any(test, feature = "test-support"))]
    pub fn has_local_branch(&self, name: &str) -> bool {
        self.repo
            .find_branch(name, git2::BranchType::Local)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_with_commit(path: &Path, branch: &str) -> Repository {
        let repo = Repository::init(path).unwrap();
        repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
        {
            let sig = git2::Signature::now("Test", "test@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_open_non_git_dir() {
        let dir = TempDir::new().unwrap();
        let result = GitRepo::open(dir.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_active_branch() {
        let dir = TempDir::new().unwrap();
        init_with_commit(dir.path(), "master");

        let repo = GitRepo::open(dir.path()).unwrap();
        assert_eq!(repo.active_branch().unwrap(), "master");
        assert!(repo.has_local_branch("master"));
        assert!(!repo.has_local_branch("feature-x"));
    }

    #[test]
    fn test_branch_switch_is_visible() {
        let dir = TempDir::new().unwrap();
        let raw = init_with_commit(dir.path(), "master");
        let repo = GitRepo::open(dir.path()).unwrap();

        let head = raw.head().unwrap().peel_to_commit().unwrap();
        raw.branch("feature-x", &head, false).unwrap();
        raw.set_head("refs/heads/feature-x").unwrap();

        assert_eq!(repo.active_branch().unwrap(), "feature-x");
    }

    #[test]
    fn test_unborn_branch() {
        let dir = TempDir::new().unwrap();
        let raw = Repository::init(dir.path()).unwrap();
        raw.set_head("refs/heads/master").unwrap();

        let repo = GitRepo::open(dir.path()).unwrap();
        assert_eq!(repo.current_branch().unwrap(), Some("master".to_string()));
    }

    #[test]
    fn test_detached_head() {
        let dir = TempDir::new().unwrap();
        let raw = init_with_commit(dir.path(), "master");
        let oid = raw.head().unwrap().target().unwrap();
        raw.set_head_detached(oid).unwrap();

        let repo = GitRepo::open(dir.path()).unwrap();
        assert_eq!(repo.current_branch().unwrap(), None);
        assert!(repo.active_branch().is_err());
    }
}
