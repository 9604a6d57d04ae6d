//! Git repository detection and status queries

use std::path::Path;

use git2::{Repository, Status, StatusOptions};

use crate::{Error, Result};

/// A git repository wrapper providing rim-specific operations
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("workdir", &self.repo.workdir())
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the git repository rooted at the given path
    ///
    /// Unlike discovery this does not search upward; the workspace root must
    /// be the working tree root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!(
                    "Not a git repository: {}. The workspace root must be a git working tree.",
                    path.display()
                ))
            } else {
                Error::Git(e)
            }
        })?;

        if repo.is_bare() {
            return Err(Error::Config("Bare repositories are not supported".to_string()));
        }

        Ok(Self { repo })
    }

    /// Paths with staged, unstaged or untracked changes
    ///
    /// Ignored files are not reported. Paths that are not valid UTF-8 are
    /// converted lossily.
    pub fn changed_paths(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| is_local_change(entry.status()))
            .map(|entry| String::from_utf8_lossy(entry.path_bytes()).into_owned())
            .collect())
    }

    /// Whether the working tree has any local changes
    pub fn has_local_changes(&self) -> Result<bool> {
        Ok(!self.changed_paths()?.is_empty())
    }
}

fn is_local_change(status: Status) -> bool {
    status != Status::CURRENT && !status.contains(Status::IGNORED)
}
