//! Local change probe

use std::path::Path;

use tracing::debug;

use super::repo::GitRepo;
use crate::Result;

/// Reports whether a workspace has uncommitted changes
pub trait ChangeProbe {
    /// Whether the working tree at `root` has local changes
    fn has_local_changes(&self, root: &Path) -> Result<bool>;
}

/// Probe backed by the workspace's git repository
#[derive(Debug, Clone, Default)]
pub struct GitChangeProbe;

impl ChangeProbe for GitChangeProbe {
    fn has_local_changes(&self, root: &Path) -> Result<bool> {
        let repo = GitRepo::open(root)?;
        let changed = repo.changed_paths()?;
        if !changed.is_empty() {
            debug!(count = changed.len(), first = %changed[0], "Workspace has local changes");
        }
        Ok(!changed.is_empty())
    }
}
