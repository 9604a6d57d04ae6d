//! Resolved module descriptors

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A module with its remote fully resolved
///
/// `remote_url` is absolute and `local_path` is relative to the workspace
/// root. Descriptors are only built by [`crate::ModuleResolver`], which
/// enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleInfo {
    /// Absolute remote URL
    pub remote_url: String,
    /// Location of the module relative to the workspace root
    pub local_path: PathBuf,
    /// Revision to check out
    pub target_revision: String,
    /// Patterns excluded from the module
    pub ignores: Vec<String>,
    /// Push-ref format, e.g. `refs/for/%s` for review server remotes
    pub remote_branch_format: Option<String>,
}

impl ModuleInfo {
    /// Create a descriptor from already resolved parts
    pub fn new(
        remote_url: impl Into<String>,
        local_path: impl Into<PathBuf>,
        target_revision: impl Into<String>,
        ignores: Vec<String>,
        remote_branch_format: Option<String>,
    ) -> Self {
        Self {
            remote_url: remote_url.into(),
            local_path: local_path.into(),
            target_revision: target_revision.into(),
            ignores,
            remote_branch_format,
        }
    }

    /// Location of the module relative to the workspace root
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Remote ref to push `branch` to
    ///
    /// Server remotes get the push-ref format applied, anything else pushes
    /// straight to the branch.
    pub fn push_ref(&self, branch: &str) -> String {
        match &self.remote_branch_format {
            Some(format) => format.replace("%s", branch),
            None => branch.to_string(),
        }
    }
}
