//! Discovery of modules already checked out in a workspace

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::info::RimInfo;
use crate::Result;

/// Directory at the workspace root that marks a rim managed workspace
pub const RIM_DIR_NAME: &str = ".rim";

/// A module found in the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedModule {
    /// Module directory relative to the workspace root
    pub dir: PathBuf,
    /// Contents of its module info file
    pub info: RimInfo,
}

/// Source of live modules for a workspace
pub trait WorkspaceScanner {
    /// List the modules checked out under `root`
    fn scan(&self, root: &Path) -> Result<Vec<ScannedModule>>;
}

/// Finds modules by walking the workspace for module info files
///
/// A directory holding a module info file is a module; the walk does not
/// descend into it. `.git` and `.rim` directories are skipped.
#[derive(Debug, Clone, Default)]
pub struct FsScanner;

impl WorkspaceScanner for FsScanner {
    fn scan(&self, root: &Path) -> Result<Vec<ScannedModule>> {
        let mut modules = Vec::new();
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry during scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name();
            if name == ".git" || name == RIM_DIR_NAME {
                walker.skip_current_dir();
                continue;
            }

            if RimInfo::exists_in(entry.path()) {
                let info = RimInfo::from_dir(entry.path())?;
                let dir = entry
                    .path()
                    .strip_prefix(root)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                debug!(dir = %dir.display(), "Found module");
                modules.push(ScannedModule { dir, info });
                walker.skip_current_dir();
            }
        }

        Ok(modules)
    }
}
