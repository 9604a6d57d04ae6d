//! Module info file persisted inside each checked-out module
//!
//! The file is a plain list of `key: value` lines:
//!
//! ```text
//! # rim module info
//! remote_url: ssh://gerrit/team/lib
//! revision_sha: 3f2a9c...
//! target_revision: main
//! upstream: main
//! ignores: build/**, *.log
//! checksum: 9b1e...
//! ```

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the module info file inside a module directory
pub const INFO_FILE_NAME: &str = ".riminfo";

/// State of a module as recorded in its working copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RimInfo {
    /// Remote the module was taken from
    pub remote_url: String,
    /// Commit of the remote the module content corresponds to
    pub revision_sha: Option<String>,
    /// Revision that was requested
    pub target_revision: Option<String>,
    /// Upstream branch the module tracks
    pub upstream: String,
    /// Patterns excluded from the module
    pub ignores: Vec<String>,
    /// Checksum over the module content
    pub checksum: Option<String>,
}

impl RimInfo {
    /// Whether `dir` holds a module info file
    pub fn exists_in(dir: &Path) -> bool {
        dir.join(INFO_FILE_NAME).is_file()
    }

    /// Load the module info file from `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(INFO_FILE_NAME);
        if !path.is_file() {
            return Err(Error::ModuleDescriptorNotFound(dir.to_path_buf()));
        }
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents)
            .map_err(|e| Error::InfoFile(format!("{}: {}", path.display(), e)))
    }

    /// Write the module info file into `dir`
    pub fn to_dir(&self, dir: &Path) -> Result<()> {
        std::fs::write(dir.join(INFO_FILE_NAME), self.render())?;
        Ok(())
    }

    /// Parse the `key: value` format
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        let mut info = RimInfo::default();
        let mut remote_url = None;
        let mut upstream = None;

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| format!("line {}: expected 'key: value'", lineno + 1))?;
            let value = value.trim();

            match key.trim() {
                "remote_url" => remote_url = Some(value.to_string()),
                "upstream" => upstream = Some(value.to_string()),
                "revision_sha" => info.revision_sha = non_empty(value),
                "target_revision" => info.target_revision = non_empty(value),
                "checksum" => info.checksum = non_empty(value),
                "ignores" => info.ignores = split_ignores(value),
                // Written by newer versions
                _ => {}
            }
        }

        info.remote_url = remote_url.ok_or("missing 'remote_url'")?;
        info.upstream = upstream.ok_or("missing 'upstream'")?;
        Ok(info)
    }

    /// Render in the `key: value` format
    pub fn render(&self) -> String {
        let mut out = String::from("# rim module info\n");
        let _ = writeln!(out, "remote_url: {}", self.remote_url);
        if let Some(sha) = &self.revision_sha {
            let _ = writeln!(out, "revision_sha: {}", sha);
        }
        if let Some(target) = &self.target_revision {
            let _ = writeln!(out, "target_revision: {}", target);
        }
        let _ = writeln!(out, "upstream: {}", self.upstream);
        let _ = writeln!(out, "ignores: {}", self.ignores.join(", "));
        if let Some(checksum) = &self.checksum {
            let _ = writeln!(out, "checksum: {}", checksum);
        }
        out
    }
}

/// Split a comma separated ignore list, dropping blanks
pub fn split_ignores(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
