//! Manifest reading
//!
//! A manifest lists the modules of a workspace:
//!
//! ```json
//! {
//!   "remote_url": "ssh://gerrit/",
//!   "modules": [
//!     { "remote_path": "team/lib", "local_path": "ext/lib",
//!       "target_revision": "main", "ignores": ["build/**"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::info::split_ignores;
use crate::{Error, Result};

/// A module as declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestModule {
    /// Remote, possibly relative to the manifest's base
    pub remote_path: String,
    /// Location of the module in the workspace
    pub local_path: String,
    /// Revision to check out
    pub target_revision: String,
    /// Patterns excluded from the module
    #[serde(default, deserialize_with = "deserialize_ignores")]
    pub ignores: Vec<String>,
}

/// Parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    /// Base remote declared by the manifest
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Modules in declaration order
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
}

impl Manifest {
    /// Base remote, treating an empty string as undeclared
    pub fn base_remote(&self) -> Option<&str> {
        self.remote_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Source of manifests
pub trait ManifestReader {
    /// Read and parse the manifest at `path`
    fn read(&self, path: &Path) -> Result<Manifest>;
}

/// Reads JSON manifests from disk
#[derive(Debug, Clone, Default)]
pub struct JsonManifestReader;

impl JsonManifestReader {
    /// Parse manifest JSON
    pub fn parse(contents: &str) -> Result<Manifest> {
        serde_json::from_str(contents).map_err(|e| Error::Manifest(e.to_string()))
    }
}

impl ManifestReader for JsonManifestReader {
    fn read(&self, path: &Path) -> Result<Manifest> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))
    }
}

/// Accepts either a list of patterns or one comma separated string
fn deserialize_ignores<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ignores {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Ignores::deserialize(deserializer)? {
        Ignores::List(list) => list,
        Ignores::Joined(joined) => split_ignores(&joined),
    })
}
