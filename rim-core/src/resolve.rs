//! Remote URL resolution
//!
//! A manifest or module info file may name its remote as an absolute URL,
//! a path on the default review server, or a path on the local filesystem.
//! [`RemoteResolver`] turns any of these into the absolute URL that every
//! later git operation uses, and derives the push-ref format from it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;
use url::Url;

use crate::paths::{expand_from_cwd, expand_path};
use crate::{Error, Result};

/// Default review server that relative remotes are resolved against
pub const GERRIT_SERVER: &str = "ssh://gerrit/";

/// Push-ref format used for remotes on the review server
pub const GERRIT_PUSH_REF_FORMAT: &str = "refs/for/%s";

/// How a raw remote reference is expanded into an absolute URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Use the raw value unchanged
    Absolute,
    /// Resolve against the process working directory
    Local,
    /// Resolve against the review server
    #[default]
    DefaultServer,
}

impl ResolveMode {
    /// Canonical name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMode::Absolute => "absolute",
            ResolveMode::Local => "local",
            ResolveMode::DefaultServer => "gerrit",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(ResolveMode::Absolute),
            "local" => Ok(ResolveMode::Local),
            "gerrit" | "server" => Ok(ResolveMode::DefaultServer),
            _ => Err(Error::InvalidResolveMode(s.to_string())),
        }
    }
}

/// Resolves raw remotes against the configured review server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResolver {
    server_url: String,
    push_ref_format: String,
}

impl Default for RemoteResolver {
    fn default() -> Self {
        Self::new(GERRIT_SERVER)
    }
}

impl RemoteResolver {
    /// Create a resolver for the given server prefix
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            push_ref_format: GERRIT_PUSH_REF_FORMAT.to_string(),
        }
    }

    /// Use a different push-ref format for server remotes
    pub fn with_push_ref_format(mut self, format: impl Into<String>) -> Self {
        self.push_ref_format = format.into();
        self
    }

    /// The server prefix relative remotes are resolved against
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The push-ref format reported for server remotes
    pub fn push_ref_format(&self) -> &str {
        &self.push_ref_format
    }

    /// Expand `remote` into an absolute URL according to `mode`
    ///
    /// `Absolute` does not check that the value really is absolute; whatever
    /// was given is passed on as is.
    pub fn resolve(&self, remote: &str, mode: ResolveMode) -> Result<String> {
        let resolved = match mode {
            ResolveMode::Absolute => remote.to_string(),
            ResolveMode::Local => path_string(&expand_from_cwd(Path::new(remote))?),
            ResolveMode::DefaultServer => self.resolve_against_server(remote)?,
        };

        debug!(remote, mode = %mode, resolved = %resolved, "Resolved remote URL");
        Ok(resolved)
    }

    /// Push-ref format for an already resolved URL
    ///
    /// Only remotes on the review server get one.
    pub fn branch_format(&self, remote_url: &str) -> Option<String> {
        if remote_url.starts_with(&self.server_url) {
            Some(self.push_ref_format.clone())
        } else {
            None
        }
    }

    fn resolve_against_server(&self, remote: &str) -> Result<String> {
        match Url::parse(&self.server_url) {
            Ok(base) => Ok(base.join(remote)?.to_string()),
            // Server configured as a plain directory
            Err(_) => {
                let base = expand_from_cwd(Path::new(&self.server_url))?;
                Ok(path_string(&expand_path(Path::new(remote), &base)))
            }
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
