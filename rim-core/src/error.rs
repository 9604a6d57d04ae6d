//! Error types for rim

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for rim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rim operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Git error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// The workspace has uncommitted changes
    #[error("The workspace git at {} contains uncommitted changes.", .path.display())]
    WorkspaceNotClean { path: PathBuf },

    /// Positional arguments were left over after command line parsing
    #[error("Unexpected command line arguments: {}", .0.join(" "))]
    UnexpectedArguments(Vec<String>),

    /// No module info file in the given directory
    #[error("No module info found in '{}'.", .0.display())]
    ModuleDescriptorNotFound(PathBuf),

    /// Malformed or incomplete manifest
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Malformed module info file
    #[error("Module info error: {0}")]
    InfoFile(String),

    /// Unknown resolution mode name
    #[error("Invalid resolve mode '{0}'. Expected one of: absolute, local, gerrit")]
    InvalidResolveMode(String),

    /// Two modules claim the same local path
    #[error("Duplicate module at '{}'", .0.display())]
    DuplicateModule(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
