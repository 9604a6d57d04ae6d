//! Rim Core - Module resolution for the rim workspace manager
//!
//! A rim workspace pulls in several independently versioned repositories
//! ("modules"). This crate turns manifests, module info files and live
//! workspace scans into one normalized set of [`ModuleInfo`] descriptors.

pub mod config;
pub mod error;
pub mod git;
pub mod helper;
pub mod info;
pub mod manifest;
pub mod module;
pub mod paths;
pub mod resolve;
pub mod scan;
pub mod sink;

pub use config::{Config, ServerConfig};
pub use error::{Error, Result};
pub use git::{ChangeProbe, GitChangeProbe, GitRepo};
pub use helper::{ModuleOverrides, ModuleResolver};
pub use info::{RimInfo, INFO_FILE_NAME};
pub use manifest::{JsonManifestReader, Manifest, ManifestModule, ManifestReader};
pub use module::ModuleInfo;
pub use resolve::{RemoteResolver, ResolveMode, GERRIT_PUSH_REF_FORMAT, GERRIT_SERVER};
pub use scan::{FsScanner, ScannedModule, WorkspaceScanner, RIM_DIR_NAME};
pub use sink::{ModuleIndex, ModuleSink, NoopSink};
