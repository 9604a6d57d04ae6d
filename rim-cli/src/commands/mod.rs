//! CLI command implementations

pub mod check;
pub mod modules;

pub use check::CheckArgs;
pub use modules::{ManifestArgs, ModuleArgs, WorkspaceArgs};
