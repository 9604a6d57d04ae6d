//! Git operations for rim
//!
//! This module provides repository access and the local change probe used by
//! the readiness check.

mod probe;
mod repo;

pub use probe::{ChangeProbe, GitChangeProbe};
pub use repo::GitRepo;

#[cfg(test)]
pub(crate) use repo::test_support;
