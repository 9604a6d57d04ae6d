//! Destinations for resolved modules
//!
//! Every descriptor produced by [`crate::ModuleResolver`] is handed to a
//! [`ModuleSink`]. The sink decides what to do with it; returning an error
//! aborts the current pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::module::ModuleInfo;
use crate::{Error, Result};

/// Receives each resolved module
pub trait ModuleSink {
    /// Accept one module; the default drops it
    fn accept(&mut self, module: ModuleInfo) -> Result<()> {
        let _ = module;
        Ok(())
    }
}

/// Sink that discards every module
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ModuleSink for NoopSink {}

impl ModuleSink for Vec<ModuleInfo> {
    fn accept(&mut self, module: ModuleInfo) -> Result<()> {
        self.push(module);
        Ok(())
    }
}

impl<F> ModuleSink for F
where
    F: FnMut(ModuleInfo) -> Result<()>,
{
    fn accept(&mut self, module: ModuleInfo) -> Result<()> {
        self(module)
    }
}

/// Modules indexed by local path, rejecting duplicates
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: BTreeMap<PathBuf, ModuleInfo>,
}

impl ModuleIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the module at `local_path`
    pub fn get(&self, local_path: impl AsRef<Path>) -> Option<&ModuleInfo> {
        self.modules.get(local_path.as_ref())
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules ordered by local path
    pub fn iter(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values()
    }

    /// Consume the index, yielding modules ordered by local path
    pub fn into_modules(self) -> Vec<ModuleInfo> {
        self.modules.into_values().collect()
    }
}

impl ModuleSink for ModuleIndex {
    fn accept(&mut self, module: ModuleInfo) -> Result<()> {
        if self.modules.contains_key(&module.local_path) {
            return Err(Error::DuplicateModule(module.local_path));
        }
        self.modules.insert(module.local_path.clone(), module);
        Ok(())
    }
}
