//! Check command - Verify the workspace is ready for changes

use std::path::Path;

use clap::Args;
use rim_core::{Config, ModuleResolver, NoopSink};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Leftover arguments, rejected
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self, workspace: &Path, config: &Config) -> anyhow::Result<()> {
        let resolver = ModuleResolver::new(workspace, NoopSink)?
            .with_remote_resolver(config.remote_resolver());

        resolver.check_arguments(&self.extra)?;
        resolver.check_ready()?;

        println!("Workspace {} is clean", resolver.ws_root().display());
        Ok(())
    }
}
