//! Module listing commands - manifest, module directory and workspace

use std::path::{Path, PathBuf};

use clap::Args;
use rim_core::info::split_ignores;
use rim_core::{Config, ModuleInfo, ModuleOverrides, ModuleResolver, ResolveMode};

/// Arguments for the manifest command
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub file: PathBuf,

    /// Print modules as JSON
    #[arg(long)]
    pub json: bool,

    /// Leftover arguments, rejected
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl ManifestArgs {
    /// Execute the manifest command
    pub fn execute(&self, workspace: &Path, config: &Config) -> anyhow::Result<()> {
        let mut resolver = resolver(workspace, config)?;
        resolver.check_arguments(&self.extra)?;

        resolver.modules_from_manifest(&self.file)?;
        print_modules(resolver.sink(), self.json)
    }
}

/// Arguments for the module command
#[derive(Args, Debug)]
pub struct ModuleArgs {
    /// Module directory (relative to the current directory)
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Remote to use instead of the recorded one
    #[arg(long)]
    pub remote_url: Option<String>,

    /// How to resolve the remote: absolute, local or gerrit
    #[arg(long, value_parser = parse_resolve_mode)]
    pub resolve_mode: Option<ResolveMode>,

    /// Revision to use instead of the recorded upstream
    #[arg(long)]
    pub target_revision: Option<String>,

    /// Comma separated ignore patterns to use instead of the recorded ones
    #[arg(long)]
    pub ignores: Option<String>,

    /// Print modules as JSON
    #[arg(long)]
    pub json: bool,

    /// Leftover arguments, rejected
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl ModuleArgs {
    /// Execute the module command
    pub fn execute(&self, workspace: &Path, config: &Config) -> anyhow::Result<()> {
        let mut resolver = resolver(workspace, config)?;
        resolver.check_arguments(&self.extra)?;

        let overrides = ModuleOverrides {
            remote_url: self.remote_url.clone(),
            resolve_mode: self.resolve_mode,
            target_revision: self.target_revision.clone(),
            ignores: self.ignores.as_deref().map(split_ignores),
        };
        resolver.module_from_path(&self.dir, &overrides)?;
        print_modules(resolver.sink(), self.json)
    }
}

/// Arguments for the workspace command
#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    /// Print modules as JSON
    #[arg(long)]
    pub json: bool,

    /// Leftover arguments, rejected
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl WorkspaceArgs {
    /// Execute the workspace command
    pub fn execute(&self, workspace: &Path, config: &Config) -> anyhow::Result<()> {
        let mut resolver = resolver(workspace, config)?;
        resolver.check_arguments(&self.extra)?;

        if !resolver.modules_from_workspace()? {
            println!(
                "{} is not a rim workspace (no .rim directory)",
                resolver.ws_root().display()
            );
            return Ok(());
        }
        print_modules(resolver.sink(), self.json)
    }
}

fn resolver(workspace: &Path, config: &Config) -> anyhow::Result<ModuleResolver<Vec<ModuleInfo>>> {
    Ok(ModuleResolver::new(workspace, Vec::new())?.with_remote_resolver(config.remote_resolver()))
}

fn parse_resolve_mode(value: &str) -> Result<ResolveMode, String> {
    value.parse().map_err(|e: rim_core::Error| e.to_string())
}

fn print_modules(modules: &[ModuleInfo], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(modules)?);
        return Ok(());
    }

    if modules.is_empty() {
        println!("No modules.");
        return Ok(());
    }

    for module in modules {
        print!("{}", describe_module(module));
    }
    Ok(())
}

fn describe_module(module: &ModuleInfo) -> String {
    let mut out = format!("{}\n", module.local_path.display());
    out.push_str(&format!("  remote:   {}\n", module.remote_url));
    out.push_str(&format!("  revision: {}\n", module.target_revision));
    if !module.ignores.is_empty() {
        out.push_str(&format!("  ignores:  {}\n", module.ignores.join(", ")));
    }
    if module.remote_branch_format.is_some() {
        out.push_str(&format!(
            "  push to:  {}\n",
            module.push_ref(&module.target_revision)
        ));
    }
    out
}
