//! Module resolution for rim commands
//!
//! [`ModuleResolver`] collects modules from one of three places: a manifest,
//! a single module directory, or a scan of the modules already present in
//! the workspace. Each module is normalized into a [`ModuleInfo`] (absolute
//! remote, workspace relative local path, push-ref format) and handed to the
//! resolver's [`ModuleSink`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::git::{ChangeProbe, GitChangeProbe};
use crate::info::RimInfo;
use crate::manifest::{JsonManifestReader, ManifestReader};
use crate::module::ModuleInfo;
use crate::paths::{expand_from_cwd, relative_path};
use crate::resolve::{RemoteResolver, ResolveMode};
use crate::scan::{FsScanner, WorkspaceScanner, RIM_DIR_NAME};
use crate::sink::{ModuleSink, NoopSink};
use crate::{Error, Result};

/// Values that replace what a module's info file says
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleOverrides {
    /// Remote to use instead of the recorded one
    pub remote_url: Option<String>,
    /// How to resolve the remote; the review server when unset
    pub resolve_mode: Option<ResolveMode>,
    /// Revision to use instead of the recorded upstream
    pub target_revision: Option<String>,
    /// Ignore patterns to use instead of the recorded ones
    pub ignores: Option<Vec<String>>,
}

/// Turns manifests, module directories and workspaces into modules
pub struct ModuleResolver<S: ModuleSink = NoopSink> {
    ws_root: PathBuf,
    remotes: RemoteResolver,
    sink: S,
    manifest_reader: Box<dyn ManifestReader>,
    scanner: Box<dyn WorkspaceScanner>,
    probe: Box<dyn ChangeProbe>,
}

impl<S: ModuleSink + std::fmt::Debug> std::fmt::Debug for ModuleResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("ws_root", &self.ws_root)
            .field("remotes", &self.remotes)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl<S: ModuleSink> ModuleResolver<S> {
    /// Create a resolver for the workspace at `ws_root`
    ///
    /// A relative `ws_root` is taken relative to the working directory.
    pub fn new(ws_root: impl AsRef<Path>, sink: S) -> Result<Self> {
        Ok(Self {
            ws_root: expand_from_cwd(ws_root.as_ref())?,
            remotes: RemoteResolver::default(),
            sink,
            manifest_reader: Box::new(JsonManifestReader),
            scanner: Box::new(FsScanner),
            probe: Box::new(GitChangeProbe),
        })
    }

    /// Feed already known modules to the sink
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleInfo>) -> Result<Self> {
        for module in modules {
            self.sink.accept(module)?;
        }
        Ok(self)
    }

    /// Use a different remote resolver (e.g. another review server)
    pub fn with_remote_resolver(mut self, remotes: RemoteResolver) -> Self {
        self.remotes = remotes;
        self
    }

    /// Use a different manifest reader
    pub fn with_manifest_reader(mut self, reader: impl ManifestReader + 'static) -> Self {
        self.manifest_reader = Box::new(reader);
        self
    }

    /// Use a different workspace scanner
    pub fn with_scanner(mut self, scanner: impl WorkspaceScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    /// Use a different local change probe
    pub fn with_change_probe(mut self, probe: impl ChangeProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// The workspace root, absolute
    pub fn ws_root(&self) -> &Path {
        &self.ws_root
    }

    /// The remote resolver in use
    pub fn remotes(&self) -> &RemoteResolver {
        &self.remotes
    }

    /// The sink modules are handed to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the resolver, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Fail if the workspace has uncommitted changes
    pub fn check_ready(&self) -> Result<()> {
        if self.probe.has_local_changes(&self.ws_root)? {
            return Err(Error::WorkspaceNotClean {
                path: self.ws_root.clone(),
            });
        }
        Ok(())
    }

    /// Fail if command line arguments were left unconsumed
    pub fn check_arguments<A: AsRef<str>>(&self, args: &[A]) -> Result<()> {
        if args.is_empty() {
            return Ok(());
        }
        Err(Error::UnexpectedArguments(
            args.iter().map(|a| a.as_ref().to_string()).collect(),
        ))
    }

    /// `path` relative to the workspace root
    ///
    /// Relative paths are read as relative to the workspace root, not to the
    /// working directory.
    pub fn relative_path(&self, path: impl AsRef<Path>) -> PathBuf {
        relative_path(path.as_ref(), &self.ws_root)
    }

    /// Build a normalized module from raw parts
    pub fn create_module_info(
        &self,
        remote_url: &str,
        resolve_mode: ResolveMode,
        local_path: impl AsRef<Path>,
        target_revision: impl Into<String>,
        ignores: Vec<String>,
    ) -> Result<ModuleInfo> {
        let remote_url = self.remotes.resolve(remote_url, resolve_mode)?;
        let local_path = self.relative_path(local_path);
        let branch_format = self.remotes.branch_format(&remote_url);

        debug!(
            remote_url = %remote_url,
            local_path = %local_path.display(),
            branch_format = ?branch_format,
            "Created module info"
        );

        Ok(ModuleInfo::new(
            remote_url,
            local_path,
            target_revision,
            ignores,
            branch_format,
        ))
    }

    /// Add every module declared in the manifest at `path`
    ///
    /// Remotes are taken verbatim when the manifest declares no base remote,
    /// otherwise they are resolved against the review server.
    pub fn modules_from_manifest(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let manifest = self.manifest_reader.read(path)?;
        let mode = match manifest.base_remote() {
            Some(_) => ResolveMode::DefaultServer,
            None => ResolveMode::Absolute,
        };

        info!(
            manifest = %path.display(),
            modules = manifest.modules.len(),
            mode = %mode,
            "Reading modules from manifest"
        );

        for entry in manifest.modules {
            let module = self.create_module_info(
                &entry.remote_path,
                mode,
                &entry.local_path,
                entry.target_revision,
                entry.ignores,
            )?;
            self.sink.accept(module)?;
        }
        Ok(())
    }

    /// Add the module checked out in directory `path`
    ///
    /// `path` is taken relative to the working directory. Each override
    /// replaces the corresponding value from the module info file.
    pub fn module_from_path(
        &mut self,
        path: impl AsRef<Path>,
        overrides: &ModuleOverrides,
    ) -> Result<()> {
        let path = expand_from_cwd(path.as_ref())?;
        if !RimInfo::exists_in(&path) {
            return Err(Error::ModuleDescriptorNotFound(path));
        }
        let info = RimInfo::from_dir(&path)?;

        let remote_url = overrides.remote_url.as_deref().unwrap_or(&info.remote_url);
        let target_revision = overrides
            .target_revision
            .clone()
            .unwrap_or_else(|| info.upstream.clone());
        let ignores = overrides
            .ignores
            .clone()
            .unwrap_or_else(|| info.ignores.clone());

        let module = self.create_module_info(
            remote_url,
            overrides.resolve_mode.unwrap_or_default(),
            &path,
            target_revision,
            ignores,
        )?;
        self.sink.accept(module)
    }

    /// Add every module found in the workspace
    ///
    /// Returns `Ok(false)` without touching the sink when the workspace is
    /// not managed by rim (no `.rim` directory at its root).
    pub fn modules_from_workspace(&mut self) -> Result<bool> {
        if !self.ws_root.join(RIM_DIR_NAME).is_dir() {
            debug!(ws_root = %self.ws_root.display(), "No rim directory, skipping workspace scan");
            return Ok(false);
        }

        let scanned = self.scanner.scan(&self.ws_root)?;
        info!(modules = scanned.len(), "Scanned workspace modules");

        for entry in scanned {
            // Remotes of checked out modules are already absolute
            let branch_format = self.remotes.branch_format(&entry.info.remote_url);
            let module = ModuleInfo::new(
                entry.info.remote_url,
                self.relative_path(&entry.dir),
                entry.info.upstream,
                entry.info.ignores,
                branch_format,
            );
            self.sink.accept(module)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::init_repo_with_commit;
    use crate::manifest::{Manifest, ManifestModule};
    use crate::scan::ScannedModule;
    use crate::sink::ModuleIndex;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct FakeManifest(Manifest);

    impl ManifestReader for FakeManifest {
        fn read(&self, _path: &Path) -> Result<Manifest> {
            Ok(self.0.clone())
        }
    }

    struct FakeScanner {
        modules: Vec<ScannedModule>,
        calls: Rc<Cell<usize>>,
    }

    impl WorkspaceScanner for FakeScanner {
        fn scan(&self, _root: &Path) -> Result<Vec<ScannedModule>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.modules.clone())
        }
    }

    struct FixedProbe(bool);

    impl ChangeProbe for FixedProbe {
        fn has_local_changes(&self, _root: &Path) -> Result<bool> {
            Ok(self.0)
        }
    }

    fn entry(remote: &str, local: &str) -> ManifestModule {
        ManifestModule {
            remote_path: remote.to_string(),
            local_path: local.to_string(),
            target_revision: "main".to_string(),
            ignores: vec![],
        }
    }

    fn manifest(remote_url: Option<&str>, modules: Vec<ManifestModule>) -> FakeManifest {
        FakeManifest(Manifest {
            remote_url: remote_url.map(String::from),
            modules,
        })
    }

    fn write_info(dir: &Path, remote: &str) {
        std::fs::create_dir_all(dir).unwrap();
        RimInfo {
            remote_url: remote.to_string(),
            upstream: "release".to_string(),
            ignores: vec!["gen/**".to_string()],
            ..Default::default()
        }
        .to_dir(dir)
        .unwrap();
    }

    #[test]
    fn test_manifest_without_base_uses_remote_verbatim() {
        let temp = TempDir::new().unwrap();
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_manifest_reader(manifest(Some(""), vec![entry("libs/foo", "foo")]));

        resolver.modules_from_manifest("manifest.rim").unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].remote_url, "libs/foo");
        assert_eq!(modules[0].local_path, PathBuf::from("foo"));
        assert_eq!(modules[0].target_revision, "main");
        assert!(modules[0].remote_branch_format.is_none());
    }

    #[test]
    fn test_manifest_missing_base_uses_remote_verbatim() {
        let temp = TempDir::new().unwrap();
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_manifest_reader(manifest(None, vec![entry("libs/foo", "foo")]));

        resolver.modules_from_manifest("manifest.rim").unwrap();
        assert_eq!(resolver.sink()[0].remote_url, "libs/foo");
    }

    #[test]
    fn test_manifest_with_base_resolves_against_server() {
        let temp = TempDir::new().unwrap();
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_manifest_reader(manifest(
                Some("ssh://gerrit/"),
                vec![
                    entry("project/x", "sub/x"),
                    entry("https://github.com/o/r.git", "r"),
                ],
            ));

        resolver.modules_from_manifest("manifest.rim").unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules[0].remote_url, "ssh://gerrit/project/x");
        assert_eq!(modules[0].remote_branch_format.as_deref(), Some("refs/for/%s"));
        assert_eq!(modules[0].local_path, PathBuf::from("sub/x"));
        assert_eq!(modules[1].remote_url, "https://github.com/o/r.git");
        assert!(modules[1].remote_branch_format.is_none());
    }

    #[test]
    fn test_manifest_local_path_relative_to_ws_root() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().join("ws");
        let mut resolver = ModuleResolver::new(&ws, Vec::<ModuleInfo>::new())
            .unwrap()
            .with_manifest_reader(manifest(
                None,
                vec![
                    entry("a", "sub/mod"),
                    entry("b", &ws.join("abs/mod").to_string_lossy()),
                ],
            ));

        resolver.modules_from_manifest("manifest.rim").unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules[0].local_path, PathBuf::from("sub/mod"));
        assert_eq!(modules[1].local_path, PathBuf::from("abs/mod"));
    }

    #[test]
    fn test_manifest_stops_at_first_sink_error() {
        let temp = TempDir::new().unwrap();
        let mut resolver = ModuleResolver::new(temp.path(), ModuleIndex::new())
            .unwrap()
            .with_manifest_reader(manifest(
                None,
                vec![entry("a", "x"), entry("b", "x"), entry("c", "y")],
            ));

        let err = resolver.modules_from_manifest("manifest.rim").unwrap_err();
        assert!(matches!(err, Error::DuplicateModule(_)));

        let index = resolver.into_sink();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("x").unwrap().remote_url, "a");
        assert!(index.get("y").is_none());
    }

    #[test]
    fn test_manifest_read_from_disk() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("manifest.rim");
        std::fs::write(
            &manifest_path,
            r#"{"remote_url": "ssh://gerrit/", "modules": [
                {"remote_path": "tools/x", "local_path": "tools",
                 "target_revision": "v1", "ignores": "a, b"}]}"#,
        )
        .unwrap();

        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new()).unwrap();
        resolver.modules_from_manifest(&manifest_path).unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules[0].remote_url, "ssh://gerrit/tools/x");
        assert_eq!(modules[0].ignores, vec!["a", "b"]);
    }

    #[test]
    fn test_module_from_path_uses_info_file() {
        let temp = TempDir::new().unwrap();
        let module_dir = temp.path().join("ext").join("lib");
        write_info(&module_dir, "team/lib");

        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new()).unwrap();
        resolver
            .module_from_path(&module_dir, &ModuleOverrides::default())
            .unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].remote_url, "ssh://gerrit/team/lib");
        assert_eq!(modules[0].local_path, PathBuf::from("ext/lib"));
        assert_eq!(modules[0].target_revision, "release");
        assert_eq!(modules[0].ignores, vec!["gen/**"]);
        assert_eq!(modules[0].remote_branch_format.as_deref(), Some("refs/for/%s"));
    }

    #[test]
    fn test_module_from_path_overrides() {
        let temp = TempDir::new().unwrap();
        let module_dir = temp.path().join("lib");
        write_info(&module_dir, "team/lib");

        let overrides = ModuleOverrides {
            remote_url: Some("https://example.com/lib.git".to_string()),
            resolve_mode: Some(ResolveMode::Absolute),
            target_revision: Some("v2".to_string()),
            ignores: Some(vec![]),
        };
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new()).unwrap();
        resolver.module_from_path(&module_dir, &overrides).unwrap();

        let modules = resolver.into_sink();
        assert_eq!(modules[0].remote_url, "https://example.com/lib.git");
        assert_eq!(modules[0].target_revision, "v2");
        assert!(modules[0].ignores.is_empty());
        assert!(modules[0].remote_branch_format.is_none());
    }

    #[test]
    fn test_module_from_path_missing_info() {
        let temp = TempDir::new().unwrap();
        let module_dir = temp.path().join("empty");
        std::fs::create_dir_all(&module_dir).unwrap();

        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new()).unwrap();
        let err = resolver
            .module_from_path(&module_dir, &ModuleOverrides::default())
            .unwrap_err();

        assert!(matches!(&err, Error::ModuleDescriptorNotFound(p) if p == &module_dir));
        assert!(err.to_string().contains(&*module_dir.to_string_lossy()));
        assert!(resolver.sink().is_empty());
    }

    #[test]
    fn test_workspace_without_rim_dir_is_not_applicable() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_scanner(FakeScanner {
                modules: vec![],
                calls: calls.clone(),
            });

        assert!(!resolver.modules_from_workspace().unwrap());
        assert_eq!(calls.get(), 0);
        assert!(resolver.sink().is_empty());
    }

    #[test]
    fn test_workspace_scan_bypasses_url_resolution() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(RIM_DIR_NAME)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let scanned = vec![
            ScannedModule {
                dir: PathBuf::from("libs/a"),
                info: RimInfo {
                    remote_url: "ssh://gerrit/team/a".to_string(),
                    upstream: "main".to_string(),
                    ..Default::default()
                },
            },
            ScannedModule {
                dir: PathBuf::from("b"),
                info: RimInfo {
                    remote_url: "relative/b".to_string(),
                    upstream: "dev".to_string(),
                    ignores: vec!["*.tmp".to_string()],
                    ..Default::default()
                },
            },
        ];
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_scanner(FakeScanner {
                modules: scanned,
                calls: calls.clone(),
            });

        assert!(resolver.modules_from_workspace().unwrap());
        assert_eq!(calls.get(), 1);

        let modules = resolver.into_sink();
        assert_eq!(modules[0].remote_url, "ssh://gerrit/team/a");
        assert_eq!(modules[0].local_path, PathBuf::from("libs/a"));
        assert_eq!(modules[0].remote_branch_format.as_deref(), Some("refs/for/%s"));
        // Not resolved against the server
        assert_eq!(modules[1].remote_url, "relative/b");
        assert_eq!(modules[1].target_revision, "dev");
        assert!(modules[1].remote_branch_format.is_none());
    }

    #[test]
    fn test_workspace_scan_from_disk() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(RIM_DIR_NAME)).unwrap();
        write_info(&temp.path().join("mods").join("one"), "ssh://gerrit/one");

        let mut resolver = ModuleResolver::new(temp.path(), ModuleIndex::new()).unwrap();
        assert!(resolver.modules_from_workspace().unwrap());

        let index = resolver.into_sink();
        let module = index.get("mods/one").unwrap();
        assert_eq!(module.remote_url, "ssh://gerrit/one");
        assert_eq!(module.target_revision, "release");
    }

    #[test]
    fn test_with_modules_seeds_sink() {
        let temp = TempDir::new().unwrap();
        let seed = ModuleInfo::new("ssh://gerrit/s", "s", "main", vec![], None);
        let resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_modules(vec![seed.clone()])
            .unwrap();
        assert_eq!(resolver.sink(), &vec![seed]);
    }

    #[test]
    fn test_custom_server_flows_into_modules() {
        let temp = TempDir::new().unwrap();
        let mut resolver = ModuleResolver::new(temp.path(), Vec::<ModuleInfo>::new())
            .unwrap()
            .with_remote_resolver(RemoteResolver::new("ssh://review.local/"))
            .with_manifest_reader(manifest(Some("x"), vec![entry("a/b", "b")]));

        resolver.modules_from_manifest("m").unwrap();
        let modules = resolver.into_sink();
        assert_eq!(modules[0].remote_url, "ssh://review.local/a/b");
        assert!(modules[0].remote_branch_format.is_some());
    }

    #[test]
    fn test_check_ready_with_probe() {
        let temp = TempDir::new().unwrap();
        let clean = ModuleResolver::new(temp.path(), NoopSink)
            .unwrap()
            .with_change_probe(FixedProbe(false));
        assert!(clean.check_ready().is_ok());

        let dirty = ModuleResolver::new(temp.path(), NoopSink)
            .unwrap()
            .with_change_probe(FixedProbe(true));
        assert!(matches!(
            dirty.check_ready(),
            Err(Error::WorkspaceNotClean { .. })
        ));
    }

    #[test]
    fn test_check_ready_with_git() {
        let temp = TempDir::new().unwrap();
        init_repo_with_commit(temp.path());

        let resolver = ModuleResolver::new(temp.path(), NoopSink).unwrap();
        assert!(resolver.check_ready().is_ok());

        std::fs::write(temp.path().join("dirty.txt"), "x").unwrap();
        assert!(matches!(
            resolver.check_ready(),
            Err(Error::WorkspaceNotClean { path }) if path == resolver.ws_root()
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_check_ready_rejects_non_utf8_untracked_file() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        init_repo_with_commit(temp.path());
        std::fs::write(temp.path().join(OsStr::from_bytes(b"bad\xffname")), "x").unwrap();

        let resolver = ModuleResolver::new(temp.path(), NoopSink).unwrap();
        assert!(matches!(
            resolver.check_ready(),
            Err(Error::WorkspaceNotClean { .. })
        ));
    }

    #[test]
    fn test_check_arguments() {
        let temp = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(temp.path(), NoopSink).unwrap();
        let none: [&str; 0] = [];
        assert!(resolver.check_arguments(&none).is_ok());

        let err = resolver.check_arguments(&["stray", "args"]).unwrap_err();
        assert!(matches!(&err, Error::UnexpectedArguments(a) if a.len() == 2));
        assert!(err.to_string().contains("stray args"));
    }

    #[test]
    fn test_relative_path_ignores_cwd() {
        let resolver = ModuleResolver::new("/ws/root", NoopSink).unwrap();
        assert_eq!(resolver.relative_path("sub/mod"), PathBuf::from("sub/mod"));
        assert_eq!(resolver.relative_path("/ws/root/sub/mod"), PathBuf::from("sub/mod"));
    }
}
