//! Lexical path helpers
//!
//! None of these touch the filesystem, so they work for paths that do not
//! exist yet (e.g. a module that has not been checked out).

use std::path::{Component, Path, PathBuf};

use crate::Result;

/// Collapse `.` and `..` components without resolving symlinks
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            // `..` at the root stays at the root, leading `..` on a
            // relative path are kept
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            Component::Normal(name) => normalized.push(name),
        }
    }
    if normalized.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    normalized
}

/// Make `path` absolute against `base` and normalize it
pub fn expand_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Make `path` absolute against the process working directory
pub fn expand_from_cwd(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(expand_path(path, &cwd))
}

/// Express `path` relative to `root`
///
/// Relative inputs are taken to be relative to `root` itself, never to the
/// working directory. Paths outside `root` come back with leading `..`.
pub fn relative_path(path: &Path, root: &Path) -> PathBuf {
    let target = expand_path(path, root);
    let root = normalize_path(root);

    let target_parts: Vec<Component<'_>> = target.components().collect();
    let root_parts: Vec<Component<'_>> = root.components().collect();

    let common = target_parts
        .iter()
        .zip(root_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..root_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}
