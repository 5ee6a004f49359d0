//! Lexical path helpers shared by normalization and rewriting.
//!
//! Nothing here touches the filesystem beyond reading the working directory:
//! paths are cleaned component-wise, symlinks are not resolved.

use crate::manifest::ManifestError;
use std::path::{Component, Path, PathBuf};

/// Absolute form of `base`, anchored at the working directory when relative.
pub fn resolve_base(base: &Path) -> Result<PathBuf, ManifestError> {
    if base.is_absolute() {
        return Ok(clean(base));
    }
    let cwd = std::env::current_dir().map_err(ManifestError::WorkingDir)?;
    Ok(clean(&cwd.join(base)))
}

/// Join `path` onto the absolute `base` unless it is already absolute, then
/// drop `.` and fold `..` components.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&base.join(path))
    }
}

pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let can_pop = matches!(last, Some(Component::Normal(_)));
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if can_pop {
                    out.pop();
                } else if !at_root {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Path of `target` relative to `base`, both absolute and cleaned.
///
/// Fails when the two live under different roots (Windows drive letters).
pub fn relative_to(base: &Path, target: &Path) -> Result<String, ManifestError> {
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let same_root = |a: Option<&Component<'_>>, b: Option<&Component<'_>>| match (a, b) {
        (Some(Component::Prefix(x)), Some(Component::Prefix(y))) => x == y,
        (Some(Component::Prefix(_)), _) | (_, Some(Component::Prefix(_))) => false,
        _ => true,
    };
    if !same_root(base_parts.first(), target_parts.first()) {
        return Err(ManifestError::Relativize {
            path: target.to_path_buf(),
            base: base.to_path_buf(),
        });
    }

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec!["..".to_owned(); base_parts.len() - common];
    parts.extend(
        target_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        Ok(".".to_owned())
    } else {
        Ok(parts.join("/"))
    }
}

/// Resolve `path` against `base`, then express it relative to `out` with
/// forward slashes.
pub fn rewrite_path(base: &Path, out: &Path, path: &str) -> Result<String, ManifestError> {
    let absolute = absolutize(base, path.replace('\\', "/"));
    relative_to(out, &absolute)
}
