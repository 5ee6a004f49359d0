use crate::manifest::{Manifest, ManifestError, ManifestFormat, DEFAULT_MANIFEST};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl Manifest {
    /// Pretty JSON with two-space indentation in declaration order. Derived
    /// fields are not part of the output.
    pub fn canonical_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the manifest to `path`, or to `wix.json` when `None`. The format
    /// follows the extension. Returns the path written.
    pub fn write(&self, path: Option<&Path>) -> Result<PathBuf, ManifestError> {
        let dest = path.map_or_else(|| PathBuf::from(DEFAULT_MANIFEST), Path::to_path_buf);
        let mut content = match ManifestFormat::from_path(&dest) {
            ManifestFormat::Json => self.canonical_json()?,
            ManifestFormat::Toml => self.to_toml()?,
        };
        if !content.ends_with('\n') {
            content.push('\n');
        }
        write_atomic(&dest, &content)?;
        Ok(dest)
    }

    /// Inspection dump of the materialized tree. Always JSON, one-space
    /// indentation; nothing reads it back.
    pub fn write_dynamic_dump(&self, path: &Path) -> Result<(), ManifestError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        let content = String::from_utf8_lossy(&buf);
        write_atomic(path, &content)
    }
}

fn write_atomic(dest: &Path, content: &str) -> Result<(), ManifestError> {
    let write_err = |source| ManifestError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    // The temp file starts out 0600; keep the destination's mode, or give a
    // new file the usual 0644.
    match fs::metadata(dest) {
        Ok(meta) => tmp
            .as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?,
        Err(_) => set_default_mode(tmp.as_file()).map_err(write_err)?,
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_default_mode(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
