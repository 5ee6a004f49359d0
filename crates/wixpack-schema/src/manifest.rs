use crate::hook::HookError;
use crate::registry::RegistryPathError;
use crate::validate::ValidationError;
use crate::version::{Version, VersionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest read and written when no path is given.
pub const DEFAULT_MANIFEST: &str = "wix.json";
/// Inspection dump written after the directory tree is materialized.
pub const DYNAMIC_MANIFEST: &str = "wix.dynamic.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to serialize manifest: {0}")]
    SerializeToml(#[from] toml::ser::Error),
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to stat file {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to resolve working directory: {0}")]
    WorkingDir(#[source] io::Error),
    #[error("cannot make {} relative to {}", path.display(), base.display())]
    Relativize { path: PathBuf, base: PathBuf },
    #[error("file name is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Registry(#[from] RegistryPathError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Serialized form of a manifest, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// An installer package description.
///
/// The root [`Directory`] is flattened into the document, so `name`, `files`
/// and `directories` sit next to `product` and `company`. Fields marked
/// `skip` are derived during normalization and never round-trip.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Manifest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub compression: String,
    pub product: String,
    pub company: String,
    #[serde(skip)]
    pub version: Version,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub banner: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dialog: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "Info::is_empty")]
    pub info: Info,
    #[serde(rename = "upgrade-code")]
    pub upgrade_code: String,
    #[serde(flatten)]
    pub root: Directory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<Environment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registries: Vec<RegistryItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shortcuts: Vec<Shortcut>,
    pub choco: PackageSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<Hook>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Control panel program information, one field per column of the
/// uninstall program list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Info {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact: String,
    #[serde(rename = "help-link", skip_serializing_if = "String::is_empty")]
    pub help_link: String,
    #[serde(rename = "support-telephone", skip_serializing_if = "String::is_empty")]
    pub support_telephone: String,
    #[serde(rename = "support-link", skip_serializing_if = "String::is_empty")]
    pub support_link: String,
    #[serde(rename = "update-info-link", skip_serializing_if = "String::is_empty")]
    pub update_info_link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub readme: String,
    /// Installed size in kilobytes.
    #[serde(skip)]
    pub size: u64,
}

impl Info {
    /// True when no user-facing column is set. The derived size is ignored.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
            && self.contact.is_empty()
            && self.help_link.is_empty()
            && self.support_telephone.is_empty()
            && self.support_link.is_empty()
            && self.update_info_link.is_empty()
            && self.readme.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Directory {
    #[serde(skip)]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<Directory>,
}

impl Directory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct File {
    #[serde(skip)]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "is_false")]
    pub never_overwrite: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub permanent: bool,
}

impl File {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// A Windows service installed from the owning [`File`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Service {
    pub name: String,
    /// Basename of the owning file, bound during normalization.
    #[serde(skip)]
    pub bin: String,
    pub start: String,
    #[serde(skip)]
    pub delayed: bool,
    #[serde(rename = "display-name", skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arguments: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// Chocolatey package metadata.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackageSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub authors: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owners: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "project-url", skip_serializing_if = "String::is_empty")]
    pub project_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
    #[serde(rename = "license-url", skip_serializing_if = "String::is_empty")]
    pub license_url: String,
    #[serde(rename = "icon-url", skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(rename = "require-license", skip_serializing_if = "is_false")]
    pub require_license: bool,
    // Filled in by the packaging step, never persisted.
    #[serde(skip)]
    pub msi_file: String,
    #[serde(skip)]
    pub msi_sum: String,
    #[serde(skip)]
    pub build_dir: String,
    #[serde(skip)]
    pub changelog: String,
}

/// A command run on install and/or uninstall.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Hook {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// Quoted and XML-escaped form of `command`.
    #[serde(skip)]
    pub cooked_command: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub when: String,
    #[serde(rename = "return", skip_serializing_if = "String::is_empty")]
    pub return_: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub impersonate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub execute: String,
}

/// An installer property initialized either from the registry or from a
/// literal value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Property {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<Registry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Registry {
    pub path: String,
    #[serde(skip)]
    pub root: String,
    #[serde(skip)]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Condition {
    pub condition: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Environment {
    pub name: String,
    pub value: String,
    pub permanent: String,
    pub system: String,
    pub action: String,
    pub part: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Shortcut {
    pub name: String,
    pub description: String,
    pub location: String,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub wdir: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arguments: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ShortcutProperty>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShortcutProperty {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryItem {
    #[serde(flatten)]
    pub registry: Registry,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<RegistryValue>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryValue {
    pub name: String,
    /// `string` when omitted, or `integer`, `expandable`, ...
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub value: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(input)?)
}

pub fn parse_manifest_toml(input: &str) -> Result<Manifest, ManifestError> {
    Ok(toml::from_str(input)?)
}

/// Load a manifest from disk. A `.toml` extension selects TOML, anything
/// else is decoded as JSON.
pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ManifestError::NotFound(path.to_path_buf())
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    match ManifestFormat::from_path(path) {
        ManifestFormat::Json => parse_manifest_str(&content),
        ManifestFormat::Toml => parse_manifest_toml(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
  "product": "hello",
  "company": "mh-cbon",
  "license": "LICENSE",
  "upgrade-code": "0FD8ECC6-B51C-4AE6-8D2A-0E9DE8F2B8B2",
  "compression": "high",
  "info": { "help-link": "https://example.org/help" },
  "files": [
    { "path": "hello.exe", "service": { "name": "hello", "start": "delayed" } }
  ],
  "directories": [ { "name": "assets" } ],
  "environments": [
    { "name": "PATH", "value": "[INSTALLDIR]", "permanent": "no", "system": "no", "action": "set", "part": "last" }
  ],
  "registries": [
    { "path": "HKCU\\Software\\hello", "values": [ { "name": "Version", "value": "1" } ] }
  ],
  "shortcuts": [
    { "name": "hello", "description": "say hello", "location": "desktop", "target": "[INSTALLDIR]\\hello.exe" }
  ],
  "choco": { "require-license": true },
  "hooks": [ { "command": "hello.exe --init", "when": "install" } ],
  "properties": [
    { "id": "PREVIOUS", "registry": { "path": "HKCU\\Software\\hello", "name": "Path" } },
    { "id": "GREETING", "value": "hi" }
  ],
  "conditions": [ { "condition": "Installed", "message": "already there" } ]
}"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = parse_manifest_str(FULL).expect("should parse");
        assert_eq!(manifest.product, "hello");
        assert_eq!(manifest.upgrade_code, "0FD8ECC6-B51C-4AE6-8D2A-0E9DE8F2B8B2");
        assert_eq!(manifest.info.help_link, "https://example.org/help");
        assert_eq!(manifest.root.files.len(), 1);
        let service = manifest.root.files[0].service.as_ref().unwrap();
        assert_eq!(service.start, "delayed");
        assert_eq!(manifest.root.directories[0].name, "assets");
        assert_eq!(manifest.registries[0].registry.path, r"HKCU\Software\hello");
        assert_eq!(manifest.registries[0].values[0].kind, "");
        assert!(manifest.choco.require_license);
        assert_eq!(manifest.properties[1].value.as_deref(), Some("hi"));
        assert_eq!(manifest.conditions[0].message, "already there");
    }

    #[test]
    fn parses_minimal_manifest() {
        let manifest = parse_manifest_str(r#"{"product": "p", "company": "c"}"#).unwrap();
        assert!(manifest.root.directories.is_empty());
        assert!(manifest.upgrade_code.is_empty());
        assert!(manifest.info.is_empty());
    }

    #[test]
    fn ignores_version_key_in_document() {
        let manifest =
            parse_manifest_str(r#"{"product": "p", "company": "c", "version": "9.9.9"}"#).unwrap();
        assert!(manifest.version.user.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_manifest_str(r#"{"product": "#).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse manifest"));
    }

    #[test]
    fn unknown_keys_are_ignored_at_every_level() {
        let input = r#"{
  "product": "p",
  "extra": 1,
  "directories": [ { "name": "assets", "mode": "0755" } ],
  "registries": [ { "path": "HKCU\\Software\\p", "hive": "x", "values": [ { "name": "n", "value": "v", "ttl": 3 } ] } ],
  "shortcuts": [ { "name": "p", "hotkey": "F1", "properties": [ { "key": "k", "value": "v", "note": "" } ] } ],
  "hooks": [ { "command": "x", "whne": "install" } ],
  "files": [ { "path": "p.exe", "service": { "name": "p", "restart": true } } ],
  "choco": { "id": "p", "pinned": true }
}"#;
        let manifest = parse_manifest_str(input).unwrap();
        assert_eq!(manifest.product, "p");
        assert_eq!(manifest.root.directories[0].name, "assets");
        assert_eq!(manifest.registries[0].values[0].value, "v");
        assert_eq!(manifest.shortcuts[0].properties[0].key, "k");
        assert_eq!(manifest.hooks[0].command, "x");
        assert!(manifest.hooks[0].when.is_empty());
        assert_eq!(manifest.root.files[0].service.as_ref().unwrap().name, "p");
        assert_eq!(manifest.choco.id, "p");

        let json = manifest.canonical_json().unwrap();
        for key in ["extra", "hotkey", "whne", "pinned"] {
            assert!(!json.contains(key), "{key} must not be written back");
        }
    }

    #[test]
    fn parses_toml_manifest() {
        let input = r#"
product = "hello"
company = "acme"
upgrade-code = "ABC"

[[directories]]
name = "bin"

[[shortcuts]]
name = "hello"
description = "d"
location = "program"
target = "t"
"#;
        let manifest = parse_manifest_toml(input).unwrap();
        assert_eq!(manifest.company, "acme");
        assert_eq!(manifest.root.directories[0].name, "bin");
        assert_eq!(manifest.shortcuts[0].location, "program");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_manifest_file(dir.path().join("wix.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ManifestFormat::from_path(Path::new("wix.toml")),
            ManifestFormat::Toml
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("wix.json")),
            ManifestFormat::Json
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("manifest")),
            ManifestFormat::Json
        );
    }
}
