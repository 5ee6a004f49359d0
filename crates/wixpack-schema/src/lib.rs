//! Installer manifest model, directory-tree materialization, normalization,
//! and validation for wixpack.
//!
//! This crate defines the schema layer: JSON/TOML manifest parsing
//! (`Manifest`), discovery of declared directories on disk
//! (`Manifest::build_directories`), version encoding for the installer's
//! version field, normalization of every derived field
//! (`Manifest::normalize`), path rewriting relative to a template output
//! directory (`Manifest::rewrite_file_paths`), and canonical serialization.

pub mod guid;
pub mod hook;
pub mod manifest;
pub mod normalize;
pub mod paths;
pub mod registry;
pub mod rewrite;
pub mod serialize;
pub mod tree;
pub mod types;
pub mod validate;
pub mod version;

pub use guid::make_guid;
pub use hook::{escape_hook, HookError};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, parse_manifest_toml, Condition, Directory,
    Environment, File, Hook, Info, Manifest, ManifestError, ManifestFormat, PackageSpec,
    Property, Registry, RegistryItem, RegistryValue, Service, Shortcut, ShortcutProperty,
    DEFAULT_MANIFEST, DYNAMIC_MANIFEST,
};
pub use registry::{split_registry_path, RegistryPathError};
pub use rewrite::{IdCounter, RewriteCounts};
pub use types::{Compression, ExecuteMode, HookWhen, Impersonate, ShortcutLocation, StartMode};
pub use validate::ValidationError;
pub use version::{encode_version, EncodedVersion, Version, VersionError};
