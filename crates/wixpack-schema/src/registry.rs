use crate::manifest::{Registry, RegistryItem};
use thiserror::Error;

pub const DEFAULT_VALUE_TYPE: &str = "string";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid registry path {0:?}, expected ROOT\\Key")]
pub struct RegistryPathError(pub String);

/// Split `HKCU\Software\foo` into `("HKCU", "Software\foo")`.
pub fn split_registry_path(path: &str) -> Result<(String, String), RegistryPathError> {
    let Some((root, key)) = path.split_once('\\') else {
        return Err(RegistryPathError(path.to_owned()));
    };
    Ok((root.to_owned(), key.to_owned()))
}

impl Registry {
    pub fn resolve(&mut self) -> Result<(), RegistryPathError> {
        let (root, key) = split_registry_path(&self.path)?;
        self.root = root;
        self.key = key;
        Ok(())
    }
}

impl RegistryItem {
    /// Resolve the path and default untyped values to `string`.
    pub fn resolve(&mut self) -> Result<(), RegistryPathError> {
        self.registry.resolve()?;
        for value in &mut self.values {
            if value.kind.is_empty() {
                DEFAULT_VALUE_TYPE.clone_into(&mut value.kind);
            }
        }
        Ok(())
    }
}
