use crate::manifest::Manifest;
use crate::types::{Compression, HookWhen, Impersonate, ShortcutLocation};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid compression {value:?}, must be one of {expected}")]
    InvalidCompression { value: String, expected: String },
    #[error("invalid \"when\" value {value:?} in hook {command:?}, expected install, uninstall or empty")]
    InvalidHookWhen { command: String, value: String },
    #[error("invalid \"impersonate\" value {value:?} in hook {command:?}, expected yes or no")]
    InvalidImpersonate { command: String, value: String },
    #[error("invalid \"location\" value {value:?} in shortcut {name:?}, expected program or desktop")]
    InvalidShortcutLocation { name: String, value: String },
    #[error("property {0:?} must set exactly one of \"registry\" or \"value\"")]
    InvalidProperty(String),
    #[error("the manifest needs an upgrade code, to update your file automatically run \"wixpack set-guid\"")]
    MissingUpgradeCode,
}

impl Manifest {
    /// Compression is the only check that runs before normalization mutates
    /// anything.
    pub fn validate_compression(&self) -> Result<(), ValidationError> {
        if self.compression.is_empty() || Compression::from_name(&self.compression).is_some() {
            return Ok(());
        }
        Err(ValidationError::InvalidCompression {
            value: self.compression.clone(),
            expected: Compression::expected(),
        })
    }

    /// Final checks on a normalized manifest. Stops at the first violation.
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate_compression()?;

        for hook in &self.hooks {
            if !hook.when.is_empty() && HookWhen::from_name(&hook.when).is_none() {
                return Err(ValidationError::InvalidHookWhen {
                    command: hook.command.clone(),
                    value: hook.when.clone(),
                });
            }
            if Impersonate::from_name(&hook.impersonate).is_none() {
                return Err(ValidationError::InvalidImpersonate {
                    command: hook.command.clone(),
                    value: hook.impersonate.clone(),
                });
            }
        }

        for shortcut in &self.shortcuts {
            if ShortcutLocation::from_name(&shortcut.location).is_none() {
                return Err(ValidationError::InvalidShortcutLocation {
                    name: shortcut.name.clone(),
                    value: shortcut.location.clone(),
                });
            }
        }

        for property in &self.properties {
            if property.registry.is_some() == property.value.is_some() {
                return Err(ValidationError::InvalidProperty(property.id.clone()));
            }
        }

        if self.needs_guid() {
            return Err(ValidationError::MissingUpgradeCode);
        }
        Ok(())
    }
}
