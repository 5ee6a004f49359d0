use crate::manifest::{Manifest, ManifestError, PackageSpec};
use crate::paths::{absolutize, resolve_base};
use crate::types::StartMode;
use std::fs;
use std::path::Path;

/// Tag required by the chocolatey community feed validator.
const REQUIRED_CHOCO_TAG: &str = "admin";

impl Manifest {
    /// Normalize the manifest in place and validate the result.
    ///
    /// Relative paths are resolved against `base`. The caller must have set
    /// `self.version.user` beforehand. Runs once per load: paths and package
    /// tags are rewritten from whatever is currently stored.
    pub fn normalize(&mut self, base: &Path) -> Result<(), ManifestError> {
        self.validate_compression()?;
        let base = resolve_base(base)?;

        self.version.encode()?;

        for field in [&mut self.banner, &mut self.dialog, &mut self.icon] {
            if !field.is_empty() {
                *field = absolutize(&base, field.as_str())
                    .to_string_lossy()
                    .into_owned();
            }
        }

        self.choco.apply_defaults(&self.product, &self.company);

        for hook in &mut self.hooks {
            hook.normalize()?;
        }
        for property in &mut self.properties {
            if let Some(registry) = &mut property.registry {
                registry.resolve()?;
            }
        }
        for item in &mut self.registries {
            item.resolve()?;
        }

        self.bind_services();
        self.info.size = self.installed_size(&base)?;

        self.check()?;
        Ok(())
    }

    /// Services install the binary of the file that declares them; a
    /// `delayed` start is expressed as `auto` plus the delayed flag.
    fn bind_services(&mut self) {
        for file in self.root.files_mut() {
            let Some(service) = &mut file.service else {
                continue;
            };
            service.bin = basename(&file.path).to_owned();
            if StartMode::from_name(&service.start) == Some(StartMode::Delayed) {
                StartMode::Auto.as_str().clone_into(&mut service.start);
                service.delayed = true;
            }
        }
    }

    /// Total size of every file in the tree, in kilobytes.
    pub fn installed_size(&self, base: &Path) -> Result<u64, ManifestError> {
        let mut total: u64 = 0;
        for file in self.root.files() {
            let path = absolutize(base, &file.path);
            let meta = fs::metadata(&path).map_err(|source| ManifestError::Stat {
                path: path.clone(),
                source,
            })?;
            total += meta.len();
        }
        Ok(total >> 10)
    }
}

impl PackageSpec {
    fn apply_defaults(&mut self, product: &str, company: &str) {
        for (field, fallback) in [
            (&mut self.id, product),
            (&mut self.title, product),
            (&mut self.authors, company),
            (&mut self.owners, company),
            (&mut self.description, product),
        ] {
            if field.is_empty() {
                fallback.clone_into(field);
            }
        }
        if self.tags.trim().is_empty() {
            REQUIRED_CHOCO_TAG.clone_into(&mut self.tags);
        } else {
            self.tags = format!("{} {REQUIRED_CHOCO_TAG}", self.tags.trim_end());
        }
    }
}

/// Last component of a manifest path, accepting either separator.
fn basename(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\')
        .find(|part| !part.is_empty())
        .unwrap_or(path)
}
