//! Output-relative paths and element identifiers.
//!
//! Templates are rendered into an output directory, so every path the
//! manifest hands them must be relative to that directory. The same walk
//! numbers directories and files for the generated element ids.

use crate::manifest::{Directory, Manifest, ManifestError};
use crate::paths::{absolutize, resolve_base, rewrite_path};
use std::path::Path;

/// Dense, 1-based identifier sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids handed out by [`Manifest::rewrite_file_paths`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteCounts {
    pub directories: u32,
    pub files: u32,
}

/// Number `dirs` and all their descendants, pre-order.
pub fn assign_directory_ids(dirs: &mut [Directory], counter: &mut IdCounter) {
    for dir in dirs {
        dir.id = counter.next_id();
        assign_directory_ids(&mut dir.directories, counter);
    }
}

impl Manifest {
    /// Rewrite every path reference relative to `out`, the template output
    /// directory, and assign element ids.
    ///
    /// Relative inputs (including `out`) resolve against `base`. Directory
    /// ids are assigned in one full pass and file ids in a second one, so
    /// both form independent sequences starting at 1. The root directory
    /// itself is not numbered. Returns how many of each were numbered.
    pub fn rewrite_file_paths(
        &mut self,
        base: &Path,
        out: &Path,
    ) -> Result<RewriteCounts, ManifestError> {
        let base = resolve_base(base)?;
        let out = absolutize(&base, out);

        for field in [
            &mut self.license,
            &mut self.banner,
            &mut self.dialog,
            &mut self.icon,
        ] {
            if !field.is_empty() {
                *field = rewrite_path(&base, &out, field)?;
            }
        }

        let mut directory_ids = IdCounter::new();
        assign_directory_ids(&mut self.root.directories, &mut directory_ids);

        let mut file_ids = IdCounter::new();
        for file in self.root.files_mut() {
            file.path = rewrite_path(&base, &out, &file.path)?;
            file.id = file_ids.next_id();
        }

        for shortcut in &mut self.shortcuts {
            if !shortcut.icon.is_empty() {
                shortcut.icon = rewrite_path(&base, &out, &shortcut.icon)?;
            }
        }
        Ok(RewriteCounts {
            directories: directory_ids.issued(),
            files: file_ids.issued(),
        })
    }
}
