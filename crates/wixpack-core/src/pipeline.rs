use crate::CoreError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wixpack_schema::{parse_manifest_file, Manifest, Version, DEFAULT_MANIFEST, DYNAMIC_MANIFEST};

/// Runs manifests through load, tree building, normalization, path rewriting
/// and output. Every relative path it is given resolves against `base`.
pub struct Pipeline {
    base: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Source document.
    pub manifest: PathBuf,
    pub version: String,
    /// Human-facing version; the user version when `None`.
    pub display: Option<String>,
    /// Directory the templates are rendered into.
    pub out_dir: PathBuf,
    /// Where the normalized document goes. Nothing is written when `None`.
    pub output: Option<PathBuf>,
    /// Inspection dump of the materialized tree. Skipped when `None`.
    pub dynamic_dump: Option<PathBuf>,
    pub build_tree: bool,
}

impl PipelineOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            version: version.into(),
            display: None,
            out_dir: PathBuf::from("."),
            output: None,
            dynamic_dump: Some(PathBuf::from(DYNAMIC_MANIFEST)),
            build_tree: true,
        }
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub output: Option<PathBuf>,
    pub dynamic_dump: Option<PathBuf>,
    /// Files numbered for the templates.
    pub file_count: u32,
    /// Directories numbered for the templates, root excluded.
    pub directory_count: u32,
}

/// Outcome of `set_guid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidReport {
    pub path: PathBuf,
    pub upgrade_code: String,
    pub changed: bool,
}

impl Pipeline {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }

    pub fn load(&self, path: &Path) -> Result<Manifest, CoreError> {
        let path = self.resolve(path);
        debug!("loading manifest {}", path.display());
        Ok(parse_manifest_file(&path)?)
    }

    /// Load, materialize and normalize without rewriting paths or writing
    /// anything. Returns the validated manifest.
    pub fn check(&self, opts: &PipelineOptions) -> Result<Manifest, CoreError> {
        info!("checking manifest {}", opts.manifest.display());
        let mut manifest = self.prepare(opts)?;
        if opts.build_tree {
            manifest.build_directories(&self.base)?;
        }
        manifest.normalize(&self.base)?;
        Ok(manifest)
    }

    pub fn run(&self, opts: &PipelineOptions) -> Result<PipelineReport, CoreError> {
        info!("normalizing manifest {}", opts.manifest.display());
        let manifest_path = self.resolve(&opts.manifest);
        let mut manifest = self.prepare(opts)?;

        let mut dynamic_dump = None;
        if opts.build_tree {
            manifest.build_directories(&self.base)?;
            debug!(
                "materialized {} directories, {} files",
                manifest.root.directory_count(),
                manifest.root.files().len()
            );
            if let Some(dump) = &opts.dynamic_dump {
                let dump = self.resolve(dump);
                manifest.write_dynamic_dump(&dump)?;
                debug!("wrote dynamic dump {}", dump.display());
                dynamic_dump = Some(dump);
            }
        }

        // Sizes come from the original paths, before rewriting.
        manifest.normalize(&self.base)?;
        debug!(
            "installer version {} (key {}), installed size {} KB",
            manifest.version.installer, manifest.version.key, manifest.info.size
        );

        let counts = manifest.rewrite_file_paths(&self.base, &opts.out_dir)?;

        let output = match &opts.output {
            Some(path) => {
                let written = manifest.write(Some(self.resolve(path).as_path()))?;
                info!("wrote normalized manifest {}", written.display());
                Some(written)
            }
            None => None,
        };

        Ok(PipelineReport {
            file_count: counts.files,
            directory_count: counts.directories,
            manifest,
            manifest_path,
            output,
            dynamic_dump,
        })
    }

    /// Give the manifest an upgrade code and write it back in place. With
    /// `force` an existing code is replaced. The file is only rewritten when
    /// the code changes.
    pub fn set_guid(&self, path: &Path, force: bool) -> Result<GuidReport, CoreError> {
        let path = self.resolve(path);
        let mut manifest = parse_manifest_file(&path)?;
        let changed = manifest.set_guids(force);
        if changed {
            manifest.write(Some(path.as_path()))?;
            info!(
                "set upgrade code {} in {}",
                manifest.upgrade_code,
                path.display()
            );
        } else {
            debug!("{} already has an upgrade code", path.display());
        }
        Ok(GuidReport {
            path,
            upgrade_code: manifest.upgrade_code,
            changed,
        })
    }

    fn prepare(&self, opts: &PipelineOptions) -> Result<Manifest, CoreError> {
        let mut manifest = self.load(&opts.manifest)?;
        let mut version = Version::new(opts.version.as_str());
        if let Some(display) = &opts.display {
            version = version.with_display(display.as_str());
        }
        manifest.version = version;
        Ok(manifest)
    }
}
