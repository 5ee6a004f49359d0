//! Pipeline orchestration for wixpack.
//!
//! This crate ties the schema layer into the `Pipeline`: load a manifest,
//! materialize its declared directories, normalize and validate it, rewrite
//! its paths for a template output directory, and write the result. It also
//! renders the command lines that compile and link the generated templates.

pub mod pipeline;
pub mod toolchain;

pub use pipeline::{GuidReport, Pipeline, PipelineOptions, PipelineReport};
pub use toolchain::{generate_cmd, installer_arch, CommandOptions};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] wixpack_schema::ManifestError),
}
