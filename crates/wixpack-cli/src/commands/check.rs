use super::{json_pretty, EXIT_SUCCESS};
use std::path::Path;
use wixpack_core::{Pipeline, PipelineOptions};

pub fn run(
    pipeline: &Pipeline,
    path: &Path,
    version: &str,
    display: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let opts = PipelineOptions {
        manifest: path.to_path_buf(),
        display: display.map(str::to_owned),
        dynamic_dump: None,
        ..PipelineOptions::new(version)
    };
    let manifest = pipeline.check(&opts).map_err(|e| e.to_string())?;
    let files = manifest.root.files().len();

    if json {
        let payload = serde_json::json!({
            "manifest": path,
            "product": manifest.product,
            "company": manifest.company,
            "version": manifest.version.installer,
            "display_version": manifest.version.display,
            "files": files,
            "directories": manifest.root.directory_count(),
            "size_kb": manifest.info.size,
            "status": "ok",
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{} {} ({}): {files} files, {} KB",
            manifest.product,
            manifest.version.display,
            manifest.version.installer,
            manifest.info.size
        );
    }
    Ok(EXIT_SUCCESS)
}
