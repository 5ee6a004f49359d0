use super::{json_pretty, EXIT_SUCCESS};
use std::path::PathBuf;
use wixpack_core::{Pipeline, PipelineOptions};
use wixpack_schema::DYNAMIC_MANIFEST;

pub struct Args {
    pub path: PathBuf,
    pub version: String,
    pub display: Option<String>,
    pub out: PathBuf,
    pub output: PathBuf,
    pub dump: bool,
}

pub fn run(pipeline: &Pipeline, args: Args, json: bool) -> Result<u8, String> {
    let opts = PipelineOptions {
        manifest: args.path,
        version: args.version,
        display: args.display,
        out_dir: args.out,
        output: Some(args.output),
        dynamic_dump: args.dump.then(|| PathBuf::from(DYNAMIC_MANIFEST)),
        build_tree: true,
    };
    let report = pipeline.run(&opts).map_err(|e| e.to_string())?;
    let m = &report.manifest;

    if json {
        let payload = serde_json::json!({
            "manifest": report.manifest_path,
            "output": report.output,
            "dynamic_dump": report.dynamic_dump,
            "product": m.product,
            "version": m.version.installer,
            "display_version": m.version.display,
            "version_key": m.version.key,
            "files": report.file_count,
            "directories": report.directory_count,
            "size_kb": m.info.size,
            "upgrade_code": m.upgrade_code,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "normalized {} {} ({} files, {} directories, {} KB)",
            m.product, m.version.installer, report.file_count, report.directory_count, m.info.size
        );
        if let Some(output) = &report.output {
            println!("wrote {}", output.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
