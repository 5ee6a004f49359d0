use super::{json_pretty, EXIT_SUCCESS};
use std::path::Path;
use wixpack_core::Pipeline;

pub fn run(pipeline: &Pipeline, path: &Path, force: bool, json: bool) -> Result<u8, String> {
    let report = pipeline.set_guid(path, force).map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({
            "manifest": report.path,
            "upgrade_code": report.upgrade_code,
            "changed": report.changed,
        });
        println!("{}", json_pretty(&payload)?);
    } else if report.changed {
        println!(
            "set upgrade code {} in {}",
            report.upgrade_code,
            report.path.display()
        );
    } else {
        println!(
            "{} already has an upgrade code (use --force to replace it)",
            report.path.display()
        );
    }
    Ok(EXIT_SUCCESS)
}
