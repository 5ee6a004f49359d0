//! Compile and link command lines for the generated templates.

use std::path::{Path, PathBuf};

const EOL: &str = "\r\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Rendered `.wxs` templates. Only their basenames reach the command line.
    pub templates: Vec<PathBuf>,
    pub msi_out: String,
    /// Go-style architecture name; empty omits the flag.
    pub arch: String,
    /// Directory holding the toolchain binaries; tools are looked up on
    /// `PATH` when `None`.
    pub wix_bin_dir: Option<PathBuf>,
    pub culture: Option<String>,
}

/// Map an architecture name onto the one the compiler understands.
pub fn installer_arch(arch: &str) -> &str {
    match arch {
        "386" => "x86",
        "amd64" => "x64",
        other => other,
    }
}

/// Two CRLF-terminated lines: the compile step, then the link step.
pub fn generate_cmd(opts: &CommandOptions) -> String {
    let names: Vec<String> = opts
        .templates
        .iter()
        .map(|tpl| {
            tpl.file_name()
                .map_or_else(|| tpl.to_string_lossy(), |n| n.to_string_lossy())
                .into_owned()
        })
        .collect();

    let mut candle = vec![
        tool(opts.wix_bin_dir.as_deref(), "candle"),
        "-ext".to_owned(),
        "WixUtilExtension".to_owned(),
    ];
    if !opts.arch.is_empty() {
        candle.push("-arch".to_owned());
        candle.push(installer_arch(&opts.arch).to_owned());
    }
    candle.extend(names.iter().cloned());

    let mut light = vec![
        tool(opts.wix_bin_dir.as_deref(), "light"),
        "-ext".to_owned(),
        "WixUIExtension".to_owned(),
        "-ext".to_owned(),
        "WixUtilExtension".to_owned(),
        "-sacl".to_owned(),
        "-spdb".to_owned(),
    ];
    if let Some(culture) = opts.culture.as_deref().filter(|c| !c.is_empty()) {
        light.push(format!("-cultures:{culture}"));
    }
    light.push("-out".to_owned());
    light.push(opts.msi_out.clone());
    light.extend(names.iter().map(|n| n.replace(".wxs", ".wixobj")));

    format!("{}{EOL}{}{EOL}", candle.join(" "), light.join(" "))
}

fn tool(dir: Option<&Path>, name: &str) -> String {
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name).to_string_lossy().into_owned(),
        _ => name.to_owned(),
    }
}
