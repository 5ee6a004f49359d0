mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;
use wixpack_core::Pipeline;
use wixpack_schema::DEFAULT_MANIFEST;

#[derive(Debug, Parser)]
#[command(
    name = "wixpack",
    version,
    about = "Normalize installer manifests and prepare them for WiX templates"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load, materialize and validate a manifest without writing anything.
    Check {
        /// Path to the manifest (JSON, or TOML by extension).
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        path: PathBuf,
        /// Product version: semver, optionally with a leading 'v', or a packed integer.
        #[arg(long)]
        version: String,
        /// Version shown to users instead of the product version.
        #[arg(long)]
        display: Option<String>,
    },
    /// Give the manifest an upgrade code.
    SetGuid {
        /// Path to the manifest (JSON, or TOML by extension).
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        path: PathBuf,
        /// Replace an existing upgrade code.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Run the full pipeline and write the normalized manifest.
    Normalize {
        /// Path to the manifest (JSON, or TOML by extension).
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        path: PathBuf,
        /// Product version: semver, optionally with a leading 'v', or a packed integer.
        #[arg(long)]
        version: String,
        /// Version shown to users instead of the product version.
        #[arg(long)]
        display: Option<String>,
        /// Directory the templates are rendered into; paths are rewritten relative to it.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Where to write the normalized manifest.
        #[arg(long, default_value = "wix.normalized.json")]
        output: PathBuf,
        /// Skip the wix.dynamic.json inspection dump.
        #[arg(long, default_value_t = false)]
        no_dump: bool,
    },
    /// Print the compile and link command lines for rendered templates.
    Cmd {
        /// Output package file.
        #[arg(long)]
        msi: String,
        /// Target architecture (386, amd64, or a toolchain name).
        #[arg(long, default_value = "")]
        arch: String,
        /// Directory holding the toolchain binaries.
        #[arg(long)]
        wix: Option<PathBuf>,
        /// Localization culture passed to the linker.
        #[arg(long)]
        culture: Option<String>,
        /// Rendered .wxs templates.
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WIXPACK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let pipeline = Pipeline::new(".");
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Check {
            path,
            version,
            display,
        } => commands::check::run(&pipeline, &path, &version, display.as_deref(), json_output),
        Commands::SetGuid { path, force } => {
            commands::set_guid::run(&pipeline, &path, force, json_output)
        }
        Commands::Normalize {
            path,
            version,
            display,
            out,
            output,
            no_dump,
        } => commands::normalize::run(
            &pipeline,
            commands::normalize::Args {
                path,
                version,
                display,
                out,
                output,
                dump: !no_dump,
            },
            json_output,
        ),
        Commands::Cmd {
            msi,
            arch,
            wix,
            culture,
            templates,
        } => commands::cmd::run(
            &wixpack_core::CommandOptions {
                templates,
                msi_out: msi,
                arch,
                wix_bin_dir: wix,
                culture,
            },
            json_output,
        ),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:")
                || msg.starts_with("failed to parse manifest")
                || msg.starts_with("failed to read manifest")
            {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
