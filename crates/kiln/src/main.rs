mod logging;

use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kiln_core::kernel::constants;
use kiln_core::{Kernel, KernelBuilder, ManifestReader};
use log::info;

use crate::logging::LoggingPackage;

/// Kiln: boots an application from its manifest, configuration and packages
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple liveness check
    #[arg(long)]
    ping: bool,

    /// Application directory holding the manifest
    #[arg(long, global = true, default_value = ".")]
    app_dir: PathBuf,

    /// Skip reading and writing the boot cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot the application and summarize the result
    Boot,
    /// Print the merged configuration, or a single dotted key, as JSON
    Config {
        /// Dotted path such as `database.host`
        key: Option<String>,
    },
    /// List registered packages
    Packages {
        /// List the framework packages declared by the manifest instead
        #[arg(long)]
        framework: bool,
    },
    /// List the packages installed according to the lock file
    Manifest,
}

fn boot(args: &CliArgs) -> kiln_core::Result<Kernel> {
    KernelBuilder::new(&args.app_dir)
        .package::<LoggingPackage>()
        .cache(!args.no_cache)
        .boot()
}

fn run(args: &CliArgs) -> Result<(), Box<dyn StdError>> {
    match &args.command {
        None | Some(Commands::Boot) => {
            let kernel = boot(args)?;
            let name = kernel.manifest().project().name.as_deref().unwrap_or("application");
            println!(
                "Booted {} with {} package(s){}",
                name,
                kernel.packages().len(),
                if kernel.is_from_cache() { " (from cache)" } else { "" }
            );
            for identifier in kernel.packages().identifiers() {
                println!("  - {}", identifier);
            }
        }
        Some(Commands::Config { key }) => {
            let kernel = boot(args)?;
            let value = match key {
                Some(key) => kernel
                    .config()
                    .get_value(key)
                    .cloned()
                    .ok_or_else(|| format!("Configuration key '{}' not found", key))?,
                None => kernel.config().to_value(),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Some(Commands::Packages { framework: false }) => {
            let kernel = boot(args)?;
            for identifier in kernel.packages().identifiers() {
                println!("{}", identifier);
            }
        }
        Some(Commands::Packages { framework: true }) => {
            let kernel = boot(args)?;
            for descriptor in kernel.framework_packages()? {
                println!(
                    "{} -> {}",
                    descriptor.name,
                    descriptor.package_identifier().unwrap_or_default()
                );
            }
        }
        Some(Commands::Manifest) => {
            let path = args.app_dir.join(constants::DEFAULT_MANIFEST_FILE);
            let manifest = ManifestReader::new().read(&path)?;
            for descriptor in manifest.packages()? {
                println!(
                    "{} {} ({}){}",
                    descriptor.name,
                    descriptor.version.as_deref().unwrap_or("*"),
                    descriptor.kind,
                    if descriptor.dev { " [dev]" } else { "" }
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    logging::init(args.verbose);
    info!("{} v{}", constants::APP_NAME, constants::APP_VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
