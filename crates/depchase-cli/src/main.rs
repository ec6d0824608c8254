mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::flatpak_report::FlatpakReportArgs;
use commands::list_rpms::ListRpmsArgs;
use commands::resolve_packages::ResolvePackagesArgs;
use commands::resolve_requires::ResolveRequiresArgs;
use commands::GlobalArgs;

#[derive(Parser, Debug)]
#[command(name = "depchase")]
#[command(about = "Find the packages needed to satisfy a set of RPM packages or requirements")]
#[command(version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find all packages needed to install the given packages
    ResolvePackages(ResolvePackagesArgs),

    /// Find the packages that satisfy the given requirements
    ResolveRequires(ResolveRequiresArgs),

    /// Report runtime and bundled packages for Flatpak applications
    FlatpakReport(FlatpakReportArgs),

    /// List every package in the configured sources as JSON
    ListRpms(ListRpmsArgs),
}

fn run() -> Result<i32> {
    let Args { global, command } = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(global.verbosity().log_filter()),
    )
    .init();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        match command {
            Commands::ResolvePackages(cmd) => commands::resolve_packages::execute(&global, cmd).await,
            Commands::ResolveRequires(cmd) => commands::resolve_requires::execute(&global, cmd).await,
            Commands::FlatpakReport(cmd) => commands::flatpak_report::execute(&global, cmd).await,
            Commands::ListRpms(cmd) => commands::list_rpms::execute(&global, cmd).await,
        }
    })
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
