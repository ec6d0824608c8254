//! Resolve command - all dependencies of a set of packages.

use anyhow::{Context, Result};
use clap::Args;

use depchase_pm::RootSet;

use super::{run_resolution, GlobalArgs, ResolveOptions};

#[derive(Args, Debug)]
pub struct ResolvePackagesArgs {
    /// Packages to resolve as NAME or NAME.ARCH, optionally with a version range ("bash >= 5")
    #[arg(value_name = "PKGS", required = true)]
    pub pkgs: Vec<String>,

    #[command(flatten)]
    pub options: ResolveOptions,
}

pub async fn execute(global: &GlobalArgs, args: ResolvePackagesArgs) -> Result<i32> {
    run_resolution(global, roots(&args)?, &args.options)
}

/// Packages are selected by name, or by `name.arch`
fn roots(args: &ResolvePackagesArgs) -> Result<RootSet> {
    RootSet::from_specs(&args.pkgs).context("Invalid package list")
}
