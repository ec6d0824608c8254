//! Resolve command - packages to install for a list of requirements.

use anyhow::{Context, Result};
use clap::Args;

use depchase_pm::RootSet;

use super::{run_resolution, GlobalArgs, ResolveOptions};

#[derive(Args, Debug)]
pub struct ResolveRequiresArgs {
    /// Capabilities to resolve, such as "libgtk-3.so.0()(64bit)" or "/usr/bin/python3"
    #[arg(value_name = "REQUIRES", required = true)]
    pub requires: Vec<String>,

    #[command(flatten)]
    pub options: ResolveOptions,
}

pub async fn execute(global: &GlobalArgs, args: ResolveRequiresArgs) -> Result<i32> {
    run_resolution(global, roots(&args)?, &args.options)
}

/// Requirements are matched against every provide and file list
fn roots(args: &ResolveRequiresArgs) -> Result<RootSet> {
    RootSet::from_provides(&args.requires).context("Invalid requirement list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use depchase_pm::{ArraySource, Capability, PackageCandidate, Policy, Pool, SourceKind};
    use depchase_rpmver::Evr;
    use std::collections::BTreeSet;

    use crate::commands::resolve_manifest;
    use crate::output::{Output, Verbosity};

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: ResolveRequiresArgs,
    }

    fn pool() -> Pool {
        let mut bar = PackageCandidate::new("bar", Evr::parse("2.0-1").unwrap(), "noarch");
        bar.provides.push(Capability::parse("foo").unwrap());
        let foo = PackageCandidate::new("foo", Evr::parse("1.0-1").unwrap(), "x86_64");

        let source = ArraySource::new("fedora", SourceKind::Official).with_candidates([foo, bar]);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        builder.build().unwrap()
    }

    fn resolve(argv: &[&str]) -> anyhow::Result<Vec<String>> {
        let cli = Cli::try_parse_from(argv)?;
        let manifest = resolve_manifest(
            &pool(),
            &Policy::new(),
            &roots(&cli.args)?,
            &cli.args.options,
            BTreeSet::new(),
            &Output::new(Verbosity::Quiet),
        )?;
        Ok(manifest.entries().iter().map(|e| e.name.clone()).collect())
    }

    #[test]
    fn test_selects_best_provider() {
        assert_eq!(resolve(&["depchase", "foo"]).unwrap(), vec!["bar"]);
        assert_eq!(resolve(&["depchase", "--verify", "foo >= 2"]).unwrap(), vec!["bar"]);
    }

    #[test]
    fn test_arch_suffix_is_part_of_the_capability() {
        assert!(resolve(&["depchase", "foo.x86_64"]).is_err());
        assert!(resolve(&["depchase", "(foo or bar)"]).is_err());
    }
}
