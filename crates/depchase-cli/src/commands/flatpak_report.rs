//! Flatpak report - which runtime packages each application uses and
//! which extra packages it has to bundle.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

use depchase_pm::{read_package_list, Policy, Pool, Resolver, RootSet};

use super::{GlobalArgs, Session};
use crate::output::Output;

#[derive(Args, Debug)]
pub struct FlatpakReportArgs {
    /// Package list of the runtime the applications are built against
    #[arg(long, value_name = "PROFILE_FILE", required = true)]
    pub runtime_profile: PathBuf,

    /// Application packages
    #[arg(value_name = "PKGS", required = true)]
    pub pkgs: Vec<String>,
}

/// One binary package seen in the runtime or in an application closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageUsage {
    pub name: String,
    pub runtime: bool,
    pub used_by: Vec<String>,
    pub srpm: Option<String>,
}

/// Closure of one application split into runtime and bundled packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatpakUsage {
    pub runtime: Vec<String>,
    pub extra: Vec<String>,
    pub srpm: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct FlatpakReport {
    pub packages: BTreeMap<String, PackageUsage>,
    pub flatpaks: BTreeMap<String, FlatpakUsage>,
}

pub async fn execute(global: &GlobalArgs, args: FlatpakReportArgs) -> Result<i32> {
    let output = Output::new(global.verbosity());
    output.info("Initializing");

    let runtime = read_package_list(&args.runtime_profile)
        .with_context(|| format!("Failed to read {}", args.runtime_profile.display()))?;
    let session = Session::load(global)?;
    let policy = Arc::new(session.policy(global, &[], &runtime)?);

    let mut tasks = JoinSet::new();
    for (index, pkg) in args.pkgs.iter().enumerate() {
        output.info(&format!("Calculating deps for {}", pkg));

        let pool = Arc::clone(&session.pool);
        let policy = Arc::clone(&policy);
        let pkg = pkg.clone();
        tasks.spawn_blocking(move || {
            let closure = resolve_closure(&pool, &policy, &pkg);
            (index, pkg, closure)
        });
    }

    let mut results = Vec::with_capacity(args.pkgs.len());
    while let Some(res) = tasks.join_next().await {
        let (index, pkg, closure) = res.context("Resolution task failed")?;
        match closure {
            Ok(names) => results.push((index, pkg, names)),
            Err(e) => output.warning(&format!("Skipping {}: {}", pkg, e)),
        }
    }
    results.sort_by_key(|(index, _, _)| *index);

    let results: Vec<(String, BTreeSet<String>)> = results
        .into_iter()
        .map(|(_, pkg, names)| (pkg, names))
        .collect();
    let report = build_report(&session.pool, &runtime, &results);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

fn resolve_closure(pool: &Pool, policy: &Policy, pkg: &str) -> Result<BTreeSet<String>> {
    let roots = RootSet::from_specs([pkg])?;
    let resolved = Resolver::new(pool, policy).resolve(&roots)?;
    Ok(resolved.names().map(str::to_string).collect())
}

fn srpm_for(pool: &Pool, name: &str) -> Option<String> {
    pool.lookup(name)
        .first()
        .and_then(|id| pool.candidate(*id))
        .and_then(|c| c.source_name().map(str::to_string))
}

/// Build the report from the closure of each application, in the order
/// the applications were given
pub fn build_report(
    pool: &Pool,
    runtime: &BTreeSet<String>,
    results: &[(String, BTreeSet<String>)],
) -> FlatpakReport {
    let mut report = FlatpakReport::default();

    for name in runtime {
        report.packages.insert(
            name.clone(),
            PackageUsage {
                name: name.clone(),
                runtime: true,
                used_by: Vec::new(),
                srpm: srpm_for(pool, name),
            },
        );
    }

    for (pkg, all) in results {
        let extra: Vec<String> = all
            .iter()
            .filter(|name| *name != pkg && !runtime.contains(*name))
            .cloned()
            .collect();
        let used: Vec<String> = all
            .iter()
            .filter(|name| *name != pkg && runtime.contains(*name))
            .cloned()
            .collect();

        report.flatpaks.insert(
            pkg.clone(),
            FlatpakUsage {
                runtime: used,
                extra,
                srpm: srpm_for(pool, pkg),
            },
        );

        for name in all.iter().filter(|name| *name != pkg) {
            report
                .packages
                .entry(name.clone())
                .or_insert_with(|| PackageUsage {
                    name: name.clone(),
                    runtime: false,
                    used_by: Vec::new(),
                    srpm: srpm_for(pool, name),
                })
                .used_by
                .push(pkg.clone());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use depchase_pm::{ArraySource, Capability, PackageCandidate, SourceKind};
    use depchase_rpmver::Evr;

    fn pkg(name: &str, srpm: &str, requires: &[&str]) -> PackageCandidate {
        let mut p = PackageCandidate::new(name, Evr::parse("1.0-1").unwrap(), "x86_64");
        p.requires = requires.iter().map(|r| Capability::parse(r).unwrap()).collect();
        p.sourcerpm = Some(format!("{}-1.0-1.src.rpm", srpm));
        p
    }

    fn pool() -> Pool {
        let source = ArraySource::new("fedora", SourceKind::Official).with_candidates([
            pkg("eog", "eog", &["gtk3", "libexif"]),
            pkg("gnome-maps", "gnome-maps", &["gtk3", "geoclue2-libs"]),
            pkg("gtk3", "gtk3", &["glibc"]),
            pkg("glibc", "glibc", &[]),
            pkg("libexif", "libexif", &["glibc"]),
            pkg("geoclue2-libs", "geoclue2", &["glibc"]),
        ]);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_build_report() {
        let pool = pool();
        let runtime = BTreeSet::from(["gtk3".to_string(), "glibc".to_string()]);
        let policy = Policy::new().hints(runtime.iter().cloned());

        let results: Vec<(String, BTreeSet<String>)> = ["eog", "gnome-maps"]
            .into_iter()
            .map(|app| (app.to_string(), resolve_closure(&pool, &policy, app).unwrap()))
            .collect();
        let report = build_report(&pool, &runtime, &results);

        let eog = &report.flatpaks["eog"];
        assert_eq!(eog.runtime, vec!["glibc", "gtk3"]);
        assert_eq!(eog.extra, vec!["libexif"]);
        assert_eq!(eog.srpm.as_deref(), Some("eog"));

        let gtk3 = &report.packages["gtk3"];
        assert!(gtk3.runtime);
        assert_eq!(gtk3.used_by, vec!["eog", "gnome-maps"]);

        let geoclue = &report.packages["geoclue2-libs"];
        assert!(!geoclue.runtime);
        assert_eq!(geoclue.used_by, vec!["gnome-maps"]);
        assert_eq!(geoclue.srpm.as_deref(), Some("geoclue2"));

        assert!(!report.packages.contains_key("eog"));
    }

    #[test]
    fn test_unused_runtime_package_is_listed() {
        let pool = pool();
        let runtime = BTreeSet::from(["glibc".to_string(), "missing".to_string()]);
        let report = build_report(&pool, &runtime, &[]);

        assert!(report.packages["glibc"].used_by.is_empty());
        assert_eq!(report.packages["missing"].srpm, None);
        assert!(report.flatpaks.is_empty());
    }

    #[test]
    fn test_unknown_application_fails_to_resolve() {
        let pool = pool();
        assert!(resolve_closure(&pool, &Policy::new(), "nonexistent").is_err());
    }

    #[test]
    fn test_report_json_shape() {
        let pool = pool();
        let runtime = BTreeSet::from(["glibc".to_string()]);
        let closure = resolve_closure(&pool, &Policy::new(), "libexif").unwrap();
        let report = build_report(&pool, &runtime, &[("libexif".to_string(), closure)]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["flatpaks"]["libexif"]["runtime"][0], "glibc");
        assert_eq!(value["packages"]["glibc"]["used_by"][0], "libexif");
    }
}
