//! Subcommands and the setup they share: configuration, sources, policy.

pub mod flatpak_report;
pub mod list_rpms;
pub mod resolve_packages;
pub mod resolve_requires;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use depchase_pm::{
    read_package_list, Manifest, ManifestEmitter, ManifestEntry, MetadataSource, Policy, Pool,
    Resolver, RootSet, SourceDefinition, SourceKind,
};

use crate::config::DepchaseConfig;
use crate::output::{Output, Verbosity};

/// Options accepted by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print results and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: depchase.toml in the current or a parent directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Architecture to resolve for
    #[arg(short, long, global = true)]
    pub arch: Option<String>,

    /// Official metadata source
    #[arg(short = 'r', long = "repo", value_name = "NAME:PATH", global = true)]
    pub repos: Vec<String>,

    /// Local build metadata source, preferred over official sources
    #[arg(short = 'l', long = "local-repo", value_name = "NAME:PATH", global = true)]
    pub local_repos: Vec<String>,

    /// Follow weak dependencies (Recommends)
    #[arg(long, global = true)]
    pub include_weak: bool,

    /// Never pull in packages matching PATTERN as dependencies
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN", global = true)]
    pub exclude: Vec<String>,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::from_count(self.verbose)
        }
    }
}

/// Options shared by the resolve commands
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Output dependencies in JSON format
    #[arg(long = "json")]
    pub json: bool,

    /// Group output by source package
    #[arg(long)]
    pub source: bool,

    /// Ignore the dependency of PKG on DEP
    #[arg(long = "ignore-requires", value_name = "PKG:DEP")]
    pub ignore_requires: Vec<String>,

    /// List of packages to assume are already installed
    #[arg(long, value_name = "PACKAGE_LIST")]
    pub preinstalled: Option<PathBuf>,

    /// Check that the result is closed under its dependencies and free of conflicts
    #[arg(long)]
    pub verify: bool,
}

/// Loaded configuration and package pool
pub struct Session {
    pub config: DepchaseConfig,
    pub pool: Arc<Pool>,
}

impl Session {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = match &global.config {
            Some(path) => DepchaseConfig::load_file(path)?,
            None => DepchaseConfig::load_from_cwd()?.unwrap_or_default(),
        };

        let sources = build_sources(global, &config)?;
        let pool = Pool::load(&sources).context("Failed to load package metadata")?;

        Ok(Self {
            config,
            pool: Arc::new(pool),
        })
    }

    /// Build the resolution policy from configuration and command line
    pub fn policy(
        &self,
        global: &GlobalArgs,
        ignore_requires: &[String],
        hints: &BTreeSet<String>,
    ) -> Result<Policy> {
        build_policy(global, &self.config, ignore_requires, hints)
    }
}

fn build_sources(
    global: &GlobalArgs,
    config: &DepchaseConfig,
) -> Result<Vec<Box<dyn MetadataSource>>> {
    let cwd = std::env::current_dir()?;
    let mut sources: Vec<Box<dyn MetadataSource>> = Vec::new();

    for def in &config.sources {
        sources.push(Box::new(def.clone().into_source(&config.base_dir)));
    }
    for arg in &global.repos {
        let def = SourceDefinition::parse_arg(arg, SourceKind::Official)?;
        sources.push(Box::new(def.into_source(&cwd)));
    }
    for arg in &global.local_repos {
        let def = SourceDefinition::parse_arg(arg, SourceKind::Local)?;
        sources.push(Box::new(def.into_source(&cwd)));
    }

    if sources.is_empty() {
        bail!(
            "No metadata sources configured; pass --repo NAME:PATH or add [[sources]] to {}",
            DepchaseConfig::FILE_NAME
        );
    }
    Ok(sources)
}

fn build_policy(
    global: &GlobalArgs,
    config: &DepchaseConfig,
    ignore_requires: &[String],
    hints: &BTreeSet<String>,
) -> Result<Policy> {
    let include_weak = global.include_weak || config.options.include_weak.unwrap_or(false);
    let mut policy = Policy::new().include_weak(include_weak);

    for pattern in config.options.exclude.iter().chain(&global.exclude) {
        policy = policy.exclude(pattern)?;
    }

    if let Some(arch) = global.arch.as_ref().or(config.options.arch.as_ref()) {
        policy = policy.arch_filter(config.arch_filter(arch));
    }

    for entry in ignore_requires {
        let Some((package, dependency)) = entry.split_once(':') else {
            bail!("Invalid --ignore-requires \"{}\", expected PKG:DEP", entry);
        };
        policy = policy.ignore_requires(package, dependency);
    }

    Ok(policy
        .hints(config.options.hints.iter().cloned())
        .hints(hints.iter().cloned()))
}

/// Resolve a root set and print the manifest; shared by resolve-packages
/// and resolve-requires
pub fn run_resolution(global: &GlobalArgs, roots: RootSet, options: &ResolveOptions) -> Result<i32> {
    let output = Output::new(global.verbosity());
    let session = Session::load(global)?;
    output.verbose(&format!(
        "Loaded {} candidates from {} sources",
        session.pool.len(),
        session.pool.sources().len()
    ));

    let preinstalled = match &options.preinstalled {
        Some(path) => read_package_list(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => BTreeSet::new(),
    };

    let policy = session.policy(global, &options.ignore_requires, &preinstalled)?;
    let manifest = resolve_manifest(&session.pool, &policy, &roots, options, preinstalled, &output)?;

    println!("{}", render_manifest(&manifest, options.json, options.source)?);
    Ok(0)
}

/// Resolve the roots and build the manifest, skipping preinstalled packages
pub fn resolve_manifest(
    pool: &Pool,
    policy: &Policy,
    roots: &RootSet,
    options: &ResolveOptions,
    preinstalled: BTreeSet<String>,
    output: &Output,
) -> Result<Manifest> {
    let resolver = Resolver::new(pool, policy);
    let resolved = resolver.resolve(roots)?;

    if options.verify {
        resolver
            .verify(&resolved)
            .context("Resolved package set failed verification")?;
        output.verbose(&format!("Verified {} packages", resolved.len()));
    }

    for edge in resolved.filtered_edges() {
        output.verbose(&format!(
            "Not following {} required by {}: provided only by excluded {}",
            edge.capability,
            edge.package,
            edge.excluded.join(", ")
        ));
    }

    Ok(ManifestEmitter::new()
        .skip(preinstalled)
        .with_explanations(true)
        .emit(pool, &resolved)?)
}

/// Render a manifest as text or JSON, optionally grouped by source package
pub fn render_manifest(manifest: &Manifest, json: bool, by_source: bool) -> Result<String> {
    if json {
        if by_source {
            let grouped: BTreeMap<String, Vec<ManifestEntry>> = manifest
                .group_by_source()
                .into_iter()
                .map(|(source, entries)| {
                    let entries: Vec<ManifestEntry> = entries
                        .into_iter()
                        .map(|e| ManifestEntry {
                            source: None,
                            ..e.clone()
                        })
                        .collect();
                    (source, entries)
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&grouped)?);
        }
        return Ok(manifest.to_json()?);
    }

    let mut lines = Vec::new();
    if by_source {
        for (source, entries) in manifest.group_by_source() {
            lines.push(source);
            for entry in entries {
                lines.push(format!("    {}", entry.name));
                for line in entry.explanation_lines() {
                    lines.push(format!("        {}", line));
                }
            }
        }
    } else {
        for entry in manifest.entries() {
            lines.push(entry.name.clone());
            for line in entry.explanation_lines() {
                lines.push(format!("     {}", line));
            }
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use depchase_pm::{ArraySource, Capability, PackageCandidate};
    use depchase_rpmver::Evr;

    fn pkg(name: &str, requires: &[&str]) -> PackageCandidate {
        let mut p = PackageCandidate::new(name, Evr::parse("1.0-1").unwrap(), "noarch");
        p.requires = requires.iter().map(|r| Capability::parse(r).unwrap()).collect();
        p.sourcerpm = Some(format!("{}-1.0-1.src.rpm", name.trim_end_matches("-libs")));
        p
    }

    fn manifest() -> Manifest {
        let source = ArraySource::new("fedora", SourceKind::Official).with_candidates([
            pkg("app", &["app-libs"]),
            pkg("app-libs", &[]),
        ]);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        let pool = builder.build().unwrap();

        let roots = RootSet::from_specs(["app"]).unwrap();
        let resolved = Resolver::new(&pool, &Policy::new()).resolve(&roots).unwrap();
        ManifestEmitter::new()
            .with_explanations(true)
            .emit(&pool, &resolved)
            .unwrap()
    }

    #[test]
    fn test_render_text() {
        let text = render_manifest(&manifest(), false, false).unwrap();
        assert_eq!(
            text,
            "app\n     <in input>\napp-libs\n     app requires app-libs, provided by app-libs"
        );
    }

    #[test]
    fn test_render_grouped_text() {
        let text = render_manifest(&manifest(), false, true).unwrap();
        assert!(text.starts_with("app\n    app\n        <in input>\n    app-libs\n"));
    }

    #[test]
    fn test_render_grouped_json_drops_source() {
        let json = render_manifest(&manifest(), true, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let group = value["app"].as_array().unwrap();
        assert_eq!(group.len(), 2);
        assert!(group[0].get("source").is_none());
        assert_eq!(group[1]["name"], "app-libs");
    }

    #[test]
    fn test_render_json() {
        let json = render_manifest(&manifest(), true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["nevra"], "app-1.0-1.noarch");
        assert_eq!(value[0]["repo"], "fedora");
        assert_eq!(value[1]["explanation"][0], "app");
    }

    #[test]
    fn test_verify_flag() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            options: ResolveOptions,
        }

        let cli = Cli::try_parse_from(["depchase", "--verify", "--json"]).unwrap();
        assert!(cli.options.verify);
        assert!(!Cli::try_parse_from(["depchase"]).unwrap().options.verify);

        let source = ArraySource::new("fedora", SourceKind::Official).with_candidates([
            pkg("app", &["app-libs"]),
            pkg("app-libs", &[]),
            pkg("base", &[]),
        ]);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        let pool = builder.build().unwrap();

        let roots = RootSet::from_specs(["app", "base"]).unwrap();
        let manifest = resolve_manifest(
            &pool,
            &Policy::new(),
            &roots,
            &cli.options,
            BTreeSet::from(["base".to_string()]),
            &Output::new(Verbosity::Quiet),
        )
        .unwrap();
        let names: Vec<&str> = manifest.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["app", "app-libs"]);
    }

    #[test]
    fn test_build_policy_merges_config_and_flags() {
        let config: DepchaseConfig = toml::from_str(
            "[options]\narch = \"x86_64\"\nexclude = [\"*-devel\"]\nhints = [\"a\"]\n",
        )
        .unwrap();
        let global = GlobalArgs {
            exclude: vec!["kernel*".to_string()],
            ..GlobalArgs::default()
        };
        let hints = BTreeSet::from(["b".to_string()]);
        let policy = build_policy(&global, &config, &["x:y".to_string()], &hints).unwrap();

        assert!(policy.is_excluded("foo-devel"));
        assert!(policy.is_excluded("kernel-core"));
        assert!(policy.is_hinted("a"));
        assert!(policy.is_hinted("b"));
        assert!(!policy.accepts_arch("aarch64"));
        assert!(!policy.include_weak);
        assert!(policy.ignores("x", &Capability::parse("y").unwrap()));
    }

    #[test]
    fn test_build_policy_rejects_bad_ignore_requires() {
        let config = DepchaseConfig::default();
        let result = build_policy(
            &GlobalArgs::default(),
            &config,
            &["no-separator".to_string()],
            &BTreeSet::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sources_required() {
        let err = build_sources(&GlobalArgs::default(), &DepchaseConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("No metadata sources configured"));
    }
}
