use anyhow::{Context, Result};
use depchase_pm::{ArchFilter, SourceDefinition};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The depchase configuration file structure (depchase.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DepchaseConfig {
    /// Resolution defaults
    pub options: OptionsConfig,

    /// Extra architectures installable on each architecture
    #[serde(rename = "arch-compat")]
    pub arch_compat: BTreeMap<String, Vec<String>>,

    /// Metadata sources, in load order
    pub sources: Vec<SourceDefinition>,

    /// Directory relative source paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Resolution defaults, overridden by command line flags
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptionsConfig {
    /// Architecture to resolve for
    pub arch: Option<String>,

    /// Follow weak dependencies
    pub include_weak: Option<bool>,

    /// Package name globs never pulled in as dependencies
    pub exclude: Vec<String>,

    /// Packages preferred when several providers exist, glibc-minimal-langpack
    /// unless set
    pub hints: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            arch: None,
            include_weak: None,
            exclude: Vec::new(),
            hints: vec!["glibc-minimal-langpack".to_string()],
        }
    }
}

impl DepchaseConfig {
    pub const FILE_NAME: &'static str = "depchase.toml";

    /// Load configuration from depchase.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(Self::FILE_NAME);

            if config_path.exists() {
                return Self::load_file(&config_path).map(Some);
            }

            // Move to parent directory
            if !current.pop() {
                // Reached filesystem root, no config found
                return Ok(None);
            }
        }
    }

    /// Load configuration by searching upward from the current working directory
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    /// Load a specific configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: DepchaseConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Architecture filter for `arch` using the configured compat table
    pub fn arch_filter(&self, arch: &str) -> ArchFilter {
        self.arch_compat
            .iter()
            .fold(ArchFilter::new(arch), |filter, (arch, compat)| {
                filter.with_compat(arch.clone(), compat.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depchase_pm::SourceKind;

    #[test]
    fn test_parse_empty_config() {
        let config: DepchaseConfig = toml::from_str("").unwrap();
        assert!(config.sources.is_empty());
        assert!(config.options.arch.is_none());
        assert!(config.options.exclude.is_empty());
        assert_eq!(config.options.hints, vec!["glibc-minimal-langpack"]);
    }

    #[test]
    fn test_configured_hints_replace_default() {
        let config: DepchaseConfig =
            toml::from_str("[options]\nhints = [\"glibc-all-langpacks\"]\n").unwrap();
        assert_eq!(config.options.hints, vec!["glibc-all-langpacks"]);

        let config: DepchaseConfig = toml::from_str("[options]\narch = \"x86_64\"\n").unwrap();
        assert_eq!(config.options.hints, vec!["glibc-minimal-langpack"]);
        assert_eq!(DepchaseConfig::default().options.hints, config.options.hints);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[options]
arch = "x86_64"
include-weak = true
exclude = ["*-devel", "kernel*"]
hints = ["glibc-minimal-langpack"]

[arch-compat]
x86_64 = ["i686"]
i686 = ["i586"]

[[sources]]
name = "f40"
path = "metadata/f40.json"

[[sources]]
name = "mine"
path = "/srv/local"
kind = "local"
priority = 50
"#;
        let config: DepchaseConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.options.arch.as_deref(), Some("x86_64"));
        assert_eq!(config.options.include_weak, Some(true));
        assert_eq!(config.options.exclude, vec!["*-devel", "kernel*"]);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].kind, SourceKind::Official);
        assert_eq!(config.sources[1].kind, SourceKind::Local);
        assert_eq!(config.sources[1].priority, Some(50));

        let filter = config.arch_filter("x86_64");
        assert_eq!(filter.score("i586"), Some(3));
    }

    #[test]
    fn test_load_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DepchaseConfig::FILE_NAME),
            "[options]\narch = \"aarch64\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = DepchaseConfig::load(&nested).unwrap().unwrap();
        assert_eq!(config.options.arch.as_deref(), Some("aarch64"));
        assert_eq!(config.base_dir, dir.path());
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[options\n").unwrap();

        let err = DepchaseConfig::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
