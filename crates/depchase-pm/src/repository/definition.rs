use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::json::JsonSource;
use super::traits::SourceKind;
use crate::error::{DepchaseError, Result};

/// A configured metadata source, as written in `depchase.toml` or given as
/// `NAME:PATH` on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Source name
    pub name: String,
    /// JSON file or directory, relative paths are resolved against the config file
    pub path: PathBuf,
    /// Official or local
    #[serde(default)]
    pub kind: SourceKind,
    /// Explicit priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl SourceDefinition {
    /// Parse a `NAME:PATH` argument.
    pub fn parse_arg(arg: &str, kind: SourceKind) -> Result<Self> {
        match arg.split_once(':') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
                kind,
                priority: None,
            }),
            _ => Err(DepchaseError::Config(format!(
                "invalid source \"{}\", expected NAME:PATH",
                arg
            ))),
        }
    }

    pub fn into_source(self, base_dir: &Path) -> JsonSource {
        let path = if self.path.is_absolute() {
            self.path
        } else {
            base_dir.join(self.path)
        };
        let source = JsonSource::new(self.name, path, self.kind);
        match self.priority {
            Some(priority) => source.with_priority(priority),
            None => source,
        }
    }
}
