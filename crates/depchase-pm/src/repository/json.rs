//! JSON metadata source - package records exported from repository metadata.
//!
//! A source path is either a single JSON file holding an array of records,
//! or a directory whose `*.json` files each hold such an array:
//!
//! ```json
//! [
//!     {
//!         "name": "glib2",
//!         "epoch": 0,
//!         "version": "2.80.0",
//!         "release": "1.fc40",
//!         "arch": "x86_64",
//!         "sourcerpm": "glib2-2.80.0-1.fc40.src.rpm",
//!         "provides": ["libglib-2.0.so.0()(64bit)"],
//!         "requires": ["libc.so.6()(64bit)", "(glib2-fam if fam)"],
//!         "recommends": ["shared-mime-info"],
//!         "files": ["/usr/lib64/libglib-2.0.so.0"]
//!     }
//! ]
//! ```

use std::path::{Path, PathBuf};

use depchase_rpmver::Evr;
use serde::{Deserialize, Serialize};

use super::traits::{MetadataSource, SourceKind};
use crate::error::{DepchaseError, Result};
use crate::package::{Capability, PackageCandidate};

/// One package as it appears in a JSON metadata file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageRecord {
    pub name: String,
    pub epoch: Option<u32>,
    pub version: String,
    pub release: Option<String>,
    pub arch: String,
    pub sourcerpm: Option<String>,
    pub summary: Option<String>,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
    pub recommends: Vec<String>,
    pub conflicts: Vec<String>,
    pub obsoletes: Vec<String>,
    pub files: Vec<String>,
}

impl PackageRecord {
    pub fn into_candidate(self) -> Result<PackageCandidate> {
        if self.name.is_empty() || self.version.is_empty() || self.arch.is_empty() {
            return Err(DepchaseError::InvalidCapability(format!(
                "record is missing name, version or arch: {:?}",
                self.name
            )));
        }

        // rpm reports a missing epoch as 0
        let epoch = self.epoch.filter(|epoch| *epoch != 0);
        let evr = Evr::new(epoch, self.version, self.release);
        let mut candidate = PackageCandidate::new(self.name, evr, self.arch);
        candidate.sourcerpm = self.sourcerpm;
        candidate.summary = self.summary;
        candidate.files = self.files;
        candidate.provides = parse_plain(&self.provides)?;
        candidate.conflicts = parse_plain(&self.conflicts)?;
        candidate.obsoletes = parse_plain(&self.obsoletes)?;

        for dep in &self.requires {
            if Capability::is_rich(dep) {
                candidate.rich_requires.push(dep.clone());
            } else {
                candidate.requires.push(Capability::parse(dep)?);
            }
        }
        for dep in &self.recommends {
            if Capability::is_rich(dep) {
                candidate.rich_requires.push(dep.clone());
            } else {
                candidate.weak_requires.push(Capability::parse(dep)?);
            }
        }

        Ok(candidate)
    }
}

fn parse_plain(deps: &[String]) -> Result<Vec<Capability>> {
    deps.iter()
        .filter(|dep| !Capability::is_rich(dep))
        .map(|dep| Capability::parse(dep))
        .collect()
}

/// Metadata source backed by JSON files on disk
#[derive(Debug, Clone)]
pub struct JsonSource {
    /// Source name
    name: String,
    /// JSON file or directory of JSON files
    path: PathBuf,
    /// Source kind
    kind: SourceKind,
    /// Explicit priority, if any
    priority: Option<i32>,
}

impl JsonSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse one JSON document into candidates.
    pub fn parse_records(&self, content: &str) -> Result<Vec<PackageCandidate>> {
        let records: Vec<PackageRecord> =
            serde_json::from_str(content).map_err(|e| self.load_error(e))?;
        records
            .into_iter()
            .map(|record| record.into_candidate().map_err(|e| self.load_error(e)))
            .collect()
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.path.exists() {
            return Err(self.load_error(format!("{} does not exist", self.path.display())));
        }
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let pattern = format!(
            "{}/*.json",
            glob::Pattern::escape(&self.path.to_string_lossy())
        );
        let mut files = glob::glob(&pattern)
            .map_err(|e| self.load_error(e))?
            .map(|entry| entry.map_err(|e| self.load_error(e)))
            .collect::<Result<Vec<PathBuf>>>()?;
        files.sort();
        Ok(files)
    }

    fn load_error(&self, reason: impl std::fmt::Display) -> DepchaseError {
        DepchaseError::UnknownSource {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl MetadataSource for JsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| self.kind.default_priority())
    }

    fn list_candidates(&self) -> Result<Vec<PackageCandidate>> {
        let mut candidates = Vec::new();
        for file in self.files()? {
            let content = std::fs::read_to_string(&file)
                .map_err(|e| self.load_error(format!("{}: {}", file.display(), e)))?;
            candidates.extend(self.parse_records(&content)?);
        }
        log::debug!(
            "Loaded {} candidates from source '{}' ({})",
            candidates.len(),
            self.name,
            self.path.display()
        );
        Ok(candidates)
    }
}
