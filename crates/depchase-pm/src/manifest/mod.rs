//! Resolved package manifests
//!
//! A manifest is the resolved set flattened into `(name, evr, arch)` rows,
//! sorted by package name so that repeated runs produce identical output.

use std::collections::{BTreeMap, BTreeSet};

use depchase_rpmver::Evr;
use serde::Serialize;

use crate::error::{DepchaseError, Result};
use crate::solver::{Pool, ResolvedSet};

/// One selected package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub evr: Evr,
    pub arch: String,
    pub nevra: String,
    /// Source the candidate was taken from
    pub repo: String,
    /// Source package name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Why the package was selected, see [`ResolvedSet::explain`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Vec<String>>,
}

impl ManifestEntry {
    /// Human readable explanation, one line per link of the chain
    pub fn explanation_lines(&self) -> Vec<String> {
        let Some(chain) = &self.explanation else {
            return vec!["<in input>".to_string()];
        };

        let mut lines = Vec::new();
        let mut start = 0;
        if chain.len() % 2 == 0 && chain.len() >= 2 {
            lines.push(format!("{} is provided by {}", chain[0], chain[1]));
            start = 1;
        }
        let mut i = start;
        while i + 2 < chain.len() {
            lines.push(format!(
                "{} requires {}, provided by {}",
                chain[i],
                chain[i + 1],
                chain[i + 2]
            ));
            i += 2;
        }
        lines
    }
}

/// Ordered list of selected packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// `name-[epoch:]version-release.arch` lines
    pub fn nevra_lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.nevra.clone()).collect()
    }

    /// Entries grouped by source package name. Entries without a known
    /// source package are grouped under their own name.
    pub fn group_by_source(&self) -> BTreeMap<String, Vec<&ManifestEntry>> {
        let mut groups: BTreeMap<String, Vec<&ManifestEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let key = entry.source.clone().unwrap_or_else(|| entry.name.clone());
            groups.entry(key).or_default().push(entry);
        }
        groups
    }

    /// Source package names, sorted
    pub fn source_names(&self) -> BTreeSet<String> {
        self.group_by_source().into_keys().collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Turns a resolved set into a [`Manifest`]
#[derive(Debug, Clone, Default)]
pub struct ManifestEmitter {
    /// Package names left out of the manifest
    skip: BTreeSet<String>,
    /// Attach explanation chains to the entries
    explain: bool,
}

impl ManifestEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave these package names out, e.g. packages already in a runtime
    pub fn skip<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_explanations(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn emit(&self, pool: &Pool, resolved: &ResolvedSet) -> Result<Manifest> {
        let mut entries = Vec::with_capacity(resolved.len());

        for (name, binding) in resolved.iter() {
            if self.skip.contains(name) {
                continue;
            }
            let candidate = pool.candidate(binding.id).ok_or_else(|| {
                DepchaseError::Internal(format!("{} has no recorded candidate", name))
            })?;

            entries.push(ManifestEntry {
                name: candidate.name.clone(),
                evr: candidate.evr.clone(),
                arch: candidate.arch.clone(),
                nevra: candidate.nevra(),
                repo: candidate.repo.clone(),
                source: candidate.source_name().map(str::to_string),
                explanation: if self.explain {
                    resolved.explain(name)
                } else {
                    None
                },
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("Emitting manifest with {} entries", entries.len());

        Ok(Manifest { entries })
    }
}
