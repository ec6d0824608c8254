use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use depchase_rpmver::Evr;

use crate::error::{DepchaseError, Result};
use crate::package::{Capability, PackageCandidate};
use crate::repository::{MetadataSource, SourceKind};

/// Index of a candidate in the pool.
pub type CandidateId = usize;

/// A source that contributed candidates to the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub kind: SourceKind,
    pub priority: i32,
    /// Number of candidates kept from this source
    pub candidates: usize,
}

/// Pool of every candidate offered by the loaded sources.
///
/// Candidate ids follow preference order: higher source priority first,
/// then higher EVR, then earlier source load order. Every lookup returns
/// ids in that order. The pool is immutable once built and can be shared
/// between resolutions.
#[derive(Debug, Default)]
pub struct Pool {
    /// All candidates indexed by id
    candidates: Vec<Arc<PackageCandidate>>,

    /// Candidate ids indexed by package name
    by_name: BTreeMap<String, Vec<CandidateId>>,

    /// Candidate ids indexed by provided capability name, including package
    /// names and files
    providers: BTreeMap<String, Vec<CandidateId>>,

    /// Loaded sources, in load order
    sources: Vec<SourceInfo>,
}

impl Pool {
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Load every source in order and build the pool.
    pub fn load(sources: &[Box<dyn MetadataSource>]) -> Result<Self> {
        let mut builder = PoolBuilder::new();
        for source in sources {
            builder.add_source(source.as_ref())?;
        }
        builder.build()
    }

    /// Candidates with the given package name, most preferred first.
    pub fn lookup(&self, name: &str) -> &[CandidateId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidates providing a capability, most preferred first.
    pub fn find_providers(&self, capability: &Capability) -> Vec<CandidateId> {
        self.providers
            .get(capability.name())
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&id| self.candidates[id].provides_capability(capability))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Arc<PackageCandidate>> {
        self.candidates.get(id)
    }

    pub(crate) fn candidates_slice(&self) -> &[Arc<PackageCandidate>] {
        &self.candidates
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateId, &Arc<PackageCandidate>)> {
        self.candidates.iter().enumerate()
    }

    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Preference order of two candidates, most preferred first.
    pub fn compare(a: &PackageCandidate, b: &PackageCandidate) -> Ordering {
        b.source_priority
            .cmp(&a.source_priority)
            .then_with(|| b.evr.cmp(&a.evr))
            .then_with(|| a.load_index.cmp(&b.load_index))
    }
}

/// Builder for [`Pool`]
#[derive(Debug, Default)]
pub struct PoolBuilder {
    candidates: Vec<PackageCandidate>,
    sources: Vec<SourceInfo>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the candidates of a source. Sources must be added in load order.
    pub fn add_source(&mut self, source: &dyn MetadataSource) -> Result<&mut Self> {
        let load_index = self.sources.len();
        let mut candidates = source.list_candidates()?;
        for candidate in &mut candidates {
            candidate.repo = source.name().to_string();
            candidate.source_priority = source.priority();
            candidate.load_index = load_index;
        }

        log::debug!(
            "Source '{}' ({}, priority {}) offers {} candidates",
            source.name(),
            source.kind().as_str(),
            source.priority(),
            candidates.len()
        );

        self.sources.push(SourceInfo {
            name: source.name().to_string(),
            kind: source.kind(),
            priority: source.priority(),
            candidates: candidates.len(),
        });
        self.candidates.extend(candidates);
        Ok(self)
    }

    pub fn build(mut self) -> Result<Pool> {
        self.check_priorities()?;

        self.candidates.sort_by(Pool::compare);

        let mut pool = Pool {
            sources: self.sources,
            ..Pool::default()
        };
        for info in &mut pool.sources {
            info.candidates = 0;
        }

        // Versions compare the rpm way, so "1.0" and "1.00" are the same build
        let mut seen: BTreeSet<(String, Evr, String, i32)> = BTreeSet::new();
        for candidate in self.candidates {
            let key = (
                candidate.name.clone(),
                candidate.evr.clone(),
                candidate.arch.clone(),
                candidate.source_priority,
            );
            if !seen.insert(key) {
                log::warn!(
                    "Ignoring duplicate candidate {} from source '{}'",
                    candidate.nevra(),
                    candidate.repo
                );
                continue;
            }

            let id = pool.candidates.len();
            pool.by_name.entry(candidate.name.clone()).or_default().push(id);

            let provided = std::iter::once(candidate.name.as_str())
                .chain(candidate.provides.iter().map(|p| p.name()))
                .chain(candidate.files.iter().map(String::as_str));
            for name in provided {
                let ids = pool.providers.entry(name.to_string()).or_default();
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }

            pool.sources[candidate.load_index].candidates += 1;
            pool.candidates.push(Arc::new(candidate));
        }

        log::info!(
            "Pool contains {} candidates from {} sources",
            pool.candidates.len(),
            pool.sources.len()
        );

        Ok(pool)
    }

    /// Every local source must outrank every official one.
    fn check_priorities(&self) -> Result<()> {
        let lowest_local = self
            .sources
            .iter()
            .filter(|s| s.kind == SourceKind::Local)
            .min_by_key(|s| s.priority);
        let highest_official = self
            .sources
            .iter()
            .filter(|s| s.kind == SourceKind::Official)
            .max_by_key(|s| s.priority);

        match (lowest_local, highest_official) {
            (Some(local), Some(official)) if local.priority <= official.priority => {
                Err(DepchaseError::Config(format!(
                    "local source '{}' (priority {}) must have a higher priority than official source '{}' (priority {})",
                    local.name, local.priority, official.name, official.priority
                )))
            }
            _ => Ok(()),
        }
    }
}
