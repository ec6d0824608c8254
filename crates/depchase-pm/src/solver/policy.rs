use std::collections::BTreeSet;

use glob::Pattern;

use super::pool::{CandidateId, Pool};
use crate::error::{DepchaseError, Result};
use crate::package::{ArchFilter, Capability};

/// Policy for following dependency edges and choosing between providers.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Follow weak dependencies (Recommends)
    pub include_weak: bool,
    /// Package name globs that are never pulled in as dependencies
    exclude_patterns: Vec<Pattern>,
    /// Allowed architectures, all are allowed when unset
    pub arch_filter: Option<ArchFilter>,
    /// `(package, dependency)` edges that are never followed
    ignore_requires: BTreeSet<(String, String)>,
    /// Package names preferred whenever they can satisfy a dependency
    hints: BTreeSet<String>,
}

impl Policy {
    /// Create a new policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether weak dependencies are followed
    pub fn include_weak(mut self, include: bool) -> Self {
        self.include_weak = include;
        self
    }

    /// Exclude packages matching a glob such as `*-devel`
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|e| {
            DepchaseError::Config(format!("invalid exclude pattern \"{}\": {}", pattern, e))
        })?;
        self.exclude_patterns.push(pattern);
        Ok(self)
    }

    /// Restrict candidates to an architecture
    pub fn arch_filter(mut self, filter: ArchFilter) -> Self {
        self.arch_filter = Some(filter);
        self
    }

    /// Never follow `dependency` when it is required by `package`
    pub fn ignore_requires(mut self, package: &str, dependency: &str) -> Self {
        self.ignore_requires
            .insert((package.to_string(), dependency.to_string()));
        self
    }

    /// Prefer these packages when choosing providers
    pub fn hints<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches(name))
    }

    pub fn is_hinted(&self, name: &str) -> bool {
        self.hints.contains(name)
    }

    pub fn accepts_arch(&self, arch: &str) -> bool {
        match &self.arch_filter {
            Some(filter) => filter.accepts(arch),
            None => true,
        }
    }

    /// Architecture score, lower is better
    pub fn arch_score(&self, arch: &str) -> u32 {
        self.arch_filter
            .as_ref()
            .and_then(|filter| filter.score(arch))
            .unwrap_or(1)
    }

    /// Whether an edge from `package` to `capability` is ignored by
    /// configuration. Matches either the full dependency or its name.
    pub fn ignores(&self, package: &str, capability: &Capability) -> bool {
        self.ignore_requires
            .contains(&(package.to_string(), capability.to_string()))
            || self
                .ignore_requires
                .contains(&(package.to_string(), capability.name().to_string()))
    }

    /// Whether a dependency should be followed at all
    pub fn follows(&self, capability: &Capability) -> bool {
        !capability.is_rpmlib()
    }

    /// Sort providers by preference (best first):
    /// 1. Hinted packages
    /// 2. Higher source priority
    /// 3. Higher EVR
    /// 4. Better architecture score
    /// 5. Earlier source load order
    pub fn select_preferred(&self, pool: &Pool, candidates: &[CandidateId]) -> Vec<CandidateId> {
        let mut sorted: Vec<CandidateId> = candidates
            .iter()
            .copied()
            .filter(|&id| pool.candidate(id).is_some())
            .collect();

        sorted.sort_by(|&a, &b| {
            let (Some(pa), Some(pb)) = (pool.candidate(a), pool.candidate(b)) else {
                return a.cmp(&b);
            };
            self.is_hinted(&pb.name)
                .cmp(&self.is_hinted(&pa.name))
                .then_with(|| pb.source_priority.cmp(&pa.source_priority))
                .then_with(|| pb.evr.cmp(&pa.evr))
                .then_with(|| self.arch_score(&pa.arch).cmp(&self.arch_score(&pb.arch)))
                .then_with(|| pa.load_index.cmp(&pb.load_index))
                .then_with(|| a.cmp(&b))
        });

        sorted
    }

    /// Whether two candidates are equally preferred, which makes choosing
    /// between them arbitrary
    pub fn is_tie(&self, pool: &Pool, a: CandidateId, b: CandidateId) -> bool {
        match (pool.candidate(a), pool.candidate(b)) {
            (Some(pa), Some(pb)) => {
                self.is_hinted(&pa.name) == self.is_hinted(&pb.name)
                    && pa.source_priority == pb.source_priority
                    && pa.evr == pb.evr
                    && self.arch_score(&pa.arch) == self.arch_score(&pb.arch)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageCandidate;
    use crate::repository::{ArraySource, SourceKind};
    use depchase_rpmver::Evr;

    fn pkg(name: &str, evr: &str, arch: &str) -> PackageCandidate {
        PackageCandidate::new(name, Evr::parse(evr).unwrap(), arch)
    }

    fn pool(candidates: Vec<PackageCandidate>) -> Pool {
        let source = ArraySource::new("fedora", SourceKind::Official).with_candidates(candidates);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        builder.build().unwrap()
    }

    fn names(pool: &Pool, ids: &[CandidateId]) -> Vec<String> {
        ids.iter()
            .map(|&id| pool.candidate(id).unwrap().nevra())
            .collect()
    }

    #[test]
    fn test_exclude_patterns() {
        let policy = Policy::new().exclude("*-devel").unwrap().exclude("kernel*").unwrap();
        assert!(policy.is_excluded("glib2-devel"));
        assert!(policy.is_excluded("kernel-core"));
        assert!(!policy.is_excluded("glib2"));
        assert!(Policy::new().exclude("[").is_err());
    }

    #[test]
    fn test_ignore_requires_by_name_or_full_dependency() {
        let policy = Policy::new()
            .ignore_requires("a", "b")
            .ignore_requires("c", "d >= 2");
        assert!(policy.ignores("a", &Capability::parse("b >= 1").unwrap()));
        assert!(policy.ignores("c", &Capability::parse("d >= 2").unwrap()));
        assert!(!policy.ignores("c", &Capability::parse("d").unwrap()));
        assert!(!policy.ignores("x", &Capability::parse("b").unwrap()));
    }

    #[test]
    fn test_rpmlib_not_followed() {
        let policy = Policy::new();
        assert!(!policy.follows(&Capability::parse("rpmlib(PayloadIsZstd)").unwrap()));
        assert!(policy.follows(&Capability::parse("glibc").unwrap()));
    }

    #[test]
    fn test_select_preferred_evr_then_arch() {
        let pool = pool(vec![
            pkg("foo", "1.0-1", "i686"),
            pkg("foo", "1.0-1", "x86_64"),
            pkg("foo", "0.9-1", "x86_64"),
        ]);
        let policy = Policy::new().arch_filter(
            ArchFilter::new("x86_64").with_compat("x86_64", vec!["i686".to_string()]),
        );
        let all: Vec<CandidateId> = pool.lookup("foo").to_vec();
        assert_eq!(
            names(&pool, &policy.select_preferred(&pool, &all)),
            vec!["foo-1.0-1.x86_64", "foo-1.0-1.i686", "foo-0.9-1.x86_64"]
        );
    }

    #[test]
    fn test_select_preferred_hints_first() {
        let pool = pool(vec![pkg("new", "2.0-1", "noarch"), pkg("runtime", "1.0-1", "noarch")]);
        let policy = Policy::new().hints(["runtime"]);
        let ids: Vec<CandidateId> = pool.iter().map(|(id, _)| id).collect();
        let sorted = policy.select_preferred(&pool, &ids);
        assert_eq!(pool.candidate(sorted[0]).unwrap().name, "runtime");
    }

    #[test]
    fn test_is_tie() {
        let pool = pool(vec![pkg("one", "1.0-1", "noarch"), pkg("two", "1.0-1", "noarch")]);
        let policy = Policy::new();
        assert!(policy.is_tie(&pool, 0, 1));
        assert!(!Policy::new().hints(["one"]).is_tie(&pool, 0, 1));
    }
}
