use std::fmt;

use depchase_rpmver::{Evr, Operator};
use serde::Serialize;

use super::capability::Capability;
use crate::util::rpm_name_only;

/// A concrete, installable package offered by one metadata source.
#[derive(Debug, Clone, Serialize)]
pub struct PackageCandidate {
    pub name: String,
    pub evr: Evr,
    pub arch: String,

    /// Name of the source that offered this candidate
    pub repo: String,
    pub source_priority: i32,

    /// Position of the offering source in load order
    #[serde(skip)]
    pub load_index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcerpm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    pub provides: Vec<Capability>,
    pub requires: Vec<Capability>,
    pub weak_requires: Vec<Capability>,
    pub conflicts: Vec<Capability>,
    pub obsoletes: Vec<Capability>,
    pub files: Vec<String>,

    /// Boolean dependencies, kept verbatim and never followed
    pub rich_requires: Vec<String>,
}

impl PackageCandidate {
    pub fn new(name: impl Into<String>, evr: Evr, arch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evr,
            arch: arch.into(),
            repo: String::new(),
            source_priority: 0,
            load_index: 0,
            sourcerpm: None,
            summary: None,
            provides: Vec::new(),
            requires: Vec::new(),
            weak_requires: Vec::new(),
            conflicts: Vec::new(),
            obsoletes: Vec::new(),
            files: Vec::new(),
            rich_requires: Vec::new(),
        }
    }

    /// The `name = evr` capability every package provides.
    pub fn self_provide(&self) -> Capability {
        Capability::versioned(self.name.clone(), Operator::Equal, self.evr.clone())
    }

    pub fn provides_capability(&self, capability: &Capability) -> bool {
        if capability.satisfied_by(&self.self_provide()) {
            return true;
        }
        if self.provides.iter().any(|p| capability.satisfied_by(p)) {
            return true;
        }
        capability.is_file()
            && capability.constraint().is_none()
            && self.files.iter().any(|f| f == capability.name())
    }

    /// Check whether this package's conflicts or obsoletes exclude `other`.
    /// Returns a human readable reason.
    pub fn excludes(&self, other: &PackageCandidate) -> Option<String> {
        if let Some(conflict) = self.conflicts.iter().find(|c| other.provides_capability(c)) {
            return Some(format!("{} conflicts with {}", self.nevra(), conflict));
        }

        let obsoleted = self.obsoletes.iter().find(|o| {
            o.name() == other.name
                && o.constraint().map_or(true, |c| c.matches(&other.evr))
        });
        obsoleted.map(|o| format!("{} obsoletes {}", self.nevra(), o))
    }

    /// Whether either package excludes the other.
    pub fn conflicts_with(&self, other: &PackageCandidate) -> Option<String> {
        self.excludes(other).or_else(|| other.excludes(self))
    }

    /// `name-[epoch:]version-release.arch`
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.evr, self.arch)
    }

    /// Name of the source package this binary was built from.
    pub fn source_name(&self) -> Option<&str> {
        self.sourcerpm.as_deref().map(|srpm| {
            let nvr = srpm
                .strip_suffix(".src.rpm")
                .or_else(|| srpm.strip_suffix(".nosrc.rpm"))
                .unwrap_or(srpm);
            rpm_name_only(nvr)
        })
    }
}

impl fmt::Display for PackageCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nevra())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, evr: &str) -> PackageCandidate {
        PackageCandidate::new(name, Evr::parse(evr).unwrap(), "x86_64")
    }

    fn cap(s: &str) -> Capability {
        Capability::parse(s).unwrap()
    }

    #[test]
    fn test_self_provide() {
        let b = pkg("b", "2.0-1");
        assert!(b.provides_capability(&cap("b")));
        assert!(b.provides_capability(&cap("b >= 2")));
        assert!(!b.provides_capability(&cap("b >= 3")));
    }

    #[test]
    fn test_explicit_and_file_provides() {
        let mut b = pkg("bash", "5.2-1");
        b.provides.push(cap("/bin/sh"));
        b.files.push("/usr/bin/bash".to_string());
        assert!(b.provides_capability(&cap("/bin/sh")));
        assert!(b.provides_capability(&cap("/usr/bin/bash")));
        assert!(!b.provides_capability(&cap("/usr/bin/zsh")));
    }

    #[test]
    fn test_conflicts_both_directions() {
        let mut a = pkg("a", "1.0-1");
        a.conflicts.push(cap("b < 2"));
        let old_b = pkg("b", "1.0-1");
        let new_b = pkg("b", "2.0-1");

        assert!(a.conflicts_with(&old_b).is_some());
        assert!(old_b.conflicts_with(&a).is_some());
        assert!(a.conflicts_with(&new_b).is_none());
    }

    #[test]
    fn test_obsoletes_match_name_only() {
        let mut a = pkg("a", "1.0-1");
        a.obsoletes.push(cap("old-a"));
        let mut provider = pkg("other", "1.0-1");
        provider.provides.push(cap("old-a"));

        assert!(a.conflicts_with(&pkg("old-a", "0.5-1")).is_some());
        assert!(a.conflicts_with(&provider).is_none());
    }

    #[test]
    fn test_nevra_and_source_name() {
        let mut p = pkg("glib2", "1:2.80.0-1.fc40");
        p.sourcerpm = Some("glib2-2.80.0-1.fc40.src.rpm".to_string());
        assert_eq!(p.nevra(), "glib2-1:2.80.0-1.fc40.x86_64");
        assert_eq!(p.source_name(), Some("glib2"));
    }
}
