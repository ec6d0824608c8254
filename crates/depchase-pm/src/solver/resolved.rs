use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::pool::{CandidateId, Pool};
use crate::package::{Capability, PackageCandidate};

/// Why a package was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Named (or provided for) a root item
    Requested { capability: Capability },
    /// Pulled in by a dependency of another selected package
    Required {
        by: String,
        capability: Capability,
        weak: bool,
    },
}

/// A package name bound to the chosen candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: CandidateId,
    pub reason: Reason,
}

/// A capability that had several equally preferred providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub capability: Capability,
    pub chosen: CandidateId,
    pub alternatives: Vec<CandidateId>,
}

/// A dependency that was not followed because every provider was excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredEdge {
    pub package: String,
    pub capability: Capability,
    pub excluded: Vec<String>,
}

/// Outcome of a resolution: exactly one candidate per selected package
/// name, with the reason each one was selected.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    bindings: BTreeMap<String, Binding>,
    order: Vec<String>,
    ambiguities: Vec<Ambiguity>,
    filtered: Vec<FilteredEdge>,
}

impl ResolvedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, name: String, binding: Binding) {
        if self.bindings.insert(name.clone(), binding).is_none() {
            self.order.push(name);
        }
    }

    pub(crate) fn record_ambiguity(&mut self, ambiguity: Ambiguity) {
        self.ambiguities.push(ambiguity);
    }

    pub(crate) fn record_filtered(&mut self, edge: FilteredEdge) {
        self.filtered.push(edge);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn bound_id(&self, name: &str) -> Option<CandidateId> {
        self.bindings.get(name).map(|b| b.id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound package names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Bound package names in the order they were discovered
    pub fn discovery_order(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, b)| (name.as_str(), b))
    }

    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    pub fn filtered_edges(&self) -> &[FilteredEdge] {
        &self.filtered
    }

    /// The chosen candidates, sorted by package name.
    pub fn candidates<'p>(&'p self, pool: &'p Pool) -> impl Iterator<Item = &'p Arc<PackageCandidate>> {
        self.bindings.values().filter_map(|b| pool.candidate(b.id))
    }

    /// Package names from a root item down to `name`, following the
    /// "required by" links.
    pub fn path_to(&self, name: &str) -> Vec<String> {
        let mut path = vec![name.to_string()];
        let mut seen = BTreeSet::from([name.to_string()]);
        let mut current = name;

        while let Some(Binding {
            reason: Reason::Required { by, .. },
            ..
        }) = self.bindings.get(current)
        {
            if !seen.insert(by.clone()) {
                break;
            }
            path.push(by.clone());
            current = by.as_str();
        }

        path.reverse();
        path
    }

    /// Explanation chain for a package, alternating package names and the
    /// capabilities that linked them: `[a, "b >= 2", b, libc.so.6, glibc]`.
    ///
    /// When the root item was a capability rather than the package name the
    /// chain starts with that capability. Returns `None` for packages that
    /// were named directly.
    pub fn explain(&self, name: &str) -> Option<Vec<String>> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = name.to_string();

        loop {
            if !seen.insert(current.clone()) {
                break;
            }
            match &self.bindings.get(&current)?.reason {
                Reason::Requested { capability } => {
                    if capability.name() != current {
                        chain.push(current.clone());
                        chain.push(capability.to_string());
                    } else if chain.is_empty() {
                        return None;
                    } else {
                        chain.push(current.clone());
                    }
                    break;
                }
                Reason::Required { by, capability, .. } => {
                    chain.push(current.clone());
                    chain.push(capability.to_string());
                    current = by.clone();
                }
            }
        }

        chain.reverse();
        Some(chain)
    }
}
