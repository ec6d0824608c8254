use std::collections::VecDeque;
use std::time::Instant;

use super::policy::Policy;
use super::pool::{CandidateId, Pool};
use super::request::{RootKind, RootSet};
use super::resolved::{Ambiguity, Binding, FilteredEdge, Reason, ResolvedSet};
use crate::error::{DepchaseError, Result};
use crate::package::{Capability, PackageCandidate};

/// Kind of a pending dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeKind {
    Root(RootKind),
    Requires,
    Weak,
}

/// A capability waiting to be bound
#[derive(Debug, Clone)]
struct WorkItem {
    capability: Capability,
    requested_by: Option<String>,
    kind: EdgeKind,
}

/// Greedy breadth-first dependency closure resolver.
///
/// Capabilities are processed in FIFO order, root items first. A capability
/// that an already selected package satisfies never selects another one.
/// Otherwise the most preferred provider that does not conflict with the
/// current selection is bound and its dependencies are queued.
pub struct Resolver<'a> {
    pool: &'a Pool,
    policy: &'a Policy,
}

impl<'a> Resolver<'a> {
    pub fn new(pool: &'a Pool, policy: &'a Policy) -> Self {
        Self { pool, policy }
    }

    /// Compute the closure of a root set.
    pub fn resolve(&self, roots: &RootSet) -> Result<ResolvedSet> {
        let start = Instant::now();
        log::debug!(
            "Resolving {} root items against {} candidates",
            roots.len(),
            self.pool.len()
        );

        let mut resolved = ResolvedSet::new();
        let mut queue: VecDeque<WorkItem> = roots
            .items()
            .map(|root| WorkItem {
                capability: root.capability.clone(),
                requested_by: None,
                kind: EdgeKind::Root(root.kind),
            })
            .collect();

        let mut processed = 0usize;
        while let Some(item) = queue.pop_front() {
            processed += 1;
            self.process(item, roots, &mut resolved, &mut queue)?;
        }

        log::info!(
            "Resolved {} packages from {} root items in {:.3} seconds",
            resolved.len(),
            roots.len(),
            start.elapsed().as_secs_f64()
        );
        log::debug!("Processed {} dependency edges", processed);

        Ok(resolved)
    }

    fn process(
        &self,
        item: WorkItem,
        roots: &RootSet,
        resolved: &mut ResolvedSet,
        queue: &mut VecDeque<WorkItem>,
    ) -> Result<()> {
        if !self.policy.follows(&item.capability) {
            log::debug!("Skipping {}", item.capability);
            return Ok(());
        }
        if let Some(by) = &item.requested_by {
            if self.policy.ignores(by, &item.capability) {
                log::debug!("Ignoring {} required by {}", item.capability, by);
                return Ok(());
            }
        }

        let (capability, providers) = match item.kind {
            EdgeKind::Root(RootKind::Package) => self.named_candidates(&item.capability),
            _ => (
                item.capability.clone(),
                self.pool.find_providers(&item.capability),
            ),
        };
        let capability = &capability;

        let providers: Vec<CandidateId> = providers
            .into_iter()
            .filter(|&id| self.policy.accepts_arch(&self.candidate(id).arch))
            .collect();

        // Reuse an existing choice whenever it satisfies the capability
        if let Some(&id) = providers
            .iter()
            .find(|&&id| resolved.bound_id(&self.candidate(id).name) == Some(id))
        {
            log::debug!("{} already satisfied by {}", capability, self.candidate(id));
            return Ok(());
        }

        // A name can only be bound once
        let providers: Vec<CandidateId> = providers
            .into_iter()
            .filter(|&id| !resolved.contains(&self.candidate(id).name))
            .collect();

        if providers.is_empty() {
            if item.kind == EdgeKind::Weak {
                log::debug!(
                    "Skipping unsatisfiable weak dependency {} of {}",
                    capability,
                    item.requested_by.as_deref().unwrap_or_default()
                );
                return Ok(());
            }
            return Err(self.unsatisfied(&item, resolved));
        }

        // Exclusions never apply to root items naming a package directly
        let (allowed, excluded): (Vec<CandidateId>, Vec<CandidateId>) =
            providers.into_iter().partition(|&id| {
                let name = &self.candidate(id).name;
                matches!(item.kind, EdgeKind::Root(_))
                    || roots.contains(name)
                    || !self.policy.is_excluded(name)
            });

        if allowed.is_empty() {
            let excluded: Vec<String> = excluded
                .iter()
                .map(|&id| self.candidate(id).name.clone())
                .collect();
            log::debug!(
                "Not following {} required by {}: provided only by excluded {}",
                capability,
                item.requested_by.as_deref().unwrap_or_default(),
                excluded.join(", ")
            );
            resolved.record_filtered(FilteredEdge {
                package: item.requested_by.clone().unwrap_or_default(),
                capability: capability.clone(),
                excluded,
            });
            return Ok(());
        }

        let ordered = self.policy.select_preferred(self.pool, &allowed);

        let mut chosen = None;
        let mut first_conflict = None;
        for &id in &ordered {
            match self.find_conflict(id, resolved) {
                None => {
                    chosen = Some(id);
                    break;
                }
                Some(conflict) => {
                    log::debug!(
                        "Skipping {} for {}: {}",
                        self.candidate(id),
                        capability,
                        conflict.1
                    );
                    if first_conflict.is_none() {
                        first_conflict = Some((id, conflict));
                    }
                }
            }
        }

        let id = match (chosen, first_conflict) {
            (Some(id), _) => id,
            (None, _) if item.kind == EdgeKind::Weak => {
                log::debug!("Skipping weak dependency {}: every provider conflicts", capability);
                return Ok(());
            }
            (None, Some((id, (bound, reason)))) => {
                return Err(DepchaseError::Conflict {
                    a: bound,
                    b: self.candidate(id).name.clone(),
                    reason,
                });
            }
            (None, None) => {
                return Err(DepchaseError::Internal(format!(
                    "no provider left for {}",
                    capability
                )));
            }
        };

        self.check_ambiguity(capability, id, &ordered, resolved);

        let candidate = self.candidate(id);
        let reason = match &item.requested_by {
            None => Reason::Requested {
                capability: capability.clone(),
            },
            Some(by) => Reason::Required {
                by: by.clone(),
                capability: capability.clone(),
                weak: item.kind == EdgeKind::Weak,
            },
        };
        log::debug!("Selected {} for {}", candidate, capability);
        resolved.bind(candidate.name.clone(), Binding { id, reason });

        for capability in &candidate.requires {
            queue.push_back(WorkItem {
                capability: capability.clone(),
                requested_by: Some(candidate.name.clone()),
                kind: EdgeKind::Requires,
            });
        }
        if self.policy.include_weak {
            for capability in &candidate.weak_requires {
                queue.push_back(WorkItem {
                    capability: capability.clone(),
                    requested_by: Some(candidate.name.clone()),
                    kind: EdgeKind::Weak,
                });
            }
        }
        for rich in &candidate.rich_requires {
            log::debug!("Not following boolean dependency {} of {}", rich, candidate.name);
        }

        Ok(())
    }

    /// Check that a resolved set is closed and conflict free under this
    /// resolver's pool and policy.
    pub fn verify(&self, resolved: &ResolvedSet) -> Result<()> {
        let selected: Vec<(&str, &PackageCandidate)> = resolved
            .iter()
            .map(|(name, binding)| {
                self.pool
                    .candidate(binding.id)
                    .map(|c| (name, c.as_ref()))
                    .ok_or_else(|| {
                        DepchaseError::Internal(format!("{} is bound to unknown candidate", name))
                    })
            })
            .collect::<Result<_>>()?;

        for (name, candidate) in &selected {
            if candidate.name != *name {
                return Err(DepchaseError::Internal(format!(
                    "{} is bound to {}",
                    name,
                    candidate.nevra()
                )));
            }

            for capability in &candidate.requires {
                if !self.policy.follows(capability) || self.policy.ignores(name, capability) {
                    continue;
                }
                let satisfied = selected.iter().any(|(_, c)| c.provides_capability(capability));
                let filtered = resolved
                    .filtered_edges()
                    .iter()
                    .any(|edge| edge.package == *name && edge.capability == *capability);
                if !satisfied && !filtered {
                    return Err(DepchaseError::Internal(format!(
                        "{} requires {} but nothing selected provides it",
                        candidate.nevra(),
                        capability
                    )));
                }
            }
        }

        for (i, (_, a)) in selected.iter().enumerate() {
            for (_, b) in &selected[i + 1..] {
                if let Some(reason) = a.conflicts_with(b) {
                    return Err(DepchaseError::Internal(format!(
                        "selected packages conflict: {}",
                        reason
                    )));
                }
            }
        }

        Ok(())
    }

    /// Candidates named by a package root, and the capability they are
    /// bound for. `name.arch` selects one architecture when no package is
    /// called `name.arch`.
    fn named_candidates(&self, capability: &Capability) -> (Capability, Vec<CandidateId>) {
        let name = capability.name();
        let (capability, arch) = match name.rsplit_once('.') {
            Some((base, arch)) if self.pool.lookup(name).is_empty() => {
                (capability.renamed(base), Some(arch))
            }
            _ => (capability.clone(), None),
        };

        let ids = self
            .pool
            .lookup(capability.name())
            .iter()
            .copied()
            .filter(|&id| {
                let candidate = self.candidate(id);
                arch.map_or(true, |arch| candidate.arch == arch)
                    && capability.satisfied_by(&candidate.self_provide())
            })
            .collect();
        (capability, ids)
    }

    fn candidate(&self, id: CandidateId) -> &'a PackageCandidate {
        // Ids only ever come from this pool
        &self.pool.candidates_slice()[id]
    }

    /// First selected package that conflicts with a candidate, and why
    fn find_conflict(&self, id: CandidateId, resolved: &ResolvedSet) -> Option<(String, String)> {
        let candidate = self.candidate(id);
        resolved.iter().find_map(|(name, binding)| {
            let bound = self.candidate(binding.id);
            bound
                .conflicts_with(candidate)
                .map(|reason| (name.to_string(), reason))
        })
    }

    fn check_ambiguity(
        &self,
        capability: &Capability,
        chosen: CandidateId,
        ordered: &[CandidateId],
        resolved: &mut ResolvedSet,
    ) {
        let alternatives: Vec<CandidateId> = ordered
            .iter()
            .copied()
            .filter(|&id| id != chosen && self.policy.is_tie(self.pool, chosen, id))
            .collect();
        if alternatives.is_empty() {
            return;
        }

        let names: Vec<String> = alternatives
            .iter()
            .map(|&id| self.candidate(id).nevra())
            .collect();
        log::warn!(
            "Multiple packages provide {}: chose {} over {}",
            capability,
            self.candidate(chosen).nevra(),
            names.join(", ")
        );
        resolved.record_ambiguity(Ambiguity {
            capability: capability.clone(),
            chosen,
            alternatives,
        });
    }

    fn unsatisfied(&self, item: &WorkItem, resolved: &ResolvedSet) -> DepchaseError {
        let chain = item
            .requested_by
            .as_deref()
            .map(|by| resolved.path_to(by))
            .unwrap_or_default();
        DepchaseError::UnsatisfiedDependency {
            capability: item.capability.to_string(),
            requested_by: item.requested_by.clone(),
            chain,
        }
    }
}
