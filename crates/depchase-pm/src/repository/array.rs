use super::traits::{MetadataSource, SourceKind};
use crate::error::Result;
use crate::package::PackageCandidate;

/// In-memory source, used for tests and for packages assembled by hand
#[derive(Debug, Clone)]
pub struct ArraySource {
    /// Source name
    name: String,
    /// Source kind
    kind: SourceKind,
    /// Explicit priority, if any
    priority: Option<i32>,
    /// Offered candidates
    candidates: Vec<PackageCandidate>,
}

impl ArraySource {
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            priority: None,
            candidates: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn add(&mut self, candidate: PackageCandidate) -> &mut Self {
        self.candidates.push(candidate);
        self
    }

    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = PackageCandidate>) -> Self {
        self.candidates.extend(candidates);
        self
    }
}

impl MetadataSource for ArraySource {
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
        Ok(self.candidates.clone())
    }
}
