use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::package::PackageCandidate;

/// Kind of a metadata source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Distribution repository
    #[default]
    Official,
    /// Locally built packages, always preferred over official ones
    Local,
}

impl SourceKind {
    /// Priority used when a source does not set one
    pub fn default_priority(&self) -> i32 {
        match self {
            SourceKind::Official => 0,
            SourceKind::Local => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Official => "official",
            SourceKind::Local => "local",
        }
    }
}

/// Metadata source interface - a read-only set of package candidates
pub trait MetadataSource: Send + Sync {
    /// Unique name of this source, reported in the manifest
    fn name(&self) -> &str;

    /// Whether this is an official or a local source
    fn kind(&self) -> SourceKind {
        SourceKind::Official
    }

    /// Higher priority sources win over lower ones
    fn priority(&self) -> i32 {
        self.kind().default_priority()
    }

    /// Load every candidate this source offers
    fn list_candidates(&self) -> Result<Vec<PackageCandidate>>;
}
