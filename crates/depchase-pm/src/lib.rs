pub mod error;
pub mod manifest;
pub mod package;
pub mod repository;
pub mod solver;
pub mod util;

pub use error::{DepchaseError, Result};
pub use manifest::{Manifest, ManifestEmitter, ManifestEntry};
pub use package::{ArchFilter, Capability, PackageCandidate};
pub use repository::{ArraySource, JsonSource, MetadataSource, SourceDefinition, SourceKind};
pub use solver::{
    CandidateId, Policy, Pool, PoolBuilder, Reason, ResolvedSet, Resolver, RootKind, RootSet,
};
pub use util::{read_package_list, rpm_name_only};
