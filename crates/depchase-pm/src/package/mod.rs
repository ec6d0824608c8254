//! Package model: candidates, capabilities and architecture rules

mod arch;
mod candidate;
mod capability;

pub use arch::ArchFilter;
pub use candidate::PackageCandidate;
pub use capability::Capability;
