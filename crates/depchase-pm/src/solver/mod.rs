//! Greedy dependency closure resolver for RPM packages.
//!
//! Unlike a full SAT solver this resolver never backtracks: every capability
//! is bound to a single provider the first time it is seen, and later
//! requirements reuse that choice whenever they can.
//!
//! # Architecture
//!
//! - [`Pool`]: Every candidate from every loaded source, indexed by name and
//!   by provided capability
//! - [`Policy`]: Weak dependency handling, exclusions, architecture rules and
//!   hints
//! - [`RootSet`]: What needs to be resolved
//! - [`Resolver`]: The breadth-first closure algorithm
//! - [`ResolvedSet`]: The selected candidates and why each was selected
//!
//! # Example
//!
//! ```ignore
//! use depchase_pm::solver::{Policy, Pool, Resolver, RootSet};
//!
//! let pool = Pool::load(&sources)?;
//! let mut roots = RootSet::new();
//! roots.require("gtk3");
//!
//! let policy = Policy::new().include_weak(false);
//! let resolved = Resolver::new(&pool, &policy).resolve(&roots)?;
//! ```

mod policy;
mod pool;
mod request;
mod resolved;
mod resolver;


pub use policy::Policy;
pub use pool::{CandidateId, Pool, PoolBuilder, SourceInfo};
pub use request::{RootItem, RootKind, RootSet};
pub use resolved::{Ambiguity, Binding, FilteredEdge, Reason, ResolvedSet};
pub use resolver::Resolver;
