use depchase_rpmver::{Evr, Operator};
use indexmap::IndexMap;

use crate::error::Result;
use crate::package::Capability;

/// How a root item selects candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// A package name, optionally `name.arch`; only packages with that
    /// name are considered
    Package,
    /// Any package providing the capability
    Capability,
}

/// One requested item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootItem {
    pub capability: Capability,
    pub kind: RootKind,
}

/// The set of root items to resolve: package names or capabilities, each
/// with an optional version range.
#[derive(Debug, Clone, Default)]
pub struct RootSet {
    /// Root items grouped by name. Every item is kept, so repeating a name
    /// with different ranges checks each range.
    /// Uses IndexMap to preserve insertion order, which decides processing order
    pub requires: IndexMap<String, Vec<RootItem>>,
}

impl RootSet {
    /// Create a new empty root set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a root set of packages from `name`, `name.arch` or
    /// `name OP evr` strings
    pub fn from_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roots = Self::new();
        for spec in specs {
            roots.add_spec(spec.as_ref())?;
        }
        Ok(roots)
    }

    /// Build a root set of capabilities such as `libfoo.so.1()(64bit)` or
    /// `/usr/bin/python3`
    pub fn from_provides<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roots = Self::new();
        for spec in specs {
            roots.add_provides_spec(spec.as_ref())?;
        }
        Ok(roots)
    }

    /// Add an unversioned package
    pub fn require(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(Capability::new(name), RootKind::Package)
    }

    /// Add a package restricted to a version range
    pub fn require_versioned(
        &mut self,
        name: impl Into<String>,
        operator: Operator,
        evr: Evr,
    ) -> &mut Self {
        self.push(Capability::versioned(name, operator, evr), RootKind::Package)
    }

    /// Add a capability
    pub fn require_capability(&mut self, capability: Capability) -> &mut Self {
        self.push(capability, RootKind::Capability)
    }

    /// Add a package given as `name` or `name OP evr`
    pub fn add_spec(&mut self, spec: &str) -> Result<&mut Self> {
        let capability = Capability::parse(spec)?;
        Ok(self.push(capability, RootKind::Package))
    }

    /// Add a capability given as `name` or `name OP evr`
    pub fn add_provides_spec(&mut self, spec: &str) -> Result<&mut Self> {
        let capability = Capability::parse(spec)?;
        Ok(self.push(capability, RootKind::Capability))
    }

    fn push(&mut self, capability: Capability, kind: RootKind) -> &mut Self {
        self.requires
            .entry(capability.name().to_string())
            .or_default()
            .push(RootItem { capability, kind });
        self
    }

    /// Root items in processing order
    pub fn items(&self) -> impl Iterator<Item = &RootItem> + '_ {
        self.requires.values().flatten()
    }

    /// Root items as capabilities, in processing order
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.items().map(|item| item.capability.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.requires.contains_key(name)
    }

    /// Number of root items
    pub fn len(&self) -> usize {
        self.requires.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
    }
}
