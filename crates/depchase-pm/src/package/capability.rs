use std::fmt;
use std::str::FromStr;

use depchase_rpmver::{Constraint, Evr, Operator};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{DepchaseError, Result};

lazy_static! {
    static ref RICH_DEP_REGEX: Regex =
        Regex::new(r"\s(and|or|if|else|with|without|unless)\s").unwrap();
}

/// A named capability with an optional version range, such as `libfoo.so.1`
/// or `python3 >= 3.12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    name: String,
    constraint: Option<Constraint>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    pub fn versioned(name: impl Into<String>, operator: Operator, evr: Evr) -> Self {
        Self {
            name: name.into(),
            constraint: Some(Constraint::new(operator, evr)),
        }
    }

    /// Parse `name` or `name OP evr`.
    ///
    /// Boolean (rich) dependencies are rejected; use [`Capability::is_rich`]
    /// to sort them out first.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || Self::is_rich(s) {
            return Err(DepchaseError::InvalidCapability(s.to_string()));
        }

        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [name] => Ok(Self::new(*name)),
            [name, op, evr] => {
                let operator = Operator::from_str(op)
                    .map_err(|_| DepchaseError::InvalidCapability(s.to_string()))?;
                Ok(Self::versioned(*name, operator, Evr::parse(evr)?))
            }
            _ => Err(DepchaseError::InvalidCapability(s.to_string())),
        }
    }

    /// Whether a dependency string is a boolean expression like
    /// `(foo if bar)`.
    pub fn is_rich(s: &str) -> bool {
        let s = s.trim();
        s.starts_with('(') || RICH_DEP_REGEX.is_match(s)
    }

    /// The same range applied to another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: self.constraint.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    pub fn is_file(&self) -> bool {
        self.name.starts_with('/')
    }

    /// `rpmlib(...)` features are satisfied by rpm itself.
    pub fn is_rpmlib(&self) -> bool {
        self.name.starts_with("rpmlib(")
    }

    /// Whether a provided capability satisfies this required one.
    ///
    /// An unversioned provide satisfies any range, and an unversioned
    /// require is satisfied by any provide of the same name.
    pub fn satisfied_by(&self, provided: &Capability) -> bool {
        if self.name != provided.name {
            return false;
        }
        match (&self.constraint, &provided.constraint) {
            (Some(required), Some(offered)) => required.intersects(offered),
            _ => true,
        }
    }
}

impl FromStr for Capability {
    type Err = DepchaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{} {}", self.name, constraint),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(s: &str) -> Capability {
        Capability::parse(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_versioned() {
        let plain = cap("libfoo.so.1()(64bit)");
        assert_eq!(plain.name(), "libfoo.so.1()(64bit)");
        assert!(plain.constraint().is_none());

        let versioned = cap("python3 >= 3.12");
        assert_eq!(versioned.name(), "python3");
        assert_eq!(versioned.to_string(), "python3 >= 3.12");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Capability::parse("").is_err());
        assert!(Capability::parse("foo >=").is_err());
        assert!(Capability::parse("foo ~> 1.0").is_err());
        assert!(Capability::parse("(foo if bar)").is_err());
    }

    #[test]
    fn test_rich_detection() {
        assert!(Capability::is_rich("(foo if bar)"));
        assert!(Capability::is_rich("(pkgA >= 1.0 or pkgB)"));
        assert!(!Capability::is_rich("foo >= 1.0"));
        assert!(!Capability::is_rich("/usr/bin/python3"));
    }

    #[test]
    fn test_satisfied_by_ranges() {
        assert!(cap("b >= 2").satisfied_by(&cap("b = 2.0-1")));
        assert!(!cap("b >= 2").satisfied_by(&cap("b = 1.0-1")));
        assert!(cap("b").satisfied_by(&cap("b = 1.0-1")));
        assert!(cap("b >= 2").satisfied_by(&cap("b")));
        assert!(!cap("b").satisfied_by(&cap("c")));
    }

    #[test]
    fn test_renamed_keeps_range() {
        assert_eq!(cap("foo.x86_64 >= 2").renamed("foo").to_string(), "foo >= 2");
    }

    #[test]
    fn test_kinds() {
        assert!(cap("/usr/bin/sh").is_file());
        assert!(cap("rpmlib(CompressedFileNames) <= 3.0.4-1").is_rpmlib());
        assert!(!cap("glibc").is_rpmlib());
    }
}
