//! A single `OP evr` version range

use std::cmp::Ordering;
use std::fmt;

use super::operator::Operator;
use crate::evr::Evr;

/// A version range such as `>= 2.0-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    operator: Operator,
    evr: Evr,
}

impl Constraint {
    pub fn new(operator: Operator, evr: Evr) -> Self {
        Self { operator, evr }
    }

    /// The `= evr` range every package implicitly provides for itself.
    pub fn exact(evr: Evr) -> Self {
        Self::new(Operator::Equal, evr)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn evr(&self) -> &Evr {
        &self.evr
    }

    /// Whether a concrete package version falls inside this range.
    pub fn matches(&self, evr: &Evr) -> bool {
        self.intersects(&Constraint::exact(evr.clone()))
    }

    /// Whether two ranges overlap, with rpm's semantics (`rpmdsCompare`).
    pub fn intersects(&self, other: &Constraint) -> bool {
        match self.evr.compare_dep(&other.evr) {
            Ordering::Less => self.operator.has_greater() || other.operator.has_less(),
            Ordering::Greater => self.operator.has_less() || other.operator.has_greater(),
            Ordering::Equal => {
                (self.operator.has_equal() && other.operator.has_equal())
                    || (self.operator.has_less() && other.operator.has_less())
                    || (self.operator.has_greater() && other.operator.has_greater())
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.evr)
    }
}
