//! RPM version handling for depchase
//!
//! This crate provides `epoch:version-release` parsing, the `rpmvercmp`
//! segment comparison and dependency range matching compatible with rpm.

pub mod constraint;
mod evr;
mod vercmp;

pub use constraint::{Constraint, Operator, OperatorError};
pub use evr::{Evr, EvrError};
pub use vercmp::rpmvercmp;
