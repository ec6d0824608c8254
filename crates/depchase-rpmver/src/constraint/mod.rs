//! Relational operators and version ranges used in RPM dependencies

mod constraint;
mod operator;

pub use constraint::Constraint;
pub use operator::{Operator, OperatorError};
