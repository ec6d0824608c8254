//! Relational operators for dependency ranges

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Comparison operators as they appear in `Requires: foo >= 1.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Equal (=)
    Equal,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid operator: {0}")]
pub struct OperatorError(pub String);

impl Operator {
    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    pub fn has_less(&self) -> bool {
        matches!(self, Operator::LessThan | Operator::LessThanOrEqual)
    }

    pub fn has_greater(&self) -> bool {
        matches!(self, Operator::GreaterThan | Operator::GreaterThanOrEqual)
    }

    pub fn has_equal(&self) -> bool {
        matches!(
            self,
            Operator::Equal | Operator::LessThanOrEqual | Operator::GreaterThanOrEqual
        )
    }

    /// Get all supported operators
    pub fn supported_operators() -> &'static [&'static str] {
        &["=", "==", "<", "<=", "=<", ">", ">=", "=>"]
    }
}

impl FromStr for Operator {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "<" => Ok(Operator::LessThan),
            "<=" | "=<" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" | "=>" => Ok(Operator::GreaterThanOrEqual),
            _ => Err(OperatorError(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!("=>".parse::<Operator>().unwrap(), Operator::GreaterThanOrEqual);
        assert_eq!("<=".parse::<Operator>().unwrap(), Operator::LessThanOrEqual);
        assert!("!=".parse::<Operator>().is_err());
    }

    #[test]
    fn test_flags() {
        assert!(Operator::LessThanOrEqual.has_less());
        assert!(Operator::LessThanOrEqual.has_equal());
        assert!(!Operator::LessThan.has_equal());
        assert!(Operator::GreaterThan.has_greater());
        assert!(!Operator::Equal.has_greater());
    }
}
