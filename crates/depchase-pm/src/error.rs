use depchase_rpmver::EvrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepchaseError {
    // Input errors
    #[error("Failed to load package source '{name}': {reason}")]
    UnknownSource { name: String, reason: String },

    #[error("Invalid dependency \"{0}\"")]
    InvalidCapability(String),

    #[error("Invalid version: {0}")]
    Evr(#[from] EvrError),

    // Resolution errors
    #[error("{}", describe_unsatisfied(.capability, .requested_by.as_deref(), .chain))]
    UnsatisfiedDependency {
        capability: String,
        requested_by: Option<String>,
        chain: Vec<String>,
    },

    #[error("Package {b} conflicts with already selected {a}: {reason}")]
    Conflict { a: String, b: String, reason: String },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Consistency checks that should never fire
    #[error("Internal error: {0}")]
    Internal(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_unsatisfied(capability: &str, requested_by: Option<&str>, chain: &[String]) -> String {
    match requested_by {
        None => format!("No package provides {}", capability),
        Some(by) if chain.len() > 1 => format!(
            "Nothing provides {} needed by {} (required via {})",
            capability,
            by,
            chain.join(" -> ")
        ),
        Some(by) => format!("Nothing provides {} needed by {}", capability, by),
    }
}

pub type Result<T> = std::result::Result<T, DepchaseError>;
