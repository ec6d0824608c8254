//! `epoch:version-release` values

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::vercmp::rpmvercmp;

lazy_static! {
    static ref EVR_REGEX: Regex =
        Regex::new(r"^(?:(\d+):)?([^:\-\s]+)(?:-([^:\-\s]+))?$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvrError {
    #[error("Invalid EVR string \"{0}\"")]
    Invalid(String),
    #[error("Epoch out of range in \"{0}\"")]
    EpochOutOfRange(String),
}

/// An RPM `epoch:version-release`.
///
/// The epoch and release are optional. A missing epoch is treated as `0`
/// everywhere. Equality follows [`Ord`], so `1.0` and `1.00` are equal.
#[derive(Debug, Clone)]
pub struct Evr {
    epoch: Option<u32>,
    version: String,
    release: Option<String>,
}

impl Evr {
    pub fn new(epoch: Option<u32>, version: impl Into<String>, release: Option<String>) -> Self {
        Self {
            epoch,
            version: version.into(),
            release,
        }
    }

    /// Parse `[epoch:]version[-release]`.
    pub fn parse(s: &str) -> Result<Self, EvrError> {
        let caps = EVR_REGEX
            .captures(s.trim())
            .ok_or_else(|| EvrError::Invalid(s.to_string()))?;

        let epoch = match caps.get(1) {
            Some(m) => Some(
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| EvrError::EpochOutOfRange(s.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            epoch,
            version: caps[2].to_string(),
            release: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    pub fn epoch(&self) -> u32 {
        self.epoch.unwrap_or(0)
    }

    pub fn has_epoch(&self) -> bool {
        self.epoch.is_some()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    /// Compare the way rpm does for dependency matching: when either side
    /// has no release, releases are not compared.
    pub fn compare_dep(&self, other: &Evr) -> Ordering {
        self.epoch()
            .cmp(&other.epoch())
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => rpmvercmp(a, b),
                _ => Ordering::Equal,
            })
    }
}

impl Ord for Evr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch()
            .cmp(&other.epoch())
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => rpmvercmp(a, b),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            })
    }
}

impl PartialOrd for Evr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Evr {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Evr {}

impl FromStr for Evr {
    type Err = EvrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

impl Serialize for Evr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Evr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Evr::parse(&s).map_err(serde::de::Error::custom)
    }
}
