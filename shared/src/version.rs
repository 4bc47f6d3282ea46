//! Engine version numbers.
//!
//! Descriptors may declare the minimum engine they need. Versions are dotted
//! numeric sequences (`1.8`, `1.9.0.2`); missing trailing components count as
//! zero, so `1.8` and `1.8.0` compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Version of the engine this build runs as.
pub const ENGINE_VERSION: &str = "1.9.0.0";

/// Parsed [`ENGINE_VERSION`].
pub fn engine_version() -> EngineVersion {
    // The constant is a valid version; covered by `test_engine_version_parses`.
    ENGINE_VERSION.parse().unwrap_or_default()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version component '{0}'")]
    InvalidComponent(String),
}

/// A dotted numeric version.
#[derive(Debug, Clone, Default)]
pub struct EngineVersion {
    parts: Vec<u32>,
}

impl EngineVersion {
    pub fn new(parts: impl Into<Vec<u32>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    /// Whether a game that needs `required` can run on this version.
    pub fn satisfies(&self, required: &EngineVersion) -> bool {
        self >= required
    }

    fn part(&self, index: usize) -> u32 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for EngineVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let parts = s
            .split('.')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|_| VersionParseError::InvalidComponent(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parts })
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.part(i).cmp(&other.part(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EngineVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EngineVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> EngineVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_engine_version_parses() {
        assert!(ENGINE_VERSION.parse::<EngineVersion>().is_ok());
        assert_eq!(engine_version().to_string(), ENGINE_VERSION);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<EngineVersion>(), Err(VersionParseError::Empty));
        assert!(matches!(
            "1.x".parse::<EngineVersion>(),
            Err(VersionParseError::InvalidComponent(c)) if c == "x"
        ));
        assert!("1..2".parse::<EngineVersion>().is_err());
    }

    #[test]
    fn test_trailing_zeros_compare_equal() {
        assert_eq!(v("1.8"), v("1.8.0"));
        assert_eq!(v("1.8.0.0"), v("1.8"));
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.8") < v("1.9"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("1.99.99"));
        assert!(v("1.9.0.1") > v("1.9"));
    }

    #[test]
    fn test_satisfies() {
        assert!(v("1.9").satisfies(&v("1.8")));
        assert!(v("1.9").satisfies(&v("1.9.0")));
        assert!(!v("1.9").satisfies(&v("1.9.1")));
    }
}
