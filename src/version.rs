//! Dotted version numbers and three-way comparison.
//!
//! A [`VersionInfo`] is an ordered list of non-negative integer components
//! (`major.minor.patch`, with extra components allowed). Parsing is strict:
//! a version that does not parse never exists, so comparisons cannot
//! silently treat bad input as "equal" or "smallest".
//!
//! # Example
//!
//! ```
//! use upgrader::version::{VersionChange, VersionInfo};
//!
//! let current: VersionInfo = "10.0.1".parse().unwrap();
//! let next: VersionInfo = "11.0".parse().unwrap();
//!
//! assert_eq!(current.compare(&next), VersionChange::Upgrade);
//! assert_eq!(next.compare(&current), VersionChange::Downgrade);
//! assert_eq!(next.compare(&"11.0.0".parse().unwrap()), VersionChange::None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, UpgraderError};

/// Direction of travel from one version to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionChange {
    /// The right-hand version is later.
    Upgrade,
    /// The right-hand version is earlier.
    Downgrade,
    /// Both versions are equal.
    None,
}

impl VersionChange {
    /// The change seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            Self::Upgrade => Self::Downgrade,
            Self::Downgrade => Self::Upgrade,
            Self::None => Self::None,
        }
    }
}

impl fmt::Display for VersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// A parsed, always-valid dotted version.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    components: Vec<u64>,
}

impl VersionInfo {
    /// Parse a dotted version string.
    ///
    /// Every dot-separated segment must be a non-negative integer made of
    /// ASCII digits. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`UpgraderError::VersionFormat`] for empty input, empty
    /// segments, non-numeric segments, or components that overflow `u64`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let invalid = |reason: String| UpgraderError::VersionFormat {
            input: text.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("version is empty".to_string()));
        }

        let components = trimmed
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(invalid("empty component".to_string()));
                }
                if !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(format!("component '{}' is not a number", segment)));
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("component '{}' is too large", segment)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { components })
    }

    /// The numeric components as parsed.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.component(0)
    }

    /// Minor component (0 when absent).
    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    /// Patch component (0 when absent).
    pub fn patch(&self) -> u64 {
        self.component(2)
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// Compare `self` against `other`.
    ///
    /// Missing trailing components count as zero, so `1.2` and `1.2.0` are
    /// equal. Returns [`VersionChange::Upgrade`] when `other` is later and
    /// [`VersionChange::Downgrade`] when it is earlier.
    pub fn compare(&self, other: &VersionInfo) -> VersionChange {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match other.component(i).cmp(&self.component(i)) {
                Ordering::Greater => return VersionChange::Upgrade,
                Ordering::Less => return VersionChange::Downgrade,
                Ordering::Equal => {}
            }
        }
        VersionChange::None
    }

    /// Components with trailing zeros removed, the canonical form used for
    /// hashing.
    fn significant(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..end]
    }
}

/// Compare two version strings, validating both first.
pub fn compare(a: &str, b: &str) -> Result<VersionChange> {
    Ok(VersionInfo::parse(a)?.compare(&VersionInfo::parse(b)?))
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == VersionChange::None
    }
}

impl Eq for VersionInfo {}

impl Hash for VersionInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.compare(other) {
            VersionChange::Upgrade => Ordering::Less,
            VersionChange::Downgrade => Ordering::Greater,
            VersionChange::None => Ordering::Equal,
        }
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for VersionInfo {
    type Err = UpgraderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Serialize for VersionInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
