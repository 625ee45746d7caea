//! Age limits with unit parsing for cache expiration policies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A maximum-age bound stored as a whole number of seconds.
///
/// Supports parsing from strings like "14d", "12h", "30m", "90s", and bare
/// numbers of seconds. Cache entries older than the bound are eligible for
/// pruning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaxAge(u64);

impl MaxAge {
    /// Creates a new age bound from a value in seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the bound in seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns the bound as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl fmt::Debug for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaxAge({self})")
    }
}

impl fmt::Display for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        if s >= 86_400 && s % 86_400 == 0 {
            write!(f, "{}d", s / 86_400)
        } else if s >= 3_600 && s % 3_600 == 0 {
            write!(f, "{}h", s / 3_600)
        } else if s >= 60 && s % 60 == 0 {
            write!(f, "{}m", s / 60)
        } else {
            write!(f, "{s}s")
        }
    }
}

/// Error type for parsing age strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMaxAgeError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseMaxAgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid age: '{}'", self.input)
    }
}

impl std::error::Error for ParseMaxAgeError {}

impl FromStr for MaxAge {
    type Err = ParseMaxAgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseMaxAgeError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        for (suffix, secs) in [("d", 86_400u64), ("h", 3_600), ("m", 60), ("s", 1)] {
            if let Some(num) = lower.strip_suffix(suffix) {
                let val: u64 = num.trim().parse().map_err(|_| err())?;
                return val.checked_mul(secs).map(MaxAge).ok_or_else(err);
            }
        }

        // Bare number, interpreted as seconds
        let val: u64 = lower.parse().map_err(|_| err())?;
        Ok(MaxAge(val))
    }
}
