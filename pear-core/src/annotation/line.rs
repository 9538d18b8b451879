//! 1-based source line identifiers

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A physical line of the displayed source text, counted from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct LineKey(NonZeroU32);

impl LineKey {
    /// Create a line key, rejecting zero, negative and oversized values
    pub fn new(line: i64) -> Result<Self> {
        u32::try_from(line)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or_else(|| Error::InvalidLine(line.to_string()))
    }

    /// The 1-based line number
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for LineKey {
    type Error = Error;

    fn try_from(line: i64) -> Result<Self> {
        Self::new(line)
    }
}

impl TryFrom<f64> for LineKey {
    type Error = Error;

    fn try_from(line: f64) -> Result<Self> {
        if !line.is_finite() || line.fract() != 0.0 || line > f64::from(u32::MAX) {
            return Err(Error::InvalidLine(line.to_string()));
        }
        Self::new(line as i64)
    }
}

impl FromStr for LineKey {
    type Err = Error;

    /// Parse a decimal line number such as `"12"`
    ///
    /// Fractional input (`"2.5"`) and anything non-numeric is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map_err(|_| Error::InvalidLine(s.to_string()))
            .and_then(Self::new)
    }
}

impl From<LineKey> for u32 {
    fn from(key: LineKey) -> Self {
        key.get()
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
