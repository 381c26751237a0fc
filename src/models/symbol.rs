//! Canonical ticker symbols
//!
//! The upper-cased, trimmed ticker is the uniqueness key everywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

// == Symbol ==
/// A canonical stock ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalizes a raw ticker.
    ///
    /// Rejects empty input and input containing whitespace or path separators.
    pub fn parse(raw: &str) -> Result<Self> {
        let canonical = raw.trim().to_uppercase();
        if canonical.is_empty()
            || canonical
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(SyncError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = SyncError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl std::str::FromStr for Symbol {
    type Err = SyncError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
