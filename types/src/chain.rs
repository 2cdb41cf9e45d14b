//! Side-chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Identifies a registered side-chain competing for cross-chain slots.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(String);

impl ChainId {
    /// Create a chain id.
    ///
    /// # Panics
    /// Panics if the id is empty.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(!s.is_empty(), "chain id must not be empty");
        Self(s)
    }

    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if raw.is_empty() {
            return Err(TypesError::InvalidChainId("empty".into()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
