//! Entity identifiers — opaque string keys into the remote entity store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of an entity in the remote store, e.g. `input_number.desk_lamp`.
///
/// Identifiers are assigned by the remote store and treated as opaque keys,
/// apart from the `domain.object` split used to scope service names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `domain` half of a `domain.object` identifier.
    ///
    /// Identifiers without a dot are returned whole.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.find('.').map_or(self.0.as_str(), |dot| &self.0[..dot])
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
