//! Entity state — the remote store's view of a single entity.
//!
//! The remote store is authoritative: everything here is a mirror that is
//! only ever written from inbound state-change notifications (plus the
//! initial snapshot at connect time).

mod attribute_value;

pub use attribute_value::AttributeValue;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::time::{self, Timestamp};

/// Current state and attributes of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The state value, normalized to a string (the wire format sends both
    /// strings and bare numbers).
    #[serde(deserialize_with = "state_string")]
    pub state: String,
    /// Typed attribute map (`min`, `max`, `step`, `friendly_name`, …).
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    /// When the remote store last updated this entity.
    #[serde(default = "time::now")]
    pub last_updated: Timestamp,
}

impl EntityState {
    /// Create a state with no attributes, stamped now.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: HashMap::new(),
            last_updated: time::now(),
        }
    }

    /// Attach an attribute (builder style).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// The state value as a number, when it parses as one.
    #[must_use]
    pub fn numeric_state(&self) -> Option<f64> {
        self.state.parse().ok().filter(|v: &f64| v.is_finite())
    }

    /// A numeric attribute by name, coerced via [`AttributeValue::as_f64`].
    #[must_use]
    pub fn numeric_attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(AttributeValue::as_f64)
    }
}

/// Accept both `"42"` and `42` for the state field.
fn state_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
        Flag(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => {
            if number.fract() == 0.0 && number.abs() < 1e15 {
                format!("{}", number as i64)
            } else {
                number.to_string()
            }
        }
        Raw::Flag(flag) => flag.to_string(),
    })
}
