//! Typed attribute values attached to entity state.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// Coerce to a finite float where the value allows it.
    ///
    /// Numeric strings are parsed; this is what dial re-hydration relies on,
    /// since remote stores are loose about attribute types.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => {
                #[allow(clippy::cast_precision_loss)]
                Some(*value as f64)
            }
            Self::Float(value) => Some(*value).filter(|v| v.is_finite()),
            Self::String(text) => text.parse().ok().filter(|v: &f64| v.is_finite()),
            Self::Json(value) => value.as_f64().filter(|v| v.is_finite()),
            Self::Bool(_) => None,
        }
    }
}
