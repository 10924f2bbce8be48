//! Service calls — outbound commands for the remote store.

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// One command for the remote store, e.g. `input_number.set_value`.
///
/// Built by the event dispatcher and handed to the command port
/// fire-and-forget; nothing in the core waits for the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    /// Service identifier in `domain.name` form.
    pub service: String,
    /// Entity the call targets, when it targets one.
    pub target: Option<EntityId>,
    /// Service data fields.
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ServiceCall {
    /// Start a call to the given service.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            target: None,
            data: serde_json::Map::new(),
        }
    }

    /// Target an entity (builder style).
    #[must_use]
    pub fn target(mut self, entity_id: EntityId) -> Self {
        self.target = Some(entity_id);
        self
    }

    /// Set one data field (builder style).
    #[must_use]
    pub fn datum(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Merge the fields of a JSON object into the data map, overwriting
    /// existing keys. Non-object values are ignored.
    pub fn merge_data(&mut self, data: &serde_json::Value) {
        if let Some(object) = data.as_object() {
            for (key, value) in object {
                self.data.insert(key.clone(), value.clone());
            }
        }
    }

    /// The `domain` half of the service identifier.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.service
            .split_once('.')
            .map_or("homeassistant", |(domain, _)| domain)
    }

    /// The `name` half of the service identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        self.service
            .split_once('.')
            .map_or(self.service.as_str(), |(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_split_service_into_domain_and_name() {
        let call = ServiceCall::new("input_number.set_value");
        assert_eq!(call.domain(), "input_number");
        assert_eq!(call.name(), "set_value");
    }

    #[test]
    fn should_default_domain_when_service_has_no_dot() {
        let call = ServiceCall::new("toggle");
        assert_eq!(call.domain(), "homeassistant");
        assert_eq!(call.name(), "toggle");
    }

    #[test]
    fn should_collect_data_fields() {
        let call = ServiceCall::new("light.turn_on")
            .target(EntityId::new("light.kitchen"))
            .datum("brightness", 128);
        assert_eq!(call.target, Some(EntityId::new("light.kitchen")));
        assert_eq!(call.data["brightness"], serde_json::json!(128));
    }

    #[test]
    fn should_merge_object_data_overwriting_existing_keys() {
        let mut call = ServiceCall::new("input_number.set_value").datum("value", 1);
        call.merge_data(&serde_json::json!({"value": 5, "extra": "x"}));
        assert_eq!(call.data["value"], serde_json::json!(5));
        assert_eq!(call.data["extra"], serde_json::json!("x"));
    }

    #[test]
    fn should_ignore_non_object_merge_data() {
        let mut call = ServiceCall::new("script.run");
        call.merge_data(&serde_json::json!("not an object"));
        assert!(call.data.is_empty());
    }
}
