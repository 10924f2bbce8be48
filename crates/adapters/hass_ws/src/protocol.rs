//! Wire messages for the remote store's WebSocket API.

use serde::{Deserialize, Serialize};

use deckhand_domain::entity::EntityState;
use deckhand_domain::event::StateChanged;
use deckhand_domain::id::EntityId;
use deckhand_domain::service::ServiceCall;

/// Messages we send.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Auth handshake response.
    Auth { access_token: String },
    /// Event subscription request.
    SubscribeEvents { id: u64, event_type: String },
    /// Full entity snapshot request.
    GetStates { id: u64 },
    /// Service invocation.
    CallService {
        id: u64,
        domain: String,
        service: String,
        #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
        service_data: serde_json::Map<String, serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<Target>,
    },
}

impl Outbound {
    /// Build a `call_service` message from a domain service call.
    #[must_use]
    pub fn call_service(id: u64, call: &ServiceCall) -> Self {
        Self::CallService {
            id,
            domain: call.domain().to_string(),
            service: call.name().to_string(),
            service_data: call.data.clone(),
            target: call.target.clone().map(|entity_id| Target { entity_id }),
        }
    }
}

/// Service call target.
#[derive(Debug, Serialize, Deserialize)]
pub struct Target {
    pub entity_id: EntityId,
}

/// Messages we receive.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Server greeting; answer with [`Outbound::Auth`].
    AuthRequired,
    /// Handshake accepted.
    AuthOk,
    /// Handshake refused.
    AuthInvalid {
        #[serde(default)]
        message: String,
    },
    /// Response to one of our requests.
    Result {
        id: u64,
        success: bool,
        #[serde(default)]
        result: Option<serde_json::Value>,
        #[serde(default)]
        error: Option<ResultError>,
    },
    /// A subscribed event.
    Event {
        #[allow(dead_code)]
        id: u64,
        event: EventPayload,
    },
    /// Anything this adapter does not consume (pong, config updates, …).
    #[serde(other)]
    Unknown,
}

/// Error object inside a failed result.
#[derive(Debug, Deserialize)]
pub struct ResultError {
    #[serde(default)]
    pub message: String,
}

/// Envelope of a subscribed event.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventPayload {
    /// Extract a state change, when this is a `state_changed` event for an
    /// entity that still exists.
    #[must_use]
    pub fn into_state_changed(self) -> Option<StateChanged> {
        if self.event_type != "state_changed" {
            return None;
        }
        let data: StateChangedData = serde_json::from_value(self.data).ok()?;
        let new_state = data.new_state?;
        Some(StateChanged {
            entity_id: data.entity_id,
            old_state: data.old_state,
            new_state,
        })
    }
}

/// Payload of a `state_changed` event. `new_state` is absent when the
/// entity was removed; those events are dropped.
#[derive(Debug, Deserialize)]
struct StateChangedData {
    entity_id: EntityId,
    #[serde(default)]
    old_state: Option<EntityState>,
    #[serde(default)]
    new_state: Option<EntityState>,
}

/// One entry of a `get_states` snapshot.
#[derive(Debug, Deserialize)]
pub struct WireState {
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub state: EntityState,
}
