//! Events crossing the session boundary — hardware input and remote state
//! changes.
//!
//! Hardware events arrive from the control-surface driver; state-change
//! events arrive from the remote store's event stream. Both are dispatched
//! through the session handle in the `app` crate.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::id::EntityId;

/// A rotary or push event on one dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialEvent {
    /// Rotation by a number of detents; negative is counter-clockwise.
    Turn(i32),
    /// The dial pressed down.
    Push,
}

/// A point on the touch strip, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A gesture on the touch strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A brief tap.
    ShortTap(TouchPoint),
    /// A press held past the driver's long-press threshold.
    LongPress(TouchPoint),
    /// A drag from one point to another.
    Drag { from: TouchPoint, to: TouchPoint },
}

/// One state-change notification from the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChanged {
    /// Entity the change applies to.
    pub entity_id: EntityId,
    /// State before the change, when the store reports one.
    pub old_state: Option<EntityState>,
    /// State after the change.
    pub new_state: EntityState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_state_changed_payload() {
        let json = r#"{
            "entity_id": "input_number.streamdeck",
            "old_state": {"state": "0", "attributes": {"min": 0, "max": 100, "step": 1}},
            "new_state": {"state": 1, "attributes": {"min": 0, "max": 200, "step": 5}}
        }"#;
        let change: StateChanged = serde_json::from_str(json).unwrap();
        assert_eq!(change.entity_id, EntityId::new("input_number.streamdeck"));
        assert_eq!(change.new_state.numeric_attribute("step"), Some(5.0));
        assert!(change.old_state.is_some());
    }

    #[test]
    fn should_accept_missing_old_state() {
        let json = r#"{
            "entity_id": "light.kitchen",
            "old_state": null,
            "new_state": {"state": "on"}
        }"#;
        let change: StateChanged = serde_json::from_str(json).unwrap();
        assert!(change.old_state.is_none());
    }
}
