//! Dials — rotary/push controls with bounded numeric turn state.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::error::{LayoutError, UnboundEntityError};
use crate::id::EntityId;
use crate::service::ServiceCall;

/// Bounded numeric state driven by a dial's rotary action.
///
/// The invariant `min <= value <= max` holds at all times: every write path
/// clamps, and bounds updates re-clamp the current value. The local value is
/// advisory — the remote store overwrites it on every authoritative state
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TurnPropertiesConfig")]
pub struct TurnProperties {
    min: f64,
    max: f64,
    step: f64,
    value: f64,
    service_attribute: String,
}

impl Default for TurnProperties {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            value: 0.0,
            service_attribute: "value".to_string(),
        }
    }
}

impl TurnProperties {
    /// Create turn state starting at `min`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NonPositiveStep`] or
    /// [`LayoutError::InvertedRange`] on invalid bounds.
    pub fn new(
        min: f64,
        max: f64,
        step: f64,
        service_attribute: impl Into<String>,
    ) -> Result<Self, LayoutError> {
        if step.is_nan() || step <= 0.0 {
            return Err(LayoutError::NonPositiveStep(step));
        }
        if min > max {
            return Err(LayoutError::InvertedRange { min, max });
        }
        Ok(Self {
            min,
            max,
            step,
            value: min,
            service_attribute: service_attribute.into(),
        })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Remote parameter name the value maps to (e.g. `value`, `brightness`).
    #[must_use]
    pub fn service_attribute(&self) -> &str {
        &self.service_attribute
    }

    /// Write the value, clamped to `[min, max]`. Returns the applied value.
    ///
    /// Non-finite input is rejected and the current value returned unchanged.
    pub fn set_value(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.value = value.clamp(self.min, self.max);
        }
        self.value
    }

    /// Apply a rotation of `detents` steps and return the clamped result.
    pub fn apply_detents(&mut self, detents: f64) -> f64 {
        self.set_value(self.value + detents * self.step)
    }

    /// Overwrite bounds, step, and value from authoritative remote
    /// attributes. Absent or nonsensical fields keep their current value;
    /// the value is re-clamped against the final bounds either way.
    pub fn rehydrate(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        value: Option<f64>,
    ) {
        let min = min.filter(|v| v.is_finite()).unwrap_or(self.min);
        let max = max.filter(|v| v.is_finite()).unwrap_or(self.max);
        if min <= max {
            self.min = min;
            self.max = max;
        }
        if let Some(step) = step.filter(|v| v.is_finite() && *v > 0.0) {
            self.step = step;
        }
        self.set_value(value.unwrap_or(self.value));
    }
}

/// Raw turn configuration; converted into [`TurnProperties`] with validation.
#[derive(Deserialize)]
struct TurnPropertiesConfig {
    #[serde(default)]
    min: f64,
    #[serde(default = "default_max")]
    max: f64,
    #[serde(default = "default_step")]
    step: f64,
    #[serde(default, alias = "value")]
    state: Option<f64>,
    #[serde(default = "default_service_attribute")]
    service_attribute: String,
}

fn default_max() -> f64 {
    100.0
}

fn default_step() -> f64 {
    1.0
}

fn default_service_attribute() -> String {
    "value".to_string()
}

impl TryFrom<TurnPropertiesConfig> for TurnProperties {
    type Error = LayoutError;

    fn try_from(config: TurnPropertiesConfig) -> Result<Self, Self::Error> {
        let mut properties = Self::new(
            config.min,
            config.max,
            config.step,
            config.service_attribute,
        )?;
        if let Some(state) = config.state {
            properties.set_value(state);
        }
        Ok(properties)
    }
}

/// A dial's rotary action: a service call parameterized by the turn value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialTurn {
    /// Service the clamped value is sent to.
    pub service: String,
    /// Static data merged into every set-value call.
    #[serde(default)]
    pub service_data: Option<serde_json::Value>,
    /// Bounded numeric state; re-hydrated from the entity store whenever the
    /// dial becomes visible.
    #[serde(default)]
    pub properties: TurnProperties,
}

impl DialTurn {
    /// Build the set-value call carrying `value` under the configured
    /// service attribute.
    #[must_use]
    pub fn set_value_call(&self, entity_id: &EntityId, value: f64) -> ServiceCall {
        let mut call = ServiceCall::new(self.service.clone());
        if let Some(data) = &self.service_data {
            call.merge_data(data);
        }
        call.datum(self.properties.service_attribute(), value)
            .target(entity_id.clone())
    }
}

/// A dial's push action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialPush {
    /// Service fired on press.
    pub service: String,
    /// Static service data.
    #[serde(default)]
    pub service_data: Option<serde_json::Value>,
}

impl DialPush {
    /// Build the push service call.
    #[must_use]
    pub fn call(&self, entity_id: &EntityId) -> ServiceCall {
        let mut call = ServiceCall::new(self.service.clone());
        if let Some(data) = &self.service_data {
            call.merge_data(data);
        }
        call.target(entity_id.clone())
    }
}

/// A rotary/push/touch control bound to one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dial {
    /// Entity the dial reflects and drives.
    pub entity_id: Option<EntityId>,
    /// Rotary action, when configured.
    pub turn: Option<DialTurn>,
    /// Push action, when configured.
    pub push: Option<DialPush>,
    /// Fixed display text for the renderer.
    pub text: Option<String>,
    /// Whether touch-strip gestures may drive this dial to min/max.
    pub allow_touchscreen_events: bool,
}

impl Dial {
    /// The bound entity, or the typed error an entity-requiring action
    /// reports.
    ///
    /// # Errors
    ///
    /// Returns [`UnboundEntityError`] when no entity is configured.
    pub fn require_entity(&self, action: &'static str) -> Result<EntityId, UnboundEntityError> {
        self.entity_id
            .clone()
            .ok_or(UnboundEntityError { action })
    }

    /// Overwrite the turn state from an authoritative entity state: bounds
    /// and step from attributes, the value from the numeric state. This is
    /// the only path by which turn state becomes authoritative.
    pub fn rehydrate(&mut self, state: &EntityState) {
        if let Some(turn) = &mut self.turn {
            turn.properties.rehydrate(
                state.numeric_attribute("min"),
                state.numeric_attribute("max"),
                state.numeric_attribute("step"),
                state.numeric_state(),
            );
        }
    }
}
