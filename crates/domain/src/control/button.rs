//! Buttons — key-bound controls.

use serde::{Deserialize, Serialize};

use crate::error::UnboundEntityError;
use crate::id::EntityId;
use crate::service::ServiceCall;

/// Navigation behaviors a button can carry instead of a service call.
///
/// Special-type buttons never issue remote commands; they only mutate
/// navigation (or, for the no-op variants, nothing at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "special_type",
    content = "special_type_data",
    rename_all = "kebab-case"
)]
pub enum SpecialType {
    /// Switch to a home page (by name or index) or open an anonymous page.
    GoToPage(PageTarget),
    /// Close the detached page, when one is open.
    ClosePage,
    /// Advance the home rotation, wrapping.
    NextPage,
    /// Step the home rotation back, wrapping.
    PreviousPage,
    /// Re-hydrate the visible page from the entity store and redraw it.
    Reload,
    /// Let the renderer power the display down; no navigation effect.
    TurnOff,
    /// A placeholder key with no behavior.
    Empty,
}

/// Target of a `go-to-page` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageTarget {
    /// A position in the home rotation.
    Index(usize),
    /// A page name, home or anonymous.
    Name(String),
}

/// A key-bound control.
///
/// Exactly one of two roles: special-type buttons mutate navigation and
/// never issue commands; entity-bound buttons without a special type issue a
/// service call and never mutate navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Button {
    /// Entity the button acts on, when it acts on one.
    pub entity_id: Option<EntityId>,
    /// Navigation behavior, when this is a special-type button.
    #[serde(flatten)]
    pub special_type: Option<SpecialType>,
    /// Service a command button calls; defaults to `homeassistant.toggle`
    /// on the bound entity when absent.
    pub service: Option<String>,
    /// Static data merged into the service call.
    pub service_data: Option<serde_json::Value>,
    /// Fixed display text for the renderer.
    pub text: Option<String>,
    /// Hold-to-confirm threshold in seconds; presses released earlier are
    /// ignored.
    pub delay: Option<f64>,
}

impl Button {
    /// Whether this button mutates navigation instead of issuing commands.
    #[must_use]
    pub fn is_special(&self) -> bool {
        self.special_type.is_some()
    }

    /// Build the service call a command button issues.
    ///
    /// # Errors
    ///
    /// Returns [`UnboundEntityError`] when neither a service nor an entity is
    /// configured — there is nothing to call and nothing to toggle.
    pub fn service_call(&self) -> Result<ServiceCall, UnboundEntityError> {
        if let Some(service) = &self.service {
            let mut call = ServiceCall::new(service.clone());
            if let Some(data) = &self.service_data {
                call.merge_data(data);
            }
            if let Some(entity_id) = &self.entity_id {
                call = call.target(entity_id.clone());
            }
            return Ok(call);
        }
        let entity_id = self
            .entity_id
            .clone()
            .ok_or(UnboundEntityError { action: "key press" })?;
        Ok(ServiceCall::new("homeassistant.toggle").target(entity_id))
    }
}
