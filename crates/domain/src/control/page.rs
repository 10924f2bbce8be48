//! Pages — ordered button and dial assignments for the control surface.

use serde::{Deserialize, Serialize};

use crate::control::{Button, Dial};
use crate::error::ControlIndexError;
use crate::id::EntityId;

/// One screenful of controls: buttons indexed by physical key, dials by
/// physical dial position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique page name.
    pub name: String,
    /// Buttons by key index; shorter than the key count leaves keys empty.
    #[serde(default)]
    pub buttons: Vec<Button>,
    /// Dials by dial index.
    #[serde(default)]
    pub dials: Vec<Dial>,
    /// Whether the return-to-home timer may arm while this page is shown.
    /// Detached (anonymous) pages are timed regardless of this flag.
    #[serde(default = "default_true")]
    pub close_on_inactivity_timer: bool,
}

fn default_true() -> bool {
    true
}

impl Page {
    /// Create an empty page.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buttons: Vec::new(),
            dials: Vec::new(),
            close_on_inactivity_timer: true,
        }
    }

    /// The button at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlIndexError::Button`] when the key has no button.
    pub fn button(&self, key: usize) -> Result<&Button, ControlIndexError> {
        self.buttons.get(key).ok_or_else(|| ControlIndexError::Button {
            page: self.name.clone(),
            index: key,
        })
    }

    /// The dial at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlIndexError::Dial`] when the position has no dial.
    pub fn dial(&self, index: usize) -> Result<&Dial, ControlIndexError> {
        self.dials.get(index).ok_or_else(|| ControlIndexError::Dial {
            page: self.name.clone(),
            index,
        })
    }

    /// Mutable access to the dial at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlIndexError::Dial`] when the position has no dial.
    pub fn dial_mut(&mut self, index: usize) -> Result<&mut Dial, ControlIndexError> {
        let page = self.name.clone();
        self.dials
            .get_mut(index)
            .ok_or(ControlIndexError::Dial { page, index })
    }

    /// Indices of the buttons and dials bound to `entity_id`.
    #[must_use]
    pub fn controls_bound_to(&self, entity_id: &EntityId) -> (Vec<usize>, Vec<usize>) {
        let buttons = self
            .buttons
            .iter()
            .enumerate()
            .filter(|(_, button)| button.entity_id.as_ref() == Some(entity_id))
            .map(|(index, _)| index)
            .collect();
        let dials = self
            .dials
            .iter()
            .enumerate()
            .filter(|(_, dial)| dial.entity_id.as_ref() == Some(entity_id))
            .map(|(index, _)| index)
            .collect();
        (buttons, dials)
    }
}
