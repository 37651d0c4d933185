//! Filter patterns used to select which messages a handler receives.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Partial match over a message's metadata.
///
/// Every field that is set must match; unset fields match anything. A pattern
/// only ever matches in one publish mode: real-time by default, replay when
/// `on_replay` is set.
///
/// ## Example
///
/// ```
/// use sourced_bus::{EventDetail, FilterPattern, Message};
///
/// let pattern = FilterPattern::store("POKEMONS").event_type("APPEARED");
/// let appeared = Message::notification("POKEMONS", EventDetail::new("p1", 1, "APPEARED"));
///
/// assert!(pattern.matches(&appeared, false));
/// assert!(!pattern.matches(&appeared, true));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub on_replay: bool,
}

impl FilterPattern {
    /// The empty pattern: every message in real-time mode.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every message from one event store.
    pub fn store(event_store_id: impl Into<String>) -> Self {
        Self {
            event_store_id: Some(event_store_id.into()),
            ..Self::default()
        }
    }

    /// Narrow a store pattern to one event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Switch the pattern to replay mode.
    pub fn on_replay(mut self) -> Self {
        self.on_replay = true;
        self
    }

    /// Whether the pattern selects `message` when published in the given mode.
    pub fn matches(&self, message: &Message, replay: bool) -> bool {
        if self.on_replay != replay {
            return false;
        }

        if let Some(store) = &self.event_store_id {
            if store != &message.event_store_id {
                return false;
            }
        }

        match &self.event_type {
            Some(event_type) => event_type == &message.event.event_type,
            None => true,
        }
    }
}
