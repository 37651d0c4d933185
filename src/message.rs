//! Messages carried by the bus.
//!
//! A message is produced by an event store after an event has been appended.
//! It always names its source store and carries the event detail; a
//! state-carrying message additionally carries the aggregate as it stands
//! after the event was applied.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HandlerError;

/// The event part of a message.
///
/// Only `type` is required on the wire. Keys the struct does not name are kept
/// in [`extra`](Self::extra) and written back next to `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    /// Id of the aggregate the event belongs to
    #[serde(default)]
    pub aggregate_id: String,
    /// Version of the aggregate after this event
    #[serde(default)]
    pub version: u64,
    /// Event type (e.g., "APPEARED", "CAUGHT_BY_TRAINER")
    #[serde(rename = "type")]
    pub event_type: String,
    /// ISO-8601 timestamp set by the event store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Event-level fields without a dedicated slot
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDetail {
    pub fn new(aggregate_id: impl Into<String>, version: u64, event_type: impl Into<String>) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            version,
            event_type: event_type.into(),
            timestamp: None,
            payload: None,
            metadata: None,
            extra: Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Add an event-level field outside `payload`.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Deserialize the payload into a typed struct.
    ///
    /// Without a `payload`, the event-level [`extra`](Self::extra) fields are
    /// decoded instead, and with neither the input is JSON `null`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let payload = match &self.payload {
            Some(payload) => payload.clone(),
            None if !self.extra.is_empty() => Value::Object(self.extra.clone()),
            None => Value::Null,
        };
        Ok(serde_json::from_value(payload)?)
    }
}

/// Whether a message carries only the event or the aggregate state as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Notification,
    StateCarrying,
}

/// A message published on the bus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifier of the event store that produced the message
    pub event_store_id: String,
    pub event: EventDetail,
    /// Aggregate state after the event (state-carrying messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Value>,
}

impl Message {
    /// Create a notification message.
    pub fn notification(event_store_id: impl Into<String>, event: EventDetail) -> Self {
        Self {
            event_store_id: event_store_id.into(),
            event,
            aggregate: None,
        }
    }

    /// Create a state-carrying message.
    pub fn state_carrying(
        event_store_id: impl Into<String>,
        event: EventDetail,
        aggregate: Value,
    ) -> Self {
        Self {
            event_store_id: event_store_id.into(),
            event,
            aggregate: Some(aggregate),
        }
    }

    pub fn kind(&self) -> MessageKind {
        if self.aggregate.is_some() {
            MessageKind::StateCarrying
        } else {
            MessageKind::Notification
        }
    }

    /// Shorthand for `self.event.event_type`.
    pub fn event_type(&self) -> &str {
        &self.event.event_type
    }

    /// Deserialize the carried aggregate into a typed struct.
    pub fn aggregate_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let aggregate = self.aggregate.clone().ok_or_else(|| {
            HandlerError::Decode(format!(
                "message {}/{} carries no aggregate",
                self.event_store_id, self.event.aggregate_id
            ))
        })?;
        Ok(serde_json::from_value(aggregate)?)
    }
}
