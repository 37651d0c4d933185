//! Error types for handlers, deliveries, configuration and the bus facade.

use std::error::Error;

use thiserror::Error;

/// Error returned by a message handler invocation.
///
/// Any variant counts as a failed attempt for the retry loop.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload or aggregate decode / deserialization failed.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The handler refused the message (validation, invariant violation).
    #[error("rejected: {0}")]
    Rejected(String),
    /// The handler task panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
    /// Other error.
    #[error("handler error: {0}")]
    Other(#[source] Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    /// Convenience constructor for `Rejected`.
    pub fn rejected(reason: impl Into<String>) -> Self {
        HandlerError::Rejected(reason.into())
    }

    /// Wrap an arbitrary error.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        HandlerError::Other(err.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Decode(err.to_string())
    }
}

/// A handler could not process a message within its attempt budget.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("handler {handler_id:#x} failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        handler_id: usize,
        attempts: u32,
        #[source]
        source: HandlerError,
    },
    /// The delivery task was cancelled before it reported back.
    #[error("delivery to handler {handler_id:#x} aborted: {reason}")]
    Aborted { handler_id: usize, reason: String },
}

impl DeliveryError {
    /// Identity of the handler that gave up.
    pub fn handler_id(&self) -> usize {
        match self {
            DeliveryError::RetryExhausted { handler_id, .. }
            | DeliveryError::Aborted { handler_id, .. } => *handler_id,
        }
    }

    /// Number of invocations made before giving up (0 when aborted).
    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryError::RetryExhausted { attempts, .. } => *attempts,
            DeliveryError::Aborted { .. } => 0,
        }
    }

    /// The error returned by the last attempt.
    pub fn last_error(&self) -> Option<&HandlerError> {
        match self {
            DeliveryError::RetryExhausted { source, .. } => Some(source),
            DeliveryError::Aborted { .. } => None,
        }
    }
}

/// Invalid retry configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The backoff rate is below 1.0 or not finite.
    ///
    /// Rates below 1.0 are refused on purpose even though they are
    /// well-defined: delays must never shrink between retries.
    #[error("retry backoff rate must be a finite number >= 1.0, got {0}")]
    InvalidBackoffRate(f64),
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Error type for publishing through a [`MessageBus`](crate::bus::MessageBus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// No channel has been attached to the bus yet.
    #[error("message bus {0} has no channel attached")]
    NoChannel(String),
    /// The message comes from an event store the bus does not list as a source.
    #[error("event store {event_store_id} is not a source of message bus {bus_id}")]
    UnknownEventStore {
        bus_id: String,
        event_store_id: String,
    },
}
