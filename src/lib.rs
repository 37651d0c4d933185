//! In-process message bus for event-sourced messages.
//!
//! Handlers subscribe with a [`FilterPattern`]; every published [`Message`]
//! is delivered to each distinct matching handler, concurrently, with failed
//! invocations retried under an exponential-backoff [`RetryPolicy`].

mod adapter;
mod config;
mod context;
mod error;
mod filter;
mod handler;
mod message;
mod registry;
mod retry;

#[cfg(feature = "bus")]
pub mod bus;

pub use adapter::{AdapterBuilder, InMemoryMessageBusAdapter, PublishOptions, PublishReport};
pub use config::{BusConfig, ENV_RETRY_ATTEMPTS, ENV_RETRY_BACKOFF_RATE, ENV_RETRY_DELAY_MS};
pub use context::TaskContext;
pub use error::{BusError, ConfigError, DeliveryError, HandlerError};
pub use filter::FilterPattern;
pub use handler::{Handler, MessageHandler};
pub use message::{EventDetail, Message, MessageKind};
pub use registry::{Subscription, SubscriptionRegistry};
pub use retry::{
    DeliveryOutcome, RetryPolicy, Timer, TokioTimer, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_BACKOFF_RATE, DEFAULT_RETRY_DELAY,
};

// Handlers return boxed futures
pub use futures::future::BoxFuture;
