//! Message bus facade and the channel contract behind it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MessageBus (per bus id)                      │
//! │  - validates the source event store                         │
//! │  - publish_message / publish_replayed / publish_messages     │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MessageChannel trait                        │
//! │  publish_message(message, options) / publish_messages(..)   │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                    │
//!          ▼                                    ▼
//! ┌──────────────────────────┐    ┌──────────────────────────────┐
//! │ InMemoryMessageBusAdapter│    │ network transport            │
//! │       (included)         │    │ (external)                   │
//! └──────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut bus = MessageBus::new("POKEMON_EVENTS", ["POKEMONS"]);
//! let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default())?;
//!
//! adapter.on(FilterPattern::store("POKEMONS"), |message, context| async move {
//!     // react to the message
//!     Ok(())
//! });
//!
//! bus.publish_message(message).await?;
//! ```

#[allow(clippy::module_inception)]
mod bus;
mod channel;

pub use bus::MessageBus;
pub use channel::MessageChannel;
