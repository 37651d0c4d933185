//! Message bus facade - the publishing entry point for event stores.

use std::fmt;
use std::sync::Arc;

use super::channel::MessageChannel;
use crate::adapter::{PublishOptions, PublishReport};
use crate::error::BusError;
use crate::message::Message;

/// A named message bus fed by a set of event stores.
///
/// The bus validates what is published and hands it to its channel. The
/// channel is injected, either with [`MessageBus::with_channel`] or by
/// [`InMemoryMessageBusAdapter::attach_to`](crate::InMemoryMessageBusAdapter::attach_to).
///
/// ## Example
///
/// ```
/// use sourced_bus::bus::MessageBus;
/// use sourced_bus::{BusConfig, EventDetail, FilterPattern, InMemoryMessageBusAdapter, Message};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut bus = MessageBus::new("POKEMON_EVENTS", ["POKEMONS", "TRAINERS"]);
/// let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();
///
/// adapter.on(FilterPattern::store("POKEMONS"), |_message, _context| async { Ok(()) });
///
/// let message = Message::notification("POKEMONS", EventDetail::new("pikachu1", 1, "APPEARED"));
/// let report = bus.publish_message(message).await.unwrap();
/// assert_eq!(report.delivered, 1);
/// # }
/// ```
pub struct MessageBus {
    id: String,
    source_event_store_ids: Vec<String>,
    channel: Option<Arc<dyn MessageChannel>>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("id", &self.id)
            .field("source_event_store_ids", &self.source_event_store_ids)
            .field("has_channel", &self.channel.is_some())
            .finish()
    }
}

impl MessageBus {
    /// Create a bus with no channel attached.
    ///
    /// An empty source list accepts messages from any event store.
    pub fn new<I, S>(id: impl Into<String>, source_event_store_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            source_event_store_ids: source_event_store_ids.into_iter().map(Into::into).collect(),
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn MessageChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Install `channel`, replacing any previous one.
    pub fn set_channel(&mut self, channel: Arc<dyn MessageChannel>) {
        self.channel = Some(channel);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_event_store_ids(&self) -> &[String] {
        &self.source_event_store_ids
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Publish a real-time message.
    pub async fn publish_message(&self, message: Message) -> Result<PublishReport, BusError> {
        self.publish_with(message, PublishOptions::live()).await
    }

    /// Publish a message in replay mode.
    pub async fn publish_replayed(&self, message: Message) -> Result<PublishReport, BusError> {
        self.publish_with(message, PublishOptions::replay()).await
    }

    pub async fn publish_with(
        &self,
        message: Message,
        options: PublishOptions,
    ) -> Result<PublishReport, BusError> {
        let channel = self.channel()?;
        self.check_source(&message)?;
        Ok(channel.publish_message(message, options).await)
    }

    /// Publish a batch. Every message is validated before any is published.
    pub async fn publish_messages(
        &self,
        messages: Vec<Message>,
        options: PublishOptions,
    ) -> Result<Vec<PublishReport>, BusError> {
        let channel = self.channel()?;
        for message in &messages {
            self.check_source(message)?;
        }
        Ok(channel.publish_messages(messages, options).await)
    }

    fn channel(&self) -> Result<&Arc<dyn MessageChannel>, BusError> {
        self.channel
            .as_ref()
            .ok_or_else(|| BusError::NoChannel(self.id.clone()))
    }

    fn check_source(&self, message: &Message) -> Result<(), BusError> {
        if self.source_event_store_ids.is_empty()
            || self
                .source_event_store_ids
                .iter()
                .any(|id| id == &message.event_store_id)
        {
            Ok(())
        } else {
            Err(BusError::UnknownEventStore {
                bus_id: self.id.clone(),
                event_store_id: message.event_store_id.clone(),
            })
        }
    }
}
