//! Transport contract behind a message bus.

use futures::future::BoxFuture;

use crate::adapter::{InMemoryMessageBusAdapter, PublishOptions, PublishReport};
use crate::message::Message;

/// The transport a [`MessageBus`](super::MessageBus) publishes through.
///
/// Implementations might include:
/// - `InMemoryMessageBusAdapter` - in-process dispatch (included)
/// - a cloud event bus adapter - forwards messages over the network
///
/// Whatever the transport, handlers see the same registration, matching and
/// retry behaviour.
pub trait MessageChannel: Send + Sync {
    /// Publish a single message.
    fn publish_message(
        &self,
        message: Message,
        options: PublishOptions,
    ) -> BoxFuture<'_, PublishReport>;

    /// Publish multiple messages.
    ///
    /// Default implementation publishes messages sequentially, each one
    /// settling before the next starts.
    fn publish_messages(
        &self,
        messages: Vec<Message>,
        options: PublishOptions,
    ) -> BoxFuture<'_, Vec<PublishReport>> {
        Box::pin(async move {
            let mut reports = Vec::with_capacity(messages.len());
            for message in messages {
                reports.push(self.publish_message(message, options).await);
            }
            reports
        })
    }
}

impl MessageChannel for InMemoryMessageBusAdapter {
    fn publish_message(
        &self,
        message: Message,
        options: PublishOptions,
    ) -> BoxFuture<'_, PublishReport> {
        Box::pin(InMemoryMessageBusAdapter::publish_message(self, message, options))
    }

    fn publish_messages(
        &self,
        messages: Vec<Message>,
        options: PublishOptions,
    ) -> BoxFuture<'_, Vec<PublishReport>> {
        Box::pin(InMemoryMessageBusAdapter::publish_messages(
            self, messages, options,
        ))
    }
}
