//! In-memory message bus adapter.
//!
//! Resolves the handlers subscribed to a message and runs each of them on its
//! own Tokio task, wrapped in the retry policy. A slow or failing handler
//! never holds up its siblings; a publish completes once every matched
//! handler has succeeded or exhausted its retries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use super::builder::AdapterBuilder;
use super::publish::{PublishOptions, PublishReport};
use crate::config::BusConfig;
use crate::context::TaskContext;
use crate::error::{ConfigError, DeliveryError, HandlerError};
use crate::filter::FilterPattern;
use crate::handler::Handler;
use crate::message::Message;
use crate::registry::SubscriptionRegistry;
use crate::retry::{RetryPolicy, Timer, TokioTimer};

/// In-process message bus: pattern-filtered subscriptions with retried,
/// concurrent fan-out.
///
/// Publishing spawns Tokio tasks, so it must happen inside a Tokio runtime.
///
/// ## Example
///
/// ```
/// use sourced_bus::{EventDetail, FilterPattern, InMemoryMessageBusAdapter, Message, PublishOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let adapter = InMemoryMessageBusAdapter::new();
/// adapter.on(FilterPattern::store("POKEMONS").event_type("APPEARED"), |message, context| async move {
///     assert_eq!(message.event.event_type, "APPEARED");
///     assert_eq!(context.attempt, 1);
///     Ok(())
/// });
///
/// let appeared = Message::notification("POKEMONS", EventDetail::new("pikachu1", 1, "APPEARED"));
/// let report = adapter.publish_message(appeared, PublishOptions::default()).await;
/// assert_eq!(report.delivered, 1);
/// # }
/// ```
pub struct InMemoryMessageBusAdapter {
    registry: SubscriptionRegistry,
    policy: RetryPolicy,
    timer: Arc<dyn Timer>,
}

impl Default for InMemoryMessageBusAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryMessageBusAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMessageBusAdapter")
            .field("subscriptions", &self.registry.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl InMemoryMessageBusAdapter {
    /// Adapter with the default retry policy and the Tokio timer.
    pub fn new() -> Self {
        Self::from_parts(RetryPolicy::default(), Arc::new(TokioTimer))
    }

    pub fn with_config(config: BusConfig) -> Result<Self, ConfigError> {
        AdapterBuilder::new().config(&config).build()
    }

    pub fn builder() -> AdapterBuilder {
        AdapterBuilder::new()
    }

    pub(crate) fn from_parts(policy: RetryPolicy, timer: Arc<dyn Timer>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            policy,
            timer,
        }
    }

    /// Build an adapter from `config` and install it as the channel of `bus`.
    ///
    /// The returned adapter is the one the bus publishes through; register
    /// handlers on it with [`on`](Self::on).
    #[cfg(feature = "bus")]
    pub fn attach_to(
        bus: &mut crate::bus::MessageBus,
        config: BusConfig,
    ) -> Result<Arc<Self>, ConfigError> {
        AdapterBuilder::new().config(&config).attach_to(bus)
    }

    /// Subscribe an async closure to messages matching `pattern`.
    ///
    /// Returns the handler so it can be registered under more patterns with
    /// [`subscribe`](Self::subscribe); it still runs once per message.
    pub fn on<F, Fut>(&self, pattern: FilterPattern, handler: F) -> Handler
    where
        F: Fn(Arc<Message>, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler = Handler::from_fn(handler);
        self.subscribe(pattern, &handler);
        handler
    }

    /// Subscribe an existing handler to messages matching `pattern`.
    pub fn subscribe(&self, pattern: FilterPattern, handler: &Handler) {
        debug!(
            event_store_id = pattern.event_store_id.as_deref().unwrap_or("*"),
            event_type = pattern.event_type.as_deref().unwrap_or("*"),
            on_replay = pattern.on_replay,
            handler_id = handler.id(),
            "subscription registered"
        );
        self.registry.register(pattern, handler.clone());
    }

    /// Deliver one message to every matching handler.
    ///
    /// Handlers run concurrently, each with its own retry loop. Resolves once
    /// all of them have settled. Never fails: a message nobody listens to is a
    /// no-op, and handlers that give up are listed in the report.
    pub async fn publish_message(&self, message: Message, options: PublishOptions) -> PublishReport {
        let replay = options.replay;
        let handlers = self.registry.resolve(&message, replay);

        let mut report = PublishReport {
            matched: handlers.len(),
            ..PublishReport::default()
        };

        debug!(
            event_store_id = %message.event_store_id,
            event_type = %message.event.event_type,
            replay,
            matched = report.matched,
            "dispatching message"
        );

        if handlers.is_empty() {
            return report;
        }

        let message = Arc::new(message);
        let handler_ids: Vec<usize> = handlers.iter().map(Handler::id).collect();
        let tasks = handlers.into_iter().map(|handler| {
            let message = Arc::clone(&message);
            let timer = Arc::clone(&self.timer);
            let policy = self.policy;
            tokio::spawn(async move { policy.run(&handler, message, replay, timer.as_ref()).await })
        });

        for (handler_id, joined) in handler_ids.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(Ok(_)) => report.delivered += 1,
                Ok(Err(failure)) => report.failures.push(failure),
                Err(join_error) => report.failures.push(DeliveryError::Aborted {
                    handler_id,
                    reason: join_error.to_string(),
                }),
            }
        }

        report
    }

    /// Publish messages one after another.
    ///
    /// Each message's fan-out, retries included, settles before the next
    /// message is dispatched. Reports are returned in input order.
    pub async fn publish_messages<I>(&self, messages: I, options: PublishOptions) -> Vec<PublishReport>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut reports = Vec::new();
        for message in messages {
            reports.push(self.publish_message(message, options).await);
        }
        reports
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
