//! Subscription registry: (pattern, handler) pairs and handler resolution.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::filter::FilterPattern;
use crate::handler::Handler;
use crate::message::Message;

/// A handler registered under one pattern.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub pattern: FilterPattern,
    pub handler: Handler,
}

/// Append-only list of subscriptions.
///
/// Thread-safe; resolution takes a read lock so publishes in flight never
/// block each other. Entries are never removed.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription. Existing entries are left untouched.
    pub fn register(&self, pattern: FilterPattern, handler: Handler) {
        // A panic elsewhere cannot leave a half-pushed entry behind.
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscriptions.push(Subscription { pattern, handler });
    }

    /// Handlers whose pattern matches `message` in the given mode.
    ///
    /// Registration order, each handler at most once.
    pub fn resolve(&self, message: &Message, replay: bool) -> Vec<Handler> {
        let subscriptions = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut seen = HashSet::new();
        subscriptions
            .iter()
            .filter(|sub| sub.pattern.matches(message, replay))
            .filter(|sub| seen.insert(sub.handler.id()))
            .map(|sub| sub.handler.clone())
            .collect()
    }

    /// Snapshot of every registered subscription.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
