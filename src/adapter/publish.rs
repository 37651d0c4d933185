//! Publish options and per-message delivery reports.

use crate::error::DeliveryError;

/// Options accepted by every publish entry point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Deliver to `on_replay` subscriptions instead of real-time ones.
    pub replay: bool,
}

impl PublishOptions {
    /// Real-time publish (the default).
    pub fn live() -> Self {
        Self::default()
    }

    /// Replay publish.
    pub fn replay() -> Self {
        Self { replay: true }
    }
}

/// What happened to one published message.
///
/// Failures never abort a publish; they are collected here once every
/// matched handler has settled.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Distinct handlers the message matched.
    pub matched: usize,
    /// Handlers that eventually succeeded.
    pub delivered: usize,
    /// Handlers that gave up.
    pub failures: Vec<DeliveryError>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
