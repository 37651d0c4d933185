//! Builder for [`InMemoryMessageBusAdapter`].

use std::sync::Arc;
use std::time::Duration;

use super::in_memory::InMemoryMessageBusAdapter;
use crate::config::BusConfig;
use crate::error::ConfigError;
use crate::retry::{
    RetryPolicy, Timer, TokioTimer, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_RATE,
    DEFAULT_RETRY_DELAY,
};

/// Configures retries and the timer before building an adapter.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use sourced_bus::InMemoryMessageBusAdapter;
///
/// let adapter = InMemoryMessageBusAdapter::builder()
///     .retry_attempts(3)
///     .retry_delay(Duration::from_millis(100))
///     .retry_backoff_rate(2.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(adapter.retry_policy().retry_attempts(), 3);
/// ```
pub struct AdapterBuilder {
    retry_attempts: u32,
    retry_delay: Duration,
    retry_backoff_rate: f64,
    timer: Arc<dyn Timer>,
}

impl Default for AdapterBuilder {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_backoff_rate: DEFAULT_RETRY_BACKOFF_RATE,
            timer: Arc::new(TokioTimer),
        }
    }
}

impl AdapterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every retry setting from `config`.
    pub fn config(mut self, config: &BusConfig) -> Self {
        self.retry_attempts = config.retry_attempts;
        self.retry_delay = Duration::from_millis(config.retry_delay_in_ms);
        self.retry_backoff_rate = config.retry_backoff_rate;
        self
    }

    pub fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_backoff_rate(mut self, retry_backoff_rate: f64) -> Self {
        self.retry_backoff_rate = retry_backoff_rate;
        self
    }

    /// Replace the timer used between retries.
    pub fn timer(mut self, timer: impl Timer) -> Self {
        self.timer = Arc::new(timer);
        self
    }

    pub fn build(self) -> Result<InMemoryMessageBusAdapter, ConfigError> {
        let policy = RetryPolicy::new(
            self.retry_attempts,
            self.retry_delay,
            self.retry_backoff_rate,
        )?;
        Ok(InMemoryMessageBusAdapter::from_parts(policy, self.timer))
    }

    /// Build the adapter and install it as the channel of `bus`.
    #[cfg(feature = "bus")]
    pub fn attach_to(
        self,
        bus: &mut crate::bus::MessageBus,
    ) -> Result<Arc<InMemoryMessageBusAdapter>, ConfigError> {
        let adapter = Arc::new(self.build()?);
        bus.set_channel(Arc::clone(&adapter) as Arc<dyn crate::bus::MessageChannel>);
        tracing::info!(
            bus_id = bus.id(),
            retry_attempts = adapter.retry_policy().retry_attempts(),
            "in-memory adapter attached"
        );
        Ok(adapter)
    }
}
