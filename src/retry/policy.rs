//! Bounded retries with exponential backoff.
//!
//! A delivery is one handler processing one message. It is driven as a small
//! state machine:
//!
//! ```text
//! Attempting ──ok──► Succeeded
//!     │
//!    err ── retries left ──► Delaying ──► Attempting (attempt + 1)
//!     │
//!     └──── none left ─────► Exhausted
//! ```
//!
//! The delay before retry `n + 1` is `retry_delay × retry_backoff_rate^(n - 1)`
//! where `n` is the attempt that just failed. There is no jitter and no cap.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, warn};

use super::timer::Timer;
use crate::context::TaskContext;
use crate::error::{ConfigError, DeliveryError, HandlerError};
use crate::handler::Handler;
use crate::message::Message;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_RETRY_BACKOFF_RATE: f64 = 1.5;

/// Retry configuration shared by every delivery of an adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    retry_attempts: u32,
    retry_delay: Duration,
    retry_backoff_rate: f64,
}

impl Default for RetryPolicy {
    /// 2 retries, 500ms base delay, ×1.5 per retry.
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_backoff_rate: DEFAULT_RETRY_BACKOFF_RATE,
        }
    }
}

/// A delivery that eventually succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Number of invocations, including the successful one.
    pub attempts: u32,
}

enum RetryState {
    Attempting(TaskContext),
    Delaying {
        failed: TaskContext,
        error: HandlerError,
    },
    Succeeded {
        attempts: u32,
    },
    Exhausted {
        attempts: u32,
        error: HandlerError,
    },
}

impl RetryPolicy {
    /// Build a policy, rejecting backoff rates that would shrink or overflow delays.
    pub fn new(
        retry_attempts: u32,
        retry_delay: Duration,
        retry_backoff_rate: f64,
    ) -> Result<Self, ConfigError> {
        if !retry_backoff_rate.is_finite() || retry_backoff_rate < 1.0 {
            return Err(ConfigError::InvalidBackoffRate(retry_backoff_rate));
        }
        Ok(Self {
            retry_attempts,
            retry_delay,
            retry_backoff_rate,
        })
    }

    /// A policy that invokes each handler exactly once.
    pub fn no_retry() -> Self {
        Self {
            retry_attempts: 0,
            ..Self::default()
        }
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn retry_backoff_rate(&self) -> f64 {
        self.retry_backoff_rate
    }

    /// Upper bound on invocations per delivery.
    pub fn max_invocations(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Delay to wait after `failed_attempt` (1-based) before trying again.
    pub fn delay_before_retry(&self, failed_attempt: u32) -> Duration {
        if self.retry_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = failed_attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.retry_delay.as_secs_f64() * self.retry_backoff_rate.powi(exponent);

        if !secs.is_finite() || secs >= Duration::MAX.as_secs_f64() {
            Duration::MAX
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Deliver `message` to `handler`, retrying failures per this policy.
    ///
    /// Attempts are strictly sequential. A panicking handler counts as a failed
    /// attempt.
    pub async fn run(
        &self,
        handler: &Handler,
        message: Arc<Message>,
        replay: bool,
        timer: &dyn Timer,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let mut state = RetryState::Attempting(TaskContext::first(self.retry_attempts, replay));

        loop {
            state = match state {
                RetryState::Attempting(context) => {
                    match invoke_once(handler, Arc::clone(&message), context).await {
                        Ok(()) => RetryState::Succeeded {
                            attempts: context.attempt,
                        },
                        Err(error) if context.is_last_attempt() => RetryState::Exhausted {
                            attempts: context.attempt,
                            error,
                        },
                        Err(error) => RetryState::Delaying {
                            failed: context,
                            error,
                        },
                    }
                }
                RetryState::Delaying { failed, error } => {
                    let delay = self.delay_before_retry(failed.attempt);
                    debug!(
                        event_store_id = %message.event_store_id,
                        event_type = %message.event.event_type,
                        handler_id = handler.id(),
                        attempt = failed.attempt,
                        retry_attempts_left = failed.retry_attempts_left,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "handler attempt failed, retrying"
                    );
                    timer.sleep(delay).await;
                    RetryState::Attempting(failed.next_attempt())
                }
                RetryState::Succeeded { attempts } => {
                    return Ok(DeliveryOutcome { attempts });
                }
                RetryState::Exhausted { attempts, error } => {
                    warn!(
                        event_store_id = %message.event_store_id,
                        event_type = %message.event.event_type,
                        handler_id = handler.id(),
                        attempts,
                        error = %error,
                        "handler failed, no retries left"
                    );
                    return Err(DeliveryError::RetryExhausted {
                        handler_id: handler.id(),
                        attempts,
                        source: error,
                    });
                }
            };
        }
    }
}

async fn invoke_once(
    handler: &Handler,
    message: Arc<Message>,
    context: TaskContext,
) -> Result<(), HandlerError> {
    AssertUnwindSafe(async move { handler.invoke(message, context).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let panic = panic_message(panic.as_ref());
            warn!(
                handler_id = handler.id(),
                attempt = context.attempt,
                panic = %panic,
                "handler panicked"
            );
            Err(HandlerError::Panicked(panic))
        })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
