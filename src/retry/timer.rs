//! Timer used to wait between retry attempts.

use std::time::Duration;

use futures::future::BoxFuture;

/// Suspends a retry loop for the backoff delay.
///
/// The returned future must only suspend the loop that awaits it; other
/// handlers keep running. Swap it out in tests to observe or shortcut delays.
///
/// A timer only replaces the waiting. Each delivery still runs on its own
/// `tokio::spawn`ed task, so publishing needs a Tokio runtime whichever timer
/// is installed.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use sourced_bus::{BoxFuture, EventDetail, FilterPattern, InMemoryMessageBusAdapter, Message, PublishOptions, Timer};
///
/// struct NoWait;
///
/// impl Timer for NoWait {
///     fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
///         Box::pin(async {})
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let adapter = InMemoryMessageBusAdapter::builder()
///     .retry_delay(Duration::from_secs(3600))
///     .timer(NoWait)
///     .build()
///     .unwrap();
/// adapter.on(FilterPattern::all(), |_message, context| async move {
///     if context.is_last_attempt() {
///         Ok(())
///     } else {
///         Err(sourced_bus::HandlerError::rejected("not yet"))
///     }
/// });
///
/// let message = Message::notification("POKEMONS", EventDetail::new("pikachu1", 1, "APPEARED"));
/// let report = adapter.publish_message(message, PublishOptions::live()).await;
/// assert!(report.is_success());
/// # }
/// ```
pub trait Timer: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Timer backed by `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
