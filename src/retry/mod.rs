//! Retry policy and the timer it waits on.

mod policy;
mod timer;

pub use policy::{
    DeliveryOutcome, RetryPolicy, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_RATE,
    DEFAULT_RETRY_DELAY,
};
pub use timer::{Timer, TokioTimer};
