//! Context passed to message handlers.

/// Per-invocation metadata handed to a handler.
///
/// A fresh context is built for every attempt; handlers can use it to tell a
/// first delivery from a retry, or a replay from a real-time publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskContext {
    /// 1-based counter of the current try.
    pub attempt: u32,
    /// Retries still available after this attempt fails.
    pub retry_attempts_left: u32,
    /// Whether the message is being replayed.
    pub replay: bool,
}

impl TaskContext {
    /// Context for the first attempt of a delivery.
    pub(crate) fn first(retry_attempts: u32, replay: bool) -> Self {
        Self {
            attempt: 1,
            retry_attempts_left: retry_attempts,
            replay,
        }
    }

    /// Context for the attempt following this one.
    pub(crate) fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            retry_attempts_left: self.retry_attempts_left.saturating_sub(1),
            replay: self.replay,
        }
    }

    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }

    pub fn is_last_attempt(&self) -> bool {
        self.retry_attempts_left == 0
    }
}
