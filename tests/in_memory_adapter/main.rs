//! In-memory adapter integration tests.

mod support;
mod batches;

#[cfg(feature = "bus")]
mod attachment;
