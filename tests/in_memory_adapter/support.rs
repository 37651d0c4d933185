//! Shared fixtures: messages, a recording handler and tracing setup.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sourced_bus::{
    EventDetail, FilterPattern, Handler, HandlerError, InMemoryMessageBusAdapter, Message,
    TaskContext,
};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

pub const POKEMONS: &str = "POKEMONS";
pub const TRAINERS: &str = "TRAINERS";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert `actual` is within 5% of `expected`.
pub fn assert_close(actual: Duration, expected: Duration) {
    let tolerance = expected.as_secs_f64() * 0.05;
    let diff = (actual.as_secs_f64() - expected.as_secs_f64()).abs();
    assert!(
        diff <= tolerance,
        "expected {:?} (±5%), got {:?}",
        expected,
        actual
    );
}

pub fn pokemon_appeared(id: &str) -> Message {
    Message::notification(POKEMONS, EventDetail::new(id, 1, "APPEARED"))
}

pub fn pokemon_caught(id: &str) -> Message {
    Message::notification(POKEMONS, EventDetail::new(id, 2, "CAUGHT_BY_TRAINER"))
}

pub fn game_started(id: &str) -> Message {
    Message::notification(TRAINERS, EventDetail::new(id, 1, "GAME_STARTED"))
}

/// One handler invocation as seen by the handler.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub aggregate_id: String,
    pub event_type: String,
    pub context: TaskContext,
    pub at: Instant,
}

/// Handler that records every invocation and fails its first `failures` calls.
#[derive(Clone)]
pub struct Recorder {
    pub handler: Handler,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: u32) -> Self {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicU32::new(0));
        let log = Arc::clone(&invocations);

        let handler = Handler::from_fn(move |message: Arc<Message>, context| {
            let log = Arc::clone(&log);
            let calls = Arc::clone(&calls);
            async move {
                log.lock().unwrap().push(Invocation {
                    aggregate_id: message.event.aggregate_id.clone(),
                    event_type: message.event.event_type.clone(),
                    context,
                    at: Instant::now(),
                });
                if calls.fetch_add(1, Ordering::SeqCst) < failures {
                    Err(HandlerError::rejected("transient failure"))
                } else {
                    Ok(())
                }
            }
        });

        Self {
            handler,
            invocations,
        }
    }

    /// Register this recorder on `adapter` under `pattern`.
    pub fn subscribe(self, adapter: &InMemoryMessageBusAdapter, pattern: FilterPattern) -> Self {
        adapter.subscribe(pattern, &self.handler);
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}
