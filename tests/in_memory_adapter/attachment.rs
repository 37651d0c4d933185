//! Publishing through a `MessageBus` with the adapter attached.

use std::sync::{Arc, Mutex};

use serde_json::json;
use sourced_bus::bus::MessageBus;
use sourced_bus::{
    BusConfig, BusError, EventDetail, FilterPattern, InMemoryMessageBusAdapter, Message,
    PublishOptions,
};

use crate::support::{game_started, init_tracing, pokemon_appeared, Recorder, POKEMONS, TRAINERS};

#[tokio::test]
async fn bus_publishes_through_attached_adapter() {
    init_tracing();
    let mut bus = MessageBus::new("POKEMON_EVENTS", [POKEMONS, TRAINERS]);
    assert!(!bus.has_channel());

    let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();
    assert!(bus.has_channel());

    let recorder = Recorder::new().subscribe(&adapter, FilterPattern::store(POKEMONS));

    let report = bus.publish_message(pokemon_appeared("pikachu1")).await.unwrap();
    assert_eq!(report.delivered, 1);

    // Direct adapter publishes reach the same subscriptions
    adapter
        .publish_message(pokemon_appeared("pikachu2"), PublishOptions::default())
        .await;
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn bus_replays_reach_replay_handlers_only() {
    let mut bus = MessageBus::new("POKEMON_EVENTS", [POKEMONS]);
    let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();
    let live = Recorder::new().subscribe(&adapter, FilterPattern::all());
    let replayer = Recorder::new().subscribe(&adapter, FilterPattern::all().on_replay());

    bus.publish_replayed(pokemon_appeared("pikachu1")).await.unwrap();

    assert_eq!(live.count(), 0);
    assert_eq!(replayer.count(), 1);
}

#[tokio::test]
async fn bus_batches_fan_out_per_message() {
    let mut bus = MessageBus::new("POKEMON_EVENTS", [POKEMONS, TRAINERS]);
    let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();
    let recorder = Recorder::new().subscribe(&adapter, FilterPattern::all());

    let reports = bus
        .publish_messages(
            vec![pokemon_appeared("pikachu1"), game_started("ash")],
            PublishOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn bus_rejects_messages_from_foreign_stores() {
    let mut bus = MessageBus::new("POKEMON_EVENTS", [POKEMONS]);
    let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();
    let recorder = Recorder::new().subscribe(&adapter, FilterPattern::all());

    let err = bus.publish_message(game_started("ash")).await.unwrap_err();

    assert!(matches!(err, BusError::UnknownEventStore { .. }));
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn state_carrying_messages_expose_the_aggregate() {
    let mut bus = MessageBus::new("POKEMON_STATE", [POKEMONS]);
    let adapter = InMemoryMessageBusAdapter::attach_to(&mut bus, BusConfig::default()).unwrap();

    let levels = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&levels);
    adapter.on(FilterPattern::store(POKEMONS), move |message, _context| {
        let seen = Arc::clone(&seen);
        async move {
            let aggregate: serde_json::Value = message.aggregate_as()?;
            seen.lock().unwrap().push(aggregate["level"].as_u64());
            Ok(())
        }
    });

    let message = Message::state_carrying(
        POKEMONS,
        EventDetail::new("pikachu1", 3, "LEVELLED_UP"),
        json!({ "level": 7 }),
    );
    bus.publish_message(message).await.unwrap();

    assert_eq!(*levels.lock().unwrap(), vec![Some(7)]);
}

#[test]
fn attach_rejects_invalid_config() {
    let mut bus = MessageBus::new("POKEMON_EVENTS", [POKEMONS]);
    let config = BusConfig {
        retry_backoff_rate: 0.5,
        ..BusConfig::default()
    };

    assert!(InMemoryMessageBusAdapter::attach_to(&mut bus, config).is_err());
    assert!(!bus.has_channel());
}
