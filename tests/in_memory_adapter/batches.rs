//! Batch publishing.

use std::time::Duration;

use sourced_bus::{FilterPattern, InMemoryMessageBusAdapter, PublishOptions};

use crate::support::{game_started, pokemon_appeared, pokemon_caught, Recorder, POKEMONS};

#[tokio::test]
async fn every_message_gets_its_own_fan_out() {
    let adapter = InMemoryMessageBusAdapter::new();
    let first = Recorder::new().subscribe(&adapter, FilterPattern::store(POKEMONS));
    let second = Recorder::new().subscribe(&adapter, FilterPattern::all());

    let reports = adapter
        .publish_messages(
            vec![
                pokemon_appeared("pikachu1"),
                pokemon_caught("pikachu1"),
                pokemon_appeared("pikachu2"),
            ],
            PublishOptions::default(),
        )
        .await;

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.matched == 2 && r.delivered == 2));

    for recorder in [&first, &second] {
        let invocations = recorder.invocations();
        assert_eq!(invocations.len(), 3);
        assert!(invocations.iter().all(|i| i.context.attempt == 1));
    }
}

#[tokio::test]
async fn invocation_count_is_messages_times_matching_handlers() {
    let adapter = InMemoryMessageBusAdapter::new();
    let pokemons = Recorder::new().subscribe(&adapter, FilterPattern::store(POKEMONS));
    let everything = Recorder::new().subscribe(&adapter, FilterPattern::all());

    let reports = adapter
        .publish_messages(
            vec![pokemon_appeared("pikachu1"), game_started("ash")],
            PublishOptions::default(),
        )
        .await;

    let matched: usize = reports.iter().map(|r| r.matched).sum();
    assert_eq!(matched, 3);
    assert_eq!(pokemons.count(), 1);
    assert_eq!(everything.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn each_message_settles_before_the_next() {
    let adapter = InMemoryMessageBusAdapter::builder()
        .retry_attempts(1)
        .retry_delay(Duration::from_millis(100))
        .build()
        .unwrap();
    let flaky = Recorder::failing(1).subscribe(&adapter, FilterPattern::all());

    adapter
        .publish_messages(
            vec![pokemon_appeared("pikachu1"), pokemon_appeared("pikachu2")],
            PublishOptions::default(),
        )
        .await;

    let order: Vec<_> = flaky
        .invocations()
        .into_iter()
        .map(|i| (i.aggregate_id, i.context.attempt))
        .collect();
    assert_eq!(
        order,
        vec![
            ("pikachu1".to_string(), 1),
            ("pikachu1".to_string(), 2),
            ("pikachu2".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn empty_batch_publishes_nothing() {
    let adapter = InMemoryMessageBusAdapter::new();
    let recorder = Recorder::new().subscribe(&adapter, FilterPattern::all());

    let reports = adapter
        .publish_messages(Vec::new(), PublishOptions::default())
        .await;

    assert!(reports.is_empty());
    assert_eq!(recorder.count(), 0);
}
