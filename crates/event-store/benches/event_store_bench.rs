use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{EventEnvelope, EventStore, InMemoryEventStore, StreamId, Version};

fn make_event(stream_id: &StreamId, version: u64) -> EventEnvelope {
    EventEnvelope::builder()
        .stream_id(stream_id.clone())
        .aggregate_type("User")
        .event_type("PHOTO_ADDED")
        .version(Version::new(version))
        .payload_raw(serde_json::json!({
            "type": "PHOTO_ADDED",
            "photoUrl": format!("s3://photos/{version}.jpg"),
        }))
        .build()
        .unwrap()
}

fn bench_append_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_single_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let stream = StreamId::random();
                store
                    .append(&stream, Version::initial(), vec![make_event(&stream, 1)])
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_batch_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let stream = StreamId::random();
                let events: Vec<EventEnvelope> =
                    (1..=10).map(|v| make_event(&stream, v)).collect();
                store
                    .append(&stream, Version::initial(), events)
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_load_stream(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let stream = StreamId::random();

    rt.block_on(async {
        let events: Vec<EventEnvelope> = (1..=100).map(|v| make_event(&stream, v)).collect();
        store
            .append(&stream, Version::initial(), events)
            .await
            .unwrap();
    });

    c.bench_function("event_store/load_100_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.load(&stream).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_event,
    bench_append_batch_10,
    bench_load_stream
);
criterion_main!(benches);
