//! State Engine Hot Path Benchmark
//!
//! Measures the calls producer threads make on every clock tick and every
//! demuxer read.
//!
//! **Goal:** Position and progress updates cost a lock plus a few copies
//! **Target:** >1M updates/second on a single thread

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use playstate::host::{BlockSpan, StreamInfo};
use playstate::scenario::{StaticContainer, StaticHost, StaticMedia, StaticTimeline};
use playstate::{NullNotifier, StateEngine};
use playstate_common::config::EngineConfig;
use playstate_common::events::{MediaType, PlaybackPhase};
use playstate_common::timing::ms_to_ticks;
use std::collections::BTreeMap;
use std::sync::Arc;

fn opened_engine() -> Arc<StateEngine> {
    let mut streams = BTreeMap::new();
    streams.insert(
        MediaType::Video,
        StreamInfo {
            bitrate: 600_000,
            frame_rate: 25.0,
            ..Default::default()
        },
    );
    streams.insert(
        MediaType::Audio,
        StreamInfo {
            bitrate: 64_000,
            ..Default::default()
        },
    );

    // Ten minutes of 40ms video blocks
    let blocks = (0..15_000i64)
        .map(|i| BlockSpan::new(ms_to_ticks(i * 40), ms_to_ticks((i + 1) * 40)))
        .collect();
    let mut timelines = BTreeMap::new();
    timelines.insert(MediaType::Video, Arc::new(StaticTimeline::new(blocks)));

    let host = Arc::new(StaticHost::with_media(StaticMedia {
        container: Arc::new(StaticContainer {
            is_open: true,
            streams,
            ..Default::default()
        }),
        timelines,
    }));
    host.set_can_read_more(true);

    let engine = Arc::new(StateEngine::new(
        host,
        Arc::new(NullNotifier),
        EngineConfig::default(),
    ));
    engine.set_phase(PlaybackPhase::Playing, None);
    engine.refresh_snapshot();
    engine.initialize_buffering();
    engine
}

fn bench_hot_paths(c: &mut Criterion) {
    let engine = opened_engine();
    let mut group = c.benchmark_group("state_engine");

    let mut position = 0i64;
    group.bench_function("update_position", |b| {
        b.iter(|| {
            position = (position + ms_to_ticks(7)) % ms_to_ticks(600_000);
            engine.update_position(black_box(position));
        });
    });

    let mut queued = 0u64;
    group.bench_function("update_progress", |b| {
        b.iter(|| {
            queued = (queued + 4_096) % 400_000;
            engine.update_progress(black_box(queued));
        });
    });

    group.bench_function("session_copy", |b| {
        b.iter(|| black_box(engine.session()));
    });

    group.bench_function("properties", |b| {
        b.iter(|| black_box(engine.properties()));
    });

    group.finish();
}

criterion_group!(benches, bench_hot_paths);
criterion_main!(benches);
