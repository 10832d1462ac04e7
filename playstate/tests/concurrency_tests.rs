//! Concurrent access tests
//!
//! Producers on several threads, polling readers, and notifiers that call
//! back into the engine.

mod helpers;

use helpers::*;
use playstate::host::StreamInfo;
use playstate::scenario::StaticHost;
use playstate::{StateEngine, StateNotifier};
use playstate_common::config::EngineConfig;
use playstate_common::events::{MediaType, PlaybackPhase};
use playstate_common::timing::ms_to_ticks;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread;

fn video_media() -> playstate::scenario::StaticMedia {
    media()
        .stream(MediaType::Audio, audio_stream(64_000))
        .stream(MediaType::Video, video_stream(600_000, 25.0))
        .blocks(MediaType::Video, blocks_every(40, 250))
        .build()
}

#[test]
fn test_concurrent_producers_keep_invariants() {
    let fixture = EngineFixture::opened(video_media());
    fixture.host.set_can_read_more(true);
    let engine = &fixture.engine;

    thread::scope(|s| {
        for worker in 0..4i64 {
            s.spawn(move || {
                for i in 0..500i64 {
                    engine.update_position(ms_to_ticks((worker * 500 + i) * 7 % 10_000));
                }
            });
        }
        for worker in 0..2u64 {
            s.spawn(move || {
                for i in 0..500u64 {
                    engine.update_progress((worker * 100_000 + i * 1_000) % 400_000);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..1_000 {
                let session = engine.session();
                assert!(session.download_cache_length >= session.buffer_cache_length);
                assert!((0.0..=1.0).contains(&session.buffering_progress));
                assert!((0.0..=1.0).contains(&session.download_progress));
                assert!(session.position_previous_ticks <= session.position_next_ticks);
            }
        });
    });

    // Discrete positions always belong to the stored position
    let session = engine.session();
    let block_start = session.position_ticks / ms_to_ticks(40) * ms_to_ticks(40);
    assert_eq!(session.position_current_ticks, block_start);
}

#[test]
fn test_racing_media_ended_fires_once() {
    let fixture = EngineFixture::opened(video_media());
    let engine = &fixture.engine;

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| engine.set_media_ended(true));
        }
    });

    assert_eq!(fixture.notifier.count(Recorded::MediaEnded), 1);
}

#[test]
fn test_racing_buffering_signals_fire_once_per_edge() {
    let fixture = EngineFixture::opened(video_media());
    let engine = &fixture.engine;

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| engine.signal_buffering_started());
        }
    });
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| engine.signal_buffering_ended());
        }
    });

    assert_eq!(fixture.notifier.count(Recorded::BufferingStarted), 1);
    assert_eq!(fixture.notifier.count(Recorded::BufferingEnded), 1);
}

/// Reads the engine from inside every notification
#[derive(Default)]
struct ReentrantNotifier {
    engine: OnceLock<Weak<StateEngine>>,
    observed: AtomicUsize,
}

impl ReentrantNotifier {
    fn poll(&self) {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            let _ = engine.session();
            let _ = engine.properties();
            self.observed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl StateNotifier for ReentrantNotifier {
    fn phase_changed(&self, _old: PlaybackPhase, new: PlaybackPhase) {
        self.poll();
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            assert_eq!(engine.phase(), new);
        }
    }

    fn position_changed(&self, _old: i64, _new: i64) {
        self.poll();
    }

    fn buffering_started(&self) {
        self.poll();
    }

    fn buffering_ended(&self) {
        self.poll();
    }

    fn media_ended(&self) {
        self.poll();
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            // Writes from inside a notification must not deadlock either
            engine.set_volume(0.5);
        }
    }
}

#[test]
fn test_notifier_may_call_back_into_engine() {
    let host = Arc::new(StaticHost::with_media(video_media()));
    let notifier = Arc::new(ReentrantNotifier::default());
    let engine = Arc::new(StateEngine::new(
        host.clone(),
        notifier.clone(),
        EngineConfig::default(),
    ));
    let _ = notifier.engine.set(Arc::downgrade(&engine));

    open_session(&engine);
    engine.update_position(ms_to_ticks(500));
    engine.signal_buffering_started();
    engine.set_media_ended(true);
    engine.reset_session();

    // Opening, Playing, position, started, ended, media ended, Closed
    assert_eq!(notifier.observed.load(Ordering::SeqCst), 7);
    assert_eq!(engine.volume(), 0.5);
}

#[test]
fn test_snapshot_swapped_whole() {
    let host = Arc::new(StaticHost::new());
    let engine = Arc::new(StateEngine::new(
        host.clone(),
        Arc::new(playstate::NullNotifier),
        EngineConfig::default(),
    ));
    engine.set_phase(PlaybackPhase::Playing, None);

    let hd = media()
        .stream(
            MediaType::Video,
            StreamInfo {
                frame_width: 1920,
                frame_height: 1080,
                ..video_stream(600_000, 25.0)
            },
        )
        .build();
    let sd = media()
        .stream(
            MediaType::Video,
            StreamInfo {
                frame_width: 640,
                frame_height: 480,
                ..video_stream(600_000, 25.0)
            },
        )
        .build();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                host.attach(if i % 2 == 0 { hd.clone() } else { sd.clone() });
                engine.refresh_snapshot();
            }
        });
        s.spawn(|| {
            for _ in 0..1_000 {
                let snapshot = engine.snapshot();
                let size = (snapshot.natural_video_width, snapshot.natural_video_height);
                assert!(
                    size == (1920, 1080) || size == (640, 480) || size == (0, 0),
                    "mixed snapshot: {:?}",
                    size
                );
            }
        });
    });
}
