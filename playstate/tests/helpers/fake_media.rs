//! Builders for in-memory media and engines bound to it

use super::RecordingNotifier;
use playstate::host::{BlockSpan, StreamInfo};
use playstate::scenario::{StaticContainer, StaticHost, StaticMedia, StaticTimeline};
use playstate::StateEngine;
use playstate_common::config::EngineConfig;
use playstate_common::events::{MediaType, PlaybackPhase};
use playstate_common::timing::ms_to_ticks;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn video_stream(bitrate: u64, frame_rate: f64) -> StreamInfo {
    StreamInfo {
        index: 0,
        codec_name: Some("h264".to_string()),
        bitrate,
        frame_rate,
        frame_width: 1280,
        frame_height: 720,
        ..Default::default()
    }
}

pub fn audio_stream(bitrate: u64) -> StreamInfo {
    StreamInfo {
        index: 1,
        codec_name: Some("aac".to_string()),
        bitrate,
        channels: 2,
        sample_rate: 48_000,
        ..Default::default()
    }
}

/// `count` back-to-back blocks of `duration_ms` starting at 0
pub fn blocks_every(duration_ms: i64, count: i64) -> Vec<BlockSpan> {
    (0..count)
        .map(|i| BlockSpan::new(ms_to_ticks(i * duration_ms), ms_to_ticks((i + 1) * duration_ms)))
        .collect()
}

/// Fluent builder for [`StaticMedia`]
pub struct MediaBuilder {
    container: StaticContainer,
    timelines: BTreeMap<MediaType, Arc<StaticTimeline>>,
}

pub fn media() -> MediaBuilder {
    MediaBuilder {
        container: StaticContainer {
            is_open: true,
            is_seekable: true,
            ..Default::default()
        },
        timelines: BTreeMap::new(),
    }
}

impl MediaBuilder {
    pub fn stream(mut self, media_type: MediaType, info: StreamInfo) -> Self {
        self.container.streams.insert(media_type, info);
        self
    }

    pub fn container_bitrate(mut self, bitrate: u64) -> Self {
        self.container.media_bitrate = bitrate;
        self
    }

    pub fn network(mut self) -> Self {
        self.container.is_network_stream = true;
        self
    }

    pub fn live(mut self) -> Self {
        self.container.is_live_stream = true;
        self.container.is_seekable = false;
        self
    }

    pub fn blocks(mut self, media_type: MediaType, blocks: Vec<BlockSpan>) -> Self {
        self.timelines
            .insert(media_type, Arc::new(StaticTimeline::new(blocks)));
        self
    }

    /// Timeline with no blocks but a given decoded duration
    pub fn decoded(mut self, media_type: MediaType, decoded_ms: i64) -> Self {
        let timeline = StaticTimeline::new(Vec::new()).with_lifetime_duration(ms_to_ticks(decoded_ms));
        self.timelines.insert(media_type, Arc::new(timeline));
        self
    }

    pub fn build(self) -> StaticMedia {
        StaticMedia {
            container: Arc::new(self.container),
            timelines: self.timelines,
        }
    }
}

/// Engine wired to a StaticHost and a RecordingNotifier
pub struct EngineFixture {
    pub engine: Arc<StateEngine>,
    pub host: Arc<StaticHost>,
    pub notifier: Arc<RecordingNotifier>,
}

impl EngineFixture {
    pub fn new(config: EngineConfig) -> Self {
        let host = Arc::new(StaticHost::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = Arc::new(StateEngine::new(host.clone(), notifier.clone(), config));
        Self {
            engine,
            host,
            notifier,
        }
    }

    /// Fixture with `media` opened and notifications cleared
    pub fn opened(media: StaticMedia) -> Self {
        let fixture = Self::new(EngineConfig::default());
        fixture.host.attach(media);
        open_session(&fixture.engine);
        fixture.notifier.clear();
        fixture
    }
}

/// The open sequence a media element performs
pub fn open_session(engine: &StateEngine) {
    engine.set_phase(PlaybackPhase::Opening, None);
    engine.refresh_snapshot();
    engine.initialize_buffering();
    engine.set_phase(PlaybackPhase::Playing, None);
    engine.refresh_snapshot();
}
