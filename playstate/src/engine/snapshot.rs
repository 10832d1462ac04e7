//! Container property snapshot
//!
//! Fixed, per-session facts copied out of the container. The snapshot is
//! rebuilt as a whole whenever the container changes and swapped in under
//! the state lock, so readers never see a mix of two containers.

use super::StateEngine;
use crate::host::MediaContainer;
use playstate_common::events::{MediaType, PlaybackPhase};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Read-only copy of container properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSnapshot {
    /// Container open and not in the middle of an open command
    pub is_open: bool,
    pub metadata: BTreeMap<String, String>,
    pub media_format: Option<String>,
    /// -1 when the container has no video stream
    pub video_stream_index: i32,
    /// -1 when the container has no audio stream
    pub audio_stream_index: i32,
    /// -1 when the container has no subtitle stream
    pub subtitle_stream_index: i32,
    pub has_audio: bool,
    pub has_video: bool,
    /// Subtitle stream in the container or preloaded subtitles
    pub has_subtitles: bool,
    pub video_codec: Option<String>,
    pub video_bitrate: u64,
    pub video_rotation: f64,
    pub natural_video_width: u32,
    pub natural_video_height: u32,
    pub video_frame_rate: f64,
    /// Seconds per video frame (0 when the frame rate is unknown)
    pub video_frame_duration: f64,
    pub audio_codec: Option<String>,
    pub audio_bitrate: u64,
    pub audio_channels: u32,
    pub audio_sample_rate: u32,
    pub audio_bits_per_sample: u32,
    pub natural_duration_ticks: Option<i64>,
    pub is_live_stream: bool,
    pub is_network_stream: bool,
    pub is_seekable: bool,
    /// Open and not live
    pub can_pause: bool,
    pub has_closed_captions: bool,
    /// Component whose blocks drive position discretization
    pub main_media_type: Option<MediaType>,
}

impl Default for ContainerSnapshot {
    fn default() -> Self {
        Self {
            is_open: false,
            metadata: BTreeMap::new(),
            media_format: None,
            video_stream_index: -1,
            audio_stream_index: -1,
            subtitle_stream_index: -1,
            has_audio: false,
            has_video: false,
            has_subtitles: false,
            video_codec: None,
            video_bitrate: 0,
            video_rotation: 0.0,
            natural_video_width: 0,
            natural_video_height: 0,
            video_frame_rate: 0.0,
            video_frame_duration: 0.0,
            audio_codec: None,
            audio_bitrate: 0,
            audio_channels: 0,
            audio_sample_rate: 0,
            audio_bits_per_sample: 0,
            natural_duration_ticks: None,
            is_live_stream: false,
            is_network_stream: false,
            is_seekable: false,
            can_pause: false,
            has_closed_captions: false,
            main_media_type: None,
        }
    }
}

impl ContainerSnapshot {
    /// Copy every fixed property out of `container`
    ///
    /// A missing container yields the all-defaults snapshot (plus preloaded
    /// subtitles). `is_open` reflects the container only; call
    /// [`ContainerSnapshot::for_phase`] to apply the session phase.
    pub fn capture(container: Option<&dyn MediaContainer>, preloaded_subtitles: usize) -> Self {
        let mut snapshot = ContainerSnapshot {
            has_subtitles: preloaded_subtitles > 0,
            ..Default::default()
        };

        let Some(container) = container else {
            return snapshot;
        };

        snapshot.is_open = container.is_open();
        snapshot.metadata = container.metadata();
        snapshot.media_format = container.format_name();
        snapshot.natural_duration_ticks = container.duration_ticks();
        snapshot.is_live_stream = container.is_live_stream();
        snapshot.is_network_stream = container.is_network_stream();
        snapshot.is_seekable = container.is_seekable();
        snapshot.main_media_type = container.main_media_type();

        if let Some(video) = container.stream(MediaType::Video) {
            snapshot.has_video = true;
            snapshot.video_stream_index = video.index;
            snapshot.video_codec = video.codec_name;
            snapshot.video_bitrate = video.bitrate;
            snapshot.video_rotation = video.display_rotation;
            snapshot.natural_video_width = video.frame_width;
            snapshot.natural_video_height = video.frame_height;
            snapshot.video_frame_rate = video.frame_rate;
            snapshot.video_frame_duration = if video.frame_rate > 0.0 {
                1.0 / video.frame_rate
            } else {
                0.0
            };
            snapshot.has_closed_captions = video.has_closed_captions;
        }

        if let Some(audio) = container.stream(MediaType::Audio) {
            snapshot.has_audio = true;
            snapshot.audio_stream_index = audio.index;
            snapshot.audio_codec = audio.codec_name;
            snapshot.audio_bitrate = audio.bitrate;
            snapshot.audio_channels = audio.channels;
            snapshot.audio_sample_rate = audio.sample_rate;
            snapshot.audio_bits_per_sample = audio.bits_per_sample;
        }

        if let Some(subtitle) = container.stream(MediaType::Subtitle) {
            snapshot.has_subtitles = true;
            snapshot.subtitle_stream_index = subtitle.index;
        }

        snapshot
    }

    /// Derive the phase-dependent flags
    ///
    /// - `is_open = phase != Opening AND container open`
    /// - `can_pause = is_open AND NOT live`
    pub fn for_phase(mut self, phase: PlaybackPhase) -> Self {
        self.is_open = self.is_open && phase != PlaybackPhase::Opening;
        self.can_pause = self.is_open && !self.is_live_stream;
        self
    }
}

macro_rules! snapshot_getters {
    ($($(#[$doc:meta])* $name:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> $ty {
                self.inner.lock().snapshot.$name.clone()
            }
        )*
    };
}

impl StateEngine {
    /// Re-read the fixed container properties
    ///
    /// Called whenever the container is attached or detached. Never fails
    /// and never notifies.
    pub fn refresh_snapshot(&self) {
        let container = self.host.container();
        let preloaded = self.host.preloaded_subtitle_count();
        let captured = ContainerSnapshot::capture(container.as_deref(), preloaded);

        let (is_open, format) = {
            let mut inner = self.inner.lock();
            let snapshot = captured.for_phase(inner.session.phase);
            let summary = (snapshot.is_open, snapshot.media_format.clone());
            inner.snapshot = snapshot;
            summary
        };

        debug!(
            "Container snapshot refreshed: open={}, format={:?}",
            is_open, format
        );
    }

    /// Copy of the whole container snapshot
    pub fn snapshot(&self) -> ContainerSnapshot {
        self.inner.lock().snapshot.clone()
    }

    snapshot_getters! {
        is_open: bool;
        metadata: BTreeMap<String, String>;
        media_format: Option<String>;
        video_stream_index: i32;
        audio_stream_index: i32;
        subtitle_stream_index: i32;
        has_audio: bool;
        has_video: bool;
        has_subtitles: bool;
        video_codec: Option<String>;
        video_bitrate: u64;
        video_rotation: f64;
        natural_video_width: u32;
        natural_video_height: u32;
        video_frame_rate: f64;
        /// Seconds per video frame (0 when unknown)
        video_frame_duration: f64;
        audio_codec: Option<String>;
        audio_bitrate: u64;
        audio_channels: u32;
        audio_sample_rate: u32;
        audio_bits_per_sample: u32;
        natural_duration_ticks: Option<i64>;
        is_live_stream: bool;
        is_network_stream: bool;
        is_seekable: bool;
        /// Media is open and not a live stream
        can_pause: bool;
        /// Video stream carries closed captions
        has_closed_captions: bool;
    }
}
