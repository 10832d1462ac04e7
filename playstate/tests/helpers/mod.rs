//! Test helper modules for playstate integration tests
//!
//! Provides reusable test infrastructure components:
//! - RecordingNotifier: capture every notification in order
//! - Media builders: containers, streams and block timelines for StaticHost

#![allow(dead_code)]

pub mod fake_media;
pub mod recording_notifier;

pub use fake_media::{
    audio_stream, blocks_every, media, open_session, video_stream, EngineFixture, MediaBuilder,
};
pub use recording_notifier::{Recorded, RecordingNotifier};
