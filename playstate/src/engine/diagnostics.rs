//! Diagnostics
//!
//! **Responsibilities:**
//! - Consistent point-in-time view of every public property ([`StateView`])
//! - Explicit name → accessor table used for enumeration
//! - JSON dump for the scenario driver and debug logging

use super::{ContainerSnapshot, ControllerState, SessionState, StateEngine};
use crate::host::CommandStatus;
use playstate_common::events::PlaybackPhase;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Value of a single enumerated property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Map(BTreeMap<String, String>),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::UInt(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::UInt(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<PlaybackPhase> for PropertyValue {
    fn from(value: PlaybackPhase) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<BTreeMap<String, String>> for PropertyValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        PropertyValue::Map(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Every public property at one instant
///
/// Session, snapshot and controller are copied under a single lock; the
/// host-derived flags are read just before it.
#[derive(Debug, Clone, PartialEq)]
pub struct StateView {
    pub session: SessionState,
    pub snapshot: ContainerSnapshot,
    pub controller: ControllerState,
    pub frame_step_ticks: i64,
    pub is_playing: bool,
    pub is_paused: bool,
    pub commands: CommandStatus,
}

type Accessor = fn(&StateView) -> PropertyValue;

macro_rules! property {
    ($name:literal, |$v:ident| $body:expr) => {
        ($name, {
            fn get($v: &StateView) -> PropertyValue {
                PropertyValue::from($body)
            }
            get as Accessor
        })
    };
}

/// Enumerable properties in display order
pub static PROPERTIES: &[(&str, Accessor)] = &[
    // Session
    property!("phase", |v| v.session.phase),
    property!("position", |v| v.session.position_ticks),
    property!("position_current", |v| v.session.position_current_ticks),
    property!("position_next", |v| v.session.position_next_ticks),
    property!("position_previous", |v| v.session.position_previous_ticks),
    property!("has_media_ended", |v| v.session.has_media_ended),
    property!("is_buffering", |v| v.session.is_buffering),
    property!("buffering_progress", |v| v.session.buffering_progress),
    property!("download_progress", |v| v.session.download_progress),
    property!("buffer_cache_length", |v| v.session.buffer_cache_length),
    property!("download_cache_length", |v| v.session.download_cache_length),
    property!("guessed_byte_rate", |v| v.session.guessed_byte_rate),
    property!("is_playing", |v| v.is_playing),
    property!("is_paused", |v| v.is_paused),
    property!("is_seeking", |v| v.commands.is_seeking),
    property!("is_closing", |v| v.commands.is_closing),
    property!("is_opening", |v| v.commands.is_opening),
    property!("is_changing", |v| v.commands.is_changing),
    property!("frame_step_duration", |v| v.frame_step_ticks),
    // Container
    property!("is_open", |v| v.snapshot.is_open),
    property!("media_format", |v| v.snapshot.media_format.clone()),
    property!("metadata", |v| v.snapshot.metadata.clone()),
    property!("natural_duration", |v| v.snapshot.natural_duration_ticks),
    property!("is_live_stream", |v| v.snapshot.is_live_stream),
    property!("is_network_stream", |v| v.snapshot.is_network_stream),
    property!("is_seekable", |v| v.snapshot.is_seekable),
    property!("can_pause", |v| v.snapshot.can_pause),
    property!("has_audio", |v| v.snapshot.has_audio),
    property!("has_video", |v| v.snapshot.has_video),
    property!("has_subtitles", |v| v.snapshot.has_subtitles),
    property!("has_closed_captions", |v| v.snapshot.has_closed_captions),
    property!("video_stream_index", |v| v.snapshot.video_stream_index),
    property!("audio_stream_index", |v| v.snapshot.audio_stream_index),
    property!("subtitle_stream_index", |v| v.snapshot.subtitle_stream_index),
    property!("video_codec", |v| v.snapshot.video_codec.clone()),
    property!("video_bitrate", |v| v.snapshot.video_bitrate),
    property!("video_rotation", |v| v.snapshot.video_rotation),
    property!("natural_video_width", |v| v.snapshot.natural_video_width),
    property!("natural_video_height", |v| v.snapshot.natural_video_height),
    property!("video_frame_rate", |v| v.snapshot.video_frame_rate),
    property!("video_frame_duration", |v| v.snapshot.video_frame_duration),
    property!("audio_codec", |v| v.snapshot.audio_codec.clone()),
    property!("audio_bitrate", |v| v.snapshot.audio_bitrate),
    property!("audio_channels", |v| v.snapshot.audio_channels),
    property!("audio_sample_rate", |v| v.snapshot.audio_sample_rate),
    property!("audio_bits_per_sample", |v| v.snapshot.audio_bits_per_sample),
    // Controller
    property!("source", |v| v.controller.source.clone()),
    property!("volume", |v| v.controller.volume),
    property!("balance", |v| v.controller.balance),
    property!("is_muted", |v| v.controller.is_muted),
    property!("speed_ratio", |v| v.controller.speed_ratio),
    property!("video_smpte_timecode", |v| v.controller.video_smpte_timecode.clone()),
    property!("video_hardware_decoder", |v| v.controller.video_hardware_decoder.clone()),
];

impl StateView {
    /// Look up a single property by name
    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        PROPERTIES
            .iter()
            .find(|(property, _)| *property == name)
            .map(|(_, accessor)| accessor(self))
    }
}

impl StateEngine {
    /// Capture every public property at once
    pub fn view(&self) -> StateView {
        let clock_running = self.host.is_clock_running();
        let commands = self.host.commands();

        let (session, snapshot, controller) = {
            let inner = self.inner.lock();
            (
                inner.session.clone(),
                inner.snapshot.clone(),
                inner.controller.clone(),
            )
        };

        let frame_step_ticks = self.frame_step_for(snapshot.video_frame_duration);
        let (is_playing, is_paused) = match clock_running {
            Some(running) => (snapshot.is_open && running, snapshot.is_open && !running),
            None => (
                snapshot.is_open && session.phase == PlaybackPhase::Playing,
                snapshot.is_open && session.phase == PlaybackPhase::Paused,
            ),
        };

        StateView {
            session,
            snapshot,
            controller,
            frame_step_ticks,
            is_playing,
            is_paused,
            commands,
        }
    }

    /// Enumerate `(name, value)` for every public property
    pub fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        let view = self.view();
        PROPERTIES
            .iter()
            .map(|(name, accessor)| (*name, accessor(&view)))
            .collect()
    }

    /// Render every public property as a JSON object
    pub fn dump_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .properties()
            .into_iter()
            .map(|(name, value)| {
                let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (name.to_string(), value)
            })
            .collect();
        debug!("Diagnostics dump: {} properties", map.len());
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_property_names_unique() {
        let names: HashSet<&str> = PROPERTIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), PROPERTIES.len());
    }

    #[test]
    fn test_properties_reflect_engine_state() {
        let engine = StateEngine::detached();
        engine.update_position(5_000);
        engine.set_volume(0.25);

        let view = engine.view();
        assert_eq!(view.get("position"), Some(PropertyValue::Int(5_000)));
        assert_eq!(view.get("volume"), Some(PropertyValue::Float(0.25)));
        assert_eq!(view.get("guessed_byte_rate"), Some(PropertyValue::Null));
        assert_eq!(view.get("phase"), Some(PropertyValue::Text("closed".to_string())));
        assert_eq!(view.get("no_such_property"), None);
    }

    #[test]
    fn test_dump_json_object() {
        let engine = StateEngine::detached();
        let json = engine.dump_json();

        let object = json.as_object().expect("object");
        assert_eq!(object.len(), PROPERTIES.len());
        assert_eq!(object["is_open"], serde_json::json!(false));
        assert_eq!(object["video_stream_index"], serde_json::json!(-1));
        assert_eq!(object["source"], serde_json::Value::Null);
        assert_eq!(object["frame_step_duration"], serde_json::json!(282_240));
    }
}
