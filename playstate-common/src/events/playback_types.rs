//! Playback-related type definitions
//!
//! Supporting types for the session lifecycle and media components.

use serde::{Deserialize, Serialize};

/// Coarse playback lifecycle phase of a media session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// No media open (initial phase and the phase after every reset)
    #[default]
    Closed,
    /// Open command in progress
    Opening,
    /// Media clock running
    Playing,
    /// Media clock paused
    Paused,
    /// Media clock stopped and rewound
    Stopped,
    /// Close command in progress
    Closing,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Closed => write!(f, "closed"),
            PlaybackPhase::Opening => write!(f, "opening"),
            PlaybackPhase::Playing => write!(f, "playing"),
            PlaybackPhase::Paused => write!(f, "paused"),
            PlaybackPhase::Stopped => write!(f, "stopped"),
            PlaybackPhase::Closing => write!(f, "closing"),
        }
    }
}

/// Media component (elementary stream) kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
    Subtitle,
}

impl MediaType {
    /// Components that carry decoded audio/video blocks with a bitrate
    pub const PLAYABLE: [MediaType; 2] = [MediaType::Audio, MediaType::Video];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Audio => write!(f, "audio"),
            MediaType::Video => write!(f, "video"),
            MediaType::Subtitle => write!(f, "subtitle"),
        }
    }
}
