//! Controller properties
//!
//! Values set by the media controller rather than read from the container.
//! They share the state lock with the session but are not part of the
//! container snapshot.

use super::StateEngine;
use playstate_common::config::ControllerConfig;
use serde::Serialize;
use tracing::debug;

/// Controller-owned properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerState {
    /// URI of the requested media
    pub source: Option<String>,

    /// Volume (0.0-1.0)
    pub volume: f64,

    /// Stereo balance (-1.0 left to 1.0 right)
    pub balance: f64,

    pub is_muted: bool,

    /// Playback speed multiplier
    pub speed_ratio: f64,

    /// SMPTE timecode of the frame being shown
    pub video_smpte_timecode: String,

    /// Name of the hardware decoder in use, empty for software decoding
    pub video_hardware_decoder: String,

    #[serde(skip)]
    min_speed_ratio: f64,

    #[serde(skip)]
    max_speed_ratio: f64,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig) -> Self {
        let mut state = Self {
            source: None,
            volume: clamp_finite(config.default_volume, 0.0, 1.0, 1.0),
            balance: 0.0,
            is_muted: false,
            speed_ratio: 1.0,
            video_smpte_timecode: String::new(),
            video_hardware_decoder: String::new(),
            min_speed_ratio: config.min_speed_ratio,
            max_speed_ratio: config.max_speed_ratio,
        };
        state.reset_session_properties();
        state
    }

    /// Reset the properties that belong to a single session
    ///
    /// Source, volume, balance and mute survive.
    pub fn reset_session_properties(&mut self) {
        self.speed_ratio = self.clamp_speed(1.0, 1.0);
        self.video_smpte_timecode.clear();
        self.video_hardware_decoder.clear();
    }

    fn clamp_speed(&self, value: f64, fallback: f64) -> f64 {
        clamp_finite(value, self.min_speed_ratio, self.max_speed_ratio, fallback)
    }
}

/// Clamp into `[min, max]`; non-finite input yields `fallback`
///
/// Never panics on an inverted range (`min` wins).
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        return fallback;
    }
    value.min(max).max(min)
}

impl StateEngine {
    /// Copy of all controller properties
    pub fn controller(&self) -> ControllerState {
        self.inner.lock().controller.clone()
    }

    pub fn source(&self) -> Option<String> {
        self.inner.lock().controller.source.clone()
    }

    pub fn set_source(&self, source: Option<String>) {
        debug!("Source: {:?}", source);
        self.inner.lock().controller.source = source;
    }

    pub fn volume(&self) -> f64 {
        self.inner.lock().controller.volume
    }

    /// Set volume (clamped to 0.0-1.0, non-finite values ignored)
    pub fn set_volume(&self, volume: f64) {
        let mut inner = self.inner.lock();
        let current = inner.controller.volume;
        inner.controller.volume = clamp_finite(volume, 0.0, 1.0, current);
    }

    pub fn balance(&self) -> f64 {
        self.inner.lock().controller.balance
    }

    /// Set balance (clamped to -1.0-1.0, non-finite values ignored)
    pub fn set_balance(&self, balance: f64) {
        let mut inner = self.inner.lock();
        let current = inner.controller.balance;
        inner.controller.balance = clamp_finite(balance, -1.0, 1.0, current);
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().controller.is_muted
    }

    pub fn set_muted(&self, is_muted: bool) {
        self.inner.lock().controller.is_muted = is_muted;
    }

    pub fn speed_ratio(&self) -> f64 {
        self.inner.lock().controller.speed_ratio
    }

    /// Set speed ratio (clamped to the configured range)
    pub fn set_speed_ratio(&self, speed_ratio: f64) {
        let mut inner = self.inner.lock();
        let current = inner.controller.speed_ratio;
        inner.controller.speed_ratio = inner.controller.clamp_speed(speed_ratio, current);
    }

    pub fn video_smpte_timecode(&self) -> String {
        self.inner.lock().controller.video_smpte_timecode.clone()
    }

    pub fn set_video_smpte_timecode(&self, timecode: impl Into<String>) {
        self.inner.lock().controller.video_smpte_timecode = timecode.into();
    }

    pub fn video_hardware_decoder(&self) -> String {
        self.inner.lock().controller.video_hardware_decoder.clone()
    }

    pub fn set_video_hardware_decoder(&self, decoder: impl Into<String>) {
        let decoder = decoder.into();
        debug!("Video hardware decoder: {:?}", decoder);
        self.inner.lock().controller.video_hardware_decoder = decoder;
    }
}
