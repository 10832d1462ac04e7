//! Playback-state and adaptive-buffering engine
//!
//! **Responsibilities** (one `impl StateEngine` block per file):
//! - `mod.rs`: state store, construction, session field accessors
//! - `snapshot.rs`: container property snapshot
//! - `buffering.rs`: cache thresholds, progress, buffering edges
//! - `position.rs`: position discretization against decoded blocks
//! - `transitions.rs`: phase, end-of-media and session reset
//! - `controller.rs`: volatile controller properties
//! - `diagnostics.rs`: explicit property table and JSON dump
//!
//! # Locking
//!
//! All mutable fields live in one `EngineInner` behind a single
//! `parking_lot::Mutex`. Every method holds it only long enough to copy or
//! assign values. Collaborator calls (host, container, block timelines)
//! and notifications always happen with the lock released; notifications
//! use values captured while it was held.

mod buffering;
mod controller;
mod diagnostics;
mod position;
mod snapshot;
mod transitions;

pub use controller::ControllerState;
pub use diagnostics::{PropertyValue, StateView};
pub use position::DiscretePosition;
pub use snapshot::ContainerSnapshot;

use crate::host::{DetachedHost, MediaHost};
use crate::notifier::{NullNotifier, StateNotifier};
use parking_lot::Mutex;
use playstate_common::config::EngineConfig;
use playstate_common::events::PlaybackPhase;
use serde::Serialize;
use std::sync::Arc;

/// Live state of the open media session
///
/// Returned by value from [`StateEngine::session`]; later mutations are
/// never visible through a returned copy.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionState {
    pub phase: PlaybackPhase,

    /// Raw timeline position (ticks)
    pub position_ticks: i64,

    /// Start of the block containing `position_ticks`
    pub position_current_ticks: i64,

    /// Start of the following block (or its estimate)
    pub position_next_ticks: i64,

    /// Start of the preceding block (or its estimate)
    pub position_previous_ticks: i64,

    pub has_media_ended: bool,

    pub is_buffering: bool,

    /// Queued bytes relative to `buffer_cache_length` (0.0-1.0)
    pub buffering_progress: f64,

    /// Queued bytes relative to `download_cache_length` (0.0-1.0)
    pub download_progress: f64,

    /// Bytes that must be queued before playback proceeds
    pub buffer_cache_length: u64,

    /// Bytes the demuxer may queue ahead (`buffer_cache_length × factor`)
    pub download_cache_length: u64,

    /// Byte rate estimate; once set it is kept until the next initialize/reset
    pub guessed_byte_rate: Option<u64>,
}

struct EngineInner {
    session: SessionState,
    snapshot: ContainerSnapshot,
    controller: ControllerState,
    /// End of media claimed but not yet published
    media_end_pending: bool,
}

/// Thread-safe aggregator of media session state
///
/// Shared between producer threads (decoder, clock, control) and polling
/// readers via `Arc<StateEngine>`. No method blocks beyond a field copy and
/// no method fails.
pub struct StateEngine {
    host: Arc<dyn MediaHost>,
    notifier: Arc<dyn StateNotifier>,
    config: EngineConfig,
    inner: Mutex<EngineInner>,
}

impl StateEngine {
    /// Create an engine bound to its collaborators
    ///
    /// Starts Closed, then takes an initial snapshot and initializes the
    /// buffering thresholds (neither fires notifications).
    pub fn new(
        host: Arc<dyn MediaHost>,
        notifier: Arc<dyn StateNotifier>,
        config: EngineConfig,
    ) -> Self {
        let controller = ControllerState::new(&config.controller);
        let engine = Self {
            host,
            notifier,
            config,
            inner: Mutex::new(EngineInner {
                session: SessionState::default(),
                snapshot: ContainerSnapshot::default(),
                controller,
                media_end_pending: false,
            }),
        };
        engine.refresh_snapshot();
        engine.initialize_buffering();
        engine
    }

    /// Engine with no collaborators attached and notifications dropped
    pub fn detached() -> Self {
        Self::new(
            Arc::new(DetachedHost),
            Arc::new(NullNotifier),
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consistent copy of every session field, taken under one lock
    pub fn session(&self) -> SessionState {
        self.inner.lock().session.clone()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.inner.lock().session.phase
    }

    pub fn position_ticks(&self) -> i64 {
        self.inner.lock().session.position_ticks
    }

    pub fn position_current_ticks(&self) -> i64 {
        self.inner.lock().session.position_current_ticks
    }

    pub fn position_next_ticks(&self) -> i64 {
        self.inner.lock().session.position_next_ticks
    }

    pub fn position_previous_ticks(&self) -> i64 {
        self.inner.lock().session.position_previous_ticks
    }

    pub fn has_media_ended(&self) -> bool {
        self.inner.lock().session.has_media_ended
    }

    pub fn is_buffering(&self) -> bool {
        self.inner.lock().session.is_buffering
    }

    pub fn buffering_progress(&self) -> f64 {
        self.inner.lock().session.buffering_progress
    }

    pub fn download_progress(&self) -> f64 {
        self.inner.lock().session.download_progress
    }

    pub fn buffer_cache_length(&self) -> u64 {
        self.inner.lock().session.buffer_cache_length
    }

    pub fn download_cache_length(&self) -> u64 {
        self.inner.lock().session.download_cache_length
    }

    pub fn guessed_byte_rate(&self) -> Option<u64> {
        self.inner.lock().session.guessed_byte_rate
    }

    /// Download cache multiplier for the current snapshot
    ///
    /// Never below 1, so `download_cache_length >= buffer_cache_length`
    /// holds even with an unvalidated config.
    fn cache_factor(&self, snapshot: &ContainerSnapshot) -> u64 {
        let buffering = &self.config.buffering;
        let factor = if snapshot.is_network_stream || snapshot.is_live_stream {
            buffering.network_cache_factor
        } else {
            buffering.standard_cache_factor
        };
        factor.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_engine_defaults() {
        let engine = StateEngine::detached();
        let session = engine.session();

        assert_eq!(session.phase, PlaybackPhase::Closed);
        assert_eq!(session.position_ticks, 0);
        assert!(!session.has_media_ended);
        assert!(!session.is_buffering);
        // No container: every buffering field stays zeroed
        assert_eq!(session.buffer_cache_length, 0);
        assert_eq!(session.download_cache_length, 0);
        assert_eq!(session.guessed_byte_rate, None);
        assert!(!engine.snapshot().is_open);
    }

    #[test]
    fn test_session_copy_is_detached_from_engine() {
        let engine = StateEngine::detached();
        let before = engine.session();

        engine.update_position(1_000);

        assert_eq!(before.position_ticks, 0);
        assert_eq!(engine.position_ticks(), 1_000);
    }

    #[test]
    fn test_cache_factor_never_below_one() {
        let mut config = EngineConfig::default();
        config.buffering.standard_cache_factor = 0;
        let engine = StateEngine::new(Arc::new(DetachedHost), Arc::new(NullNotifier), config);

        assert_eq!(engine.cache_factor(&ContainerSnapshot::default()), 1);
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StateEngine>();
    }
}
