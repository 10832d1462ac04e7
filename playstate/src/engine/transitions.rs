//! Phase, end-of-media and session reset
//!
//! Redundant writes are absorbed here; only genuine transitions reach the
//! notifier, each exactly once.

use super::{SessionState, StateEngine};
use playstate_common::events::PlaybackPhase;
use tracing::{debug, info};

impl StateEngine {
    /// Change the playback phase, optionally moving the position first
    ///
    /// Fires phase-changed (old, new) only if the phase differs.
    pub fn set_phase(&self, phase: PlaybackPhase, position_ticks: Option<i64>) {
        if let Some(position_ticks) = position_ticks {
            self.update_position(position_ticks);
        }

        let old_phase = {
            let mut inner = self.inner.lock();
            let old = inner.session.phase;
            if old == phase {
                return;
            }
            inner.session.phase = phase;
            old
        };

        info!("Playback phase: {} -> {}", old_phase, phase);
        self.notifier.phase_changed(old_phase, phase);
    }

    /// Record whether the media has ended
    ///
    /// Only false → true has side effects: buffering is forced off, then
    /// the flag is published and media-ended fires once. Every other
    /// transition just stores the value. A false write that lands while
    /// the end is being published cancels it.
    pub fn set_media_ended(&self, has_ended: bool) {
        let claimed = {
            let mut inner = self.inner.lock();
            if !has_ended {
                inner.session.has_media_ended = false;
                inner.media_end_pending = false;
                false
            } else if inner.session.has_media_ended || inner.media_end_pending {
                false
            } else {
                inner.media_end_pending = true;
                true
            }
        };
        if !claimed {
            return;
        }

        self.signal_buffering_ended();

        let published = {
            let mut inner = self.inner.lock();
            let pending = inner.media_end_pending;
            if pending {
                inner.media_end_pending = false;
                inner.session.has_media_ended = true;
            }
            pending
        };

        if published {
            info!("Media ended");
            self.notifier.media_ended();
        } else {
            debug!("Media end cancelled before it was published");
        }
    }

    /// Restore every session field to its initial value
    ///
    /// Also resets the volatile controller properties that belong to a
    /// session (speed ratio, timecode, hardware decoder name). Fires a
    /// single phase-changed (old, Closed) if the phase was not Closed.
    pub fn reset_session(&self) {
        let old_phase = {
            let mut inner = self.inner.lock();
            let old = inner.session.phase;
            inner.session = SessionState::default();
            inner.media_end_pending = false;
            inner.controller.reset_session_properties();
            old
        };

        let new_phase = PlaybackPhase::Closed;
        if old_phase != new_phase {
            info!("Session reset: {} -> {}", old_phase, new_phase);
            self.notifier.phase_changed(old_phase, new_phase);
        }
    }

    /// Media is open and its clock is running
    ///
    /// Without a clock the phase decides.
    pub fn is_playing(&self) -> bool {
        let clock_running = self.host.is_clock_running();
        let inner = self.inner.lock();
        inner.snapshot.is_open
            && clock_running.unwrap_or(inner.session.phase == PlaybackPhase::Playing)
    }

    /// Media is open and its clock is stopped
    ///
    /// Without a clock the phase decides.
    pub fn is_paused(&self) -> bool {
        let clock_running = self.host.is_clock_running();
        let inner = self.inner.lock();
        inner.snapshot.is_open
            && match clock_running {
                Some(running) => !running,
                None => inner.session.phase == PlaybackPhase::Paused,
            }
    }

    pub fn is_seeking(&self) -> bool {
        self.host.commands().is_seeking
    }

    pub fn is_closing(&self) -> bool {
        self.host.commands().is_closing
    }

    pub fn is_opening(&self) -> bool {
        self.host.commands().is_opening
    }

    pub fn is_changing(&self) -> bool {
        self.host.commands().is_changing
    }
}
