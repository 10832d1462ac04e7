//! Position tracker
//!
//! Maps the raw clock position onto decoded block boundaries of the main
//! component: the start of the block being shown, and the starts of the
//! blocks before and after it. Frame stepping and seek-to-next/previous
//! use these discrete positions.

use super::StateEngine;
use crate::host::BlockNeighbors;
use playstate_common::timing::{ms_to_ticks, seconds_to_ticks};
use tracing::trace;

/// Discrete positions around a raw position (ticks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscretePosition {
    pub current_ticks: i64,
    pub next_ticks: i64,
    pub previous_ticks: i64,
}

impl DiscretePosition {
    /// Resolve discrete positions from a block lookup
    ///
    /// With a containing block, missing neighbours are estimated half a
    /// block beyond its edges. Without one, the raw position is current and
    /// missing neighbours are one frame step away, shifted by one tick.
    /// Estimates saturate at the `i64` bounds.
    pub fn resolve(position_ticks: i64, neighbors: &BlockNeighbors, frame_step_ticks: i64) -> Self {
        match neighbors.current {
            Some(current) => {
                let half = current.duration_ticks / 2;
                Self {
                    current_ticks: current.start_ticks,
                    next_ticks: neighbors
                        .next
                        .map(|b| b.start_ticks)
                        .unwrap_or(current.end_ticks.saturating_add(half)),
                    previous_ticks: neighbors
                        .previous
                        .map(|b| b.start_ticks)
                        .unwrap_or(current.start_ticks.saturating_sub(half)),
                }
            }
            None => Self {
                current_ticks: position_ticks,
                next_ticks: neighbors
                    .next
                    .map(|b| b.start_ticks)
                    .unwrap_or(position_ticks.saturating_add(frame_step_ticks).saturating_add(1)),
                previous_ticks: neighbors
                    .previous
                    .map(|b| b.start_ticks)
                    .unwrap_or(position_ticks.saturating_sub(frame_step_ticks).saturating_add(1)),
            },
        }
    }
}

impl StateEngine {
    /// Duration of one frame step (ticks)
    ///
    /// The video frame duration when the frame rate is known, otherwise the
    /// configured generic step (10 ms by default).
    pub fn frame_step_duration_ticks(&self) -> i64 {
        let frame_duration = self.inner.lock().snapshot.video_frame_duration;
        self.frame_step_for(frame_duration)
    }

    pub(super) fn frame_step_for(&self, video_frame_duration: f64) -> i64 {
        if video_frame_duration > 0.0 {
            seconds_to_ticks(video_frame_duration)
        } else {
            ms_to_ticks(self.config.position.generic_frame_step_ms)
        }
    }

    /// Move the timeline position
    ///
    /// No-op when `position_ticks` equals the stored position. Otherwise the
    /// position is stored, discretized against the main component's block
    /// timeline, and position-changed fires with (old, new).
    pub fn update_position(&self, position_ticks: i64) {
        let (old_position, main_media_type, frame_duration) = {
            let mut inner = self.inner.lock();
            let old = inner.session.position_ticks;
            if old == position_ticks {
                return;
            }
            inner.session.position_ticks = position_ticks;
            (
                old,
                inner.snapshot.main_media_type,
                inner.snapshot.video_frame_duration,
            )
        };

        let frame_step_ticks = self.frame_step_for(frame_duration);

        let neighbors = main_media_type
            .and_then(|t| self.host.block_timeline(t))
            .map(|timeline| timeline.neighbors(position_ticks))
            .unwrap_or_default();
        let discrete = DiscretePosition::resolve(position_ticks, &neighbors, frame_step_ticks);

        {
            let mut inner = self.inner.lock();
            // A newer update owns the discrete fields
            if inner.session.position_ticks == position_ticks {
                inner.session.position_current_ticks = discrete.current_ticks;
                inner.session.position_next_ticks = discrete.next_ticks;
                inner.session.position_previous_ticks = discrete.previous_ticks;
            }
        }

        trace!(
            "Position {} -> {} (current={}, next={}, previous={})",
            old_position,
            position_ticks,
            discrete.current_ticks,
            discrete.next_ticks,
            discrete.previous_ticks
        );
        self.notifier.position_changed(old_position, position_ticks);
    }
}
