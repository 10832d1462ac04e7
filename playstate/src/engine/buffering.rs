//! Buffering estimator
//!
//! Derives the buffer/download cache thresholds from container metadata at
//! open, refines them once from observed throughput, and turns queued-byte
//! samples into normalized progress with edge-triggered buffering signals.
//!
//! Thresholds are byte counts:
//! - `buffer_cache_length`: roughly one second of media
//! - `download_cache_length`: `buffer_cache_length × cache factor`
//!   (30 for network/live streams, 4 otherwise)

use super::{ContainerSnapshot, SessionState, StateEngine};
use playstate_common::config::BufferingConfig;
use playstate_common::events::MediaType;
use playstate_common::timing::{ms_to_ticks, ticks_to_ms, ticks_to_seconds};
use tracing::{debug, info, trace};

/// `min(1, round(numerator / denominator, 3))`, 0 for an empty denominator
pub(crate) fn progress_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let ratio = numerator as f64 / denominator as f64;
    ((ratio * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}

/// Initial buffer cache length from container metadata
///
/// Returns `(buffer_cache_length, guessed_byte_rate)`. The guess is only
/// known when the metadata yields a plausible bitrate.
pub(crate) fn initial_cache_length(
    snapshot: &ContainerSnapshot,
    container_bitrate: u64,
    config: &BufferingConfig,
) -> (u64, Option<u64>) {
    let mut all_components_have_bitrate = true;
    if snapshot.has_audio && snapshot.audio_bitrate == 0 {
        all_components_have_bitrate = false;
    }
    if snapshot.has_video && snapshot.video_bitrate == 0 {
        all_components_have_bitrate = false;
    }
    if !snapshot.has_audio && !snapshot.has_video {
        all_components_have_bitrate = false;
    }

    let component_bitrate = if all_components_have_bitrate {
        snapshot.audio_bitrate.saturating_add(snapshot.video_bitrate)
    } else {
        0
    };

    // Container metadata is often wrong (e.g. WMV), hence the safety factor
    let media_bitrate =
        config.bitrate_safety_factor * container_bitrate.max(component_bitrate) as f64;

    if media_bitrate > config.minimum_valid_bitrate as f64 {
        let cache_length = (media_bitrate / 8.0).round() as u64;
        (cache_length, Some(cache_length))
    } else {
        (config.starting_cache_length, None)
    }
}

impl StateEngine {
    /// Reset buffering thresholds and progress for a newly attached container
    ///
    /// Clears any previous byte-rate guess. With no container attached all
    /// buffering fields are zeroed.
    pub fn initialize_buffering(&self) {
        let container_bitrate = self.host.container().map(|c| c.media_bitrate());

        let outcome = {
            let mut inner = self.inner.lock();
            let inner = &mut *inner;
            let session = &mut inner.session;
            session.guessed_byte_rate = None;
            session.is_buffering = false;
            session.buffering_progress = 0.0;
            session.download_progress = 0.0;

            match container_bitrate {
                None => {
                    session.buffer_cache_length = 0;
                    session.download_cache_length = 0;
                    None
                }
                Some(container_bitrate) => {
                    let (cache_length, guess) = initial_cache_length(
                        &inner.snapshot,
                        container_bitrate,
                        &self.config.buffering,
                    );
                    let factor = self.cache_factor(&inner.snapshot);
                    session.buffer_cache_length = cache_length;
                    session.download_cache_length = cache_length.saturating_mul(factor);
                    session.guessed_byte_rate = guess;
                    Some((cache_length, session.download_cache_length, guess))
                }
            }
        };

        match outcome {
            Some((buffer, download, guess)) => debug!(
                "Buffering initialized: buffer_cache={}B, download_cache={}B, byte_rate_known={}",
                buffer,
                download,
                guess.is_some()
            ),
            None => debug!("Buffering initialized without container"),
        }
    }

    /// Feed a queued-bytes sample
    ///
    /// Recomputes buffering/download progress and the buffering flag.
    /// Fires buffering-ended on a true → false edge; the false → true edge
    /// is only signaled by [`StateEngine::signal_buffering_started`].
    pub fn update_progress(&self, queued_bytes: u64) {
        let can_read_more = self.host.can_read_more_packets();

        let (ended, buffering_progress) = {
            let mut inner = self.inner.lock();
            let session = &mut inner.session;
            let was_buffering = session.is_buffering;

            session.buffering_progress =
                progress_ratio(queued_bytes, session.buffer_cache_length);
            session.download_progress =
                progress_ratio(queued_bytes, session.download_cache_length);
            session.is_buffering = queued_bytes < session.buffer_cache_length && can_read_more;

            (
                was_buffering && !session.is_buffering,
                session.buffering_progress,
            )
        };

        trace!(
            "Progress sample: queued={}B, buffering_progress={:.3}",
            queued_bytes,
            buffering_progress
        );

        if ended {
            info!("Buffering ended (queued {}B)", queued_bytes);
            self.notifier.buffering_ended();
        }
    }

    /// Mark the start of a stall; notifies once per false → true edge
    pub fn signal_buffering_started(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.session.is_buffering {
                return;
            }
            inner.session.is_buffering = true;
        }

        info!("Buffering started");
        self.notifier.buffering_started();
    }

    /// Mark the end of a stall; notifies once per true → false edge
    pub fn signal_buffering_ended(&self) {
        {
            let mut inner = self.inner.lock();
            if !inner.session.is_buffering {
                return;
            }
            inner.session.is_buffering = false;
        }

        info!("Buffering ended");
        self.notifier.buffering_ended();
    }

    /// Refine the thresholds from observed throughput, once per session
    ///
    /// Skipped when a byte rate is already known, when no audio/video
    /// component exists, or when any of them has decoded less than the
    /// configured minimum duration. Otherwise the rate becomes
    /// `guess_safety_factor × bytes / shortest_decoded_seconds` and both
    /// thresholds are recomputed from it.
    pub fn guess_byte_rate(&self, lifetime_bytes_read: u64) {
        let components: Vec<MediaType> = {
            let inner = self.inner.lock();
            if inner.session.guessed_byte_rate.is_some() {
                return;
            }
            MediaType::PLAYABLE
                .into_iter()
                .filter(|t| match t {
                    MediaType::Audio => inner.snapshot.has_audio,
                    MediaType::Video => inner.snapshot.has_video,
                    MediaType::Subtitle => false,
                })
                .collect()
        };
        if components.is_empty() {
            return;
        }

        let minimum = ms_to_ticks(self.config.buffering.minimum_guess_duration_ms);
        let mut shortest = i64::MAX;
        for media_type in components {
            let duration = self
                .host
                .block_timeline(media_type)
                .map(|t| t.lifetime_duration_ticks())
                .unwrap_or(0);
            if duration < minimum {
                trace!(
                    "Byte rate guess deferred: {} has {}ms decoded",
                    media_type,
                    ticks_to_ms(duration)
                );
                return;
            }
            shortest = shortest.min(duration);
        }

        let byte_rate = (self.config.buffering.guess_safety_factor * lifetime_bytes_read as f64
            / ticks_to_seconds(shortest)) as u64;

        let applied = {
            let mut inner = self.inner.lock();
            let inner = &mut *inner;
            if inner.session.guessed_byte_rate.is_some() {
                None
            } else {
                let factor = self.cache_factor(&inner.snapshot);
                apply_byte_rate(&mut inner.session, byte_rate, factor);
                Some(inner.session.download_cache_length)
            }
        };

        if let Some(download) = applied {
            debug!(
                "Byte rate guessed: {}B/s from {}B over {:.2}s (download_cache={}B)",
                byte_rate,
                lifetime_bytes_read,
                ticks_to_seconds(shortest),
                download
            );
        }
    }
}

fn apply_byte_rate(session: &mut SessionState, byte_rate: u64, factor: u64) {
    session.guessed_byte_rate = Some(byte_rate);
    session.buffer_cache_length = byte_rate;
    session.download_cache_length = byte_rate.saturating_mul(factor);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(audio: Option<u64>, video: Option<u64>) -> ContainerSnapshot {
        ContainerSnapshot {
            has_audio: audio.is_some(),
            audio_bitrate: audio.unwrap_or(0),
            has_video: video.is_some(),
            video_bitrate: video.unwrap_or(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_progress_ratio_zero_denominator() {
        assert_eq!(progress_ratio(1000, 0), 0.0);
        assert_eq!(progress_ratio(0, 0), 0.0);
    }

    #[test]
    fn test_progress_ratio_rounds_to_three_places() {
        assert_eq!(progress_ratio(1, 3), 0.333);
        assert_eq!(progress_ratio(2, 3), 0.667);
    }

    #[test]
    fn test_progress_ratio_clamped() {
        assert_eq!(progress_ratio(5000, 1000), 1.0);
        assert_eq!(progress_ratio(1000, 1000), 1.0);
        assert_eq!(progress_ratio(0, 1000), 0.0);
    }

    #[test]
    fn test_initial_cache_length_from_components() {
        let config = BufferingConfig::default();
        let (length, guess) =
            initial_cache_length(&snapshot(Some(64_000), Some(600_000)), 0, &config);
        assert_eq!(length, 166_000);
        assert_eq!(guess, Some(166_000));
    }

    #[test]
    fn test_initial_cache_length_container_bitrate_wins_when_larger() {
        let config = BufferingConfig::default();
        let (length, _) =
            initial_cache_length(&snapshot(Some(64_000), Some(600_000)), 1_000_000, &config);
        assert_eq!(length, 250_000);
    }

    #[test]
    fn test_missing_component_bitrate_ignores_component_sum() {
        let config = BufferingConfig::default();
        // Video present without bitrate: component sum is not trusted
        let (length, guess) = initial_cache_length(&snapshot(Some(64_000), Some(0)), 0, &config);
        assert_eq!(length, 524_288);
        assert_eq!(guess, None);

        // ...but a container bitrate still counts
        let (length, guess) =
            initial_cache_length(&snapshot(Some(64_000), Some(0)), 400_000, &config);
        assert_eq!(length, 100_000);
        assert_eq!(guess, Some(100_000));
    }

    #[test]
    fn test_implausible_bitrate_falls_back() {
        let config = BufferingConfig::default();
        // 2 × 48000 = 96000 is not above the minimum
        let (length, guess) = initial_cache_length(&snapshot(Some(48_000), None), 0, &config);
        assert_eq!(length, 524_288);
        assert_eq!(guess, None);
    }

    #[test]
    fn test_no_components_falls_back() {
        let config = BufferingConfig::default();
        let (length, guess) = initial_cache_length(&snapshot(None, None), 0, &config);
        assert_eq!(length, 524_288);
        assert_eq!(guess, None);
    }

    #[test]
    fn test_apply_byte_rate() {
        let mut session = SessionState::default();
        apply_byte_rate(&mut session, 200_000, 4);
        assert_eq!(session.guessed_byte_rate, Some(200_000));
        assert_eq!(session.buffer_cache_length, 200_000);
        assert_eq!(session.download_cache_length, 800_000);
    }

    #[test]
    fn test_signal_edges_on_detached_engine() {
        let engine = StateEngine::detached();
        engine.signal_buffering_ended();
        assert!(!engine.is_buffering());

        engine.signal_buffering_started();
        engine.signal_buffering_started();
        assert!(engine.is_buffering());

        engine.signal_buffering_ended();
        assert!(!engine.is_buffering());
    }
}
