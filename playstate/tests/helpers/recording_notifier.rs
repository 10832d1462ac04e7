//! Notifier that records every call

use parking_lot::Mutex;
use playstate::StateNotifier;
use playstate_common::events::PlaybackPhase;

/// One recorded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Phase(PlaybackPhase, PlaybackPhase),
    Position(i64, i64),
    BufferingStarted,
    BufferingEnded,
    MediaEnded,
}

#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().clone()
    }

    pub fn count(&self, kind: Recorded) -> usize {
        self.calls.lock().iter().filter(|c| **c == kind).count()
    }

    pub fn count_matching(&self, predicate: impl Fn(&Recorded) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().push(call);
    }
}

impl StateNotifier for RecordingNotifier {
    fn phase_changed(&self, old_phase: PlaybackPhase, new_phase: PlaybackPhase) {
        self.record(Recorded::Phase(old_phase, new_phase));
    }

    fn position_changed(&self, old_position_ticks: i64, new_position_ticks: i64) {
        self.record(Recorded::Position(old_position_ticks, new_position_ticks));
    }

    fn buffering_started(&self) {
        self.record(Recorded::BufferingStarted);
    }

    fn buffering_ended(&self) {
        self.record(Recorded::BufferingEnded);
    }

    fn media_ended(&self) {
        self.record(Recorded::MediaEnded);
    }
}
