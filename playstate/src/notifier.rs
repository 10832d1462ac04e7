//! Notification sink
//!
//! The engine reports transitions through a `StateNotifier` injected at
//! construction. Calls always happen after the engine has released its
//! state lock, so implementations may call straight back into the engine.

use playstate_common::events::{EventBus, PlaybackPhase, StateEvent};
use uuid::Uuid;

/// Receiver of edge-triggered engine notifications
///
/// All methods default to no-ops so implementations only override what
/// they care about.
pub trait StateNotifier: Send + Sync {
    fn phase_changed(&self, _old_phase: PlaybackPhase, _new_phase: PlaybackPhase) {}

    fn position_changed(&self, _old_position_ticks: i64, _new_position_ticks: i64) {}

    fn buffering_started(&self) {}

    fn buffering_ended(&self) {}

    fn media_ended(&self) {}
}

/// Drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl StateNotifier for NullNotifier {}

fn to_event(session_id: Uuid, kind: Notification) -> StateEvent {
    let timestamp = chrono::Utc::now();
    match kind {
        Notification::Phase(old_phase, new_phase) => StateEvent::PhaseChanged {
            session_id,
            old_phase,
            new_phase,
            timestamp,
        },
        Notification::Position(old_position_ticks, new_position_ticks) => {
            StateEvent::PositionChanged {
                session_id,
                old_position_ticks,
                new_position_ticks,
                timestamp,
            }
        }
        Notification::BufferingStarted => StateEvent::BufferingStarted {
            session_id,
            timestamp,
        },
        Notification::BufferingEnded => StateEvent::BufferingEnded {
            session_id,
            timestamp,
        },
        Notification::MediaEnded => StateEvent::MediaEnded {
            session_id,
            timestamp,
        },
    }
}

enum Notification {
    Phase(PlaybackPhase, PlaybackPhase),
    Position(i64, i64),
    BufferingStarted,
    BufferingEnded,
    MediaEnded,
}

/// Publishes notifications as `StateEvent`s on an `EventBus`
///
/// Emission is lossy: a bus without subscribers never affects the engine.
#[derive(Clone)]
pub struct EventBusNotifier {
    bus: EventBus,
    session_id: Uuid,
}

impl EventBusNotifier {
    /// Create a notifier with a fresh session id
    pub fn new(bus: EventBus) -> Self {
        Self::with_session_id(bus, Uuid::new_v4())
    }

    pub fn with_session_id(bus: EventBus, session_id: Uuid) -> Self {
        Self { bus, session_id }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn publish(&self, kind: Notification) {
        self.bus.emit_lossy(to_event(self.session_id, kind));
    }
}

impl StateNotifier for EventBusNotifier {
    fn phase_changed(&self, old_phase: PlaybackPhase, new_phase: PlaybackPhase) {
        self.publish(Notification::Phase(old_phase, new_phase));
    }

    fn position_changed(&self, old_position_ticks: i64, new_position_ticks: i64) {
        self.publish(Notification::Position(old_position_ticks, new_position_ticks));
    }

    fn buffering_started(&self) {
        self.publish(Notification::BufferingStarted);
    }

    fn buffering_ended(&self) {
        self.publish(Notification::BufferingEnded);
    }

    fn media_ended(&self) {
        self.publish(Notification::MediaEnded);
    }
}

/// Forwards notifications as `StateEvent`s to a closure
pub struct FnNotifier<F>
where
    F: Fn(StateEvent) + Send + Sync,
{
    session_id: Uuid,
    callback: F,
}

impl<F> FnNotifier<F>
where
    F: Fn(StateEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            callback,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn publish(&self, kind: Notification) {
        (self.callback)(to_event(self.session_id, kind));
    }
}

impl<F> StateNotifier for FnNotifier<F>
where
    F: Fn(StateEvent) + Send + Sync,
{
    fn phase_changed(&self, old_phase: PlaybackPhase, new_phase: PlaybackPhase) {
        self.publish(Notification::Phase(old_phase, new_phase));
    }

    fn position_changed(&self, old_position_ticks: i64, new_position_ticks: i64) {
        self.publish(Notification::Position(old_position_ticks, new_position_ticks));
    }

    fn buffering_started(&self) {
        self.publish(Notification::BufferingStarted);
    }

    fn buffering_ended(&self) {
        self.publish(Notification::BufferingEnded);
    }

    fn media_ended(&self) {
        self.publish(Notification::MediaEnded);
    }
}
