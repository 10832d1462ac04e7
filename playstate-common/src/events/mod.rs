//! Event types for the playstate event system
//!
//! Provides the notification events emitted by the engine and the EventBus
//! that distributes them.

mod playback_types;

pub use playback_types::{MediaType, PlaybackPhase};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Engine notification events
///
/// Every variant is edge-triggered: the engine emits it once per genuine
/// transition, never for calls that leave the state unchanged.
///
/// Events are broadcast via EventBus and can be serialized for transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateEvent {
    /// Playback phase changed
    PhaseChanged {
        /// Session that changed
        session_id: Uuid,
        /// Phase before change
        old_phase: PlaybackPhase,
        /// Phase after change
        new_phase: PlaybackPhase,
        /// When phase changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Timeline position changed
    PositionChanged {
        session_id: Uuid,
        /// Position before change (ticks)
        old_position_ticks: i64,
        /// Position after change (ticks)
        new_position_ticks: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback stalled waiting for packets
    BufferingStarted {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Enough packets queued to continue
    BufferingEnded {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// End of media reached
    MediaEnded {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StateEvent {
    /// Get event type as string (for logging and filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            StateEvent::PhaseChanged { .. } => "PhaseChanged",
            StateEvent::PositionChanged { .. } => "PositionChanged",
            StateEvent::BufferingStarted { .. } => "BufferingStarted",
            StateEvent::BufferingEnded { .. } => "BufferingEnded",
            StateEvent::MediaEnded { .. } => "MediaEnded",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            StateEvent::PhaseChanged { session_id, .. }
            | StateEvent::PositionChanged { session_id, .. }
            | StateEvent::BufferingStarted { session_id, .. }
            | StateEvent::BufferingEnded { session_id, .. }
            | StateEvent::MediaEnded { session_id, .. } => *session_id,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// Publishing never awaits, so it is safe to call from the engine's
/// producer threads outside any runtime.
///
/// # Examples
///
/// ```
/// use playstate_common::events::{EventBus, PlaybackPhase, StateEvent};
/// use uuid::Uuid;
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(StateEvent::PhaseChanged {
///     session_id: Uuid::new_v4(),
///     old_phase: PlaybackPhase::Opening,
///     new_phase: PlaybackPhase::Playing,
///     timestamp: chrono::Utc::now(),
/// }).ok();
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StateEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: StateEvent,
    ) -> Result<usize, broadcast::error::SendError<StateEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: StateEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
