//! # Playback State Engine (playstate)
//!
//! Thread-safe aggregator of a media session's observable state.
//!
//! **Purpose:** Track the playback phase, timeline position (discretized
//! against decoded block boundaries), buffering thresholds and progress,
//! and fixed container properties; report transitions exactly once through
//! an injected [`StateNotifier`].
//!
//! **Architecture:** One `parking_lot` mutex guards all state. Collaborators
//! ([`MediaHost`], [`MediaContainer`], [`BlockTimeline`]) are queried with
//! the lock released, and notifications fire after it is released.

pub mod engine;
pub mod error;
pub mod host;
pub mod notifier;
pub mod scenario;

pub use engine::{ContainerSnapshot, SessionState, StateEngine, StateView};
pub use error::{Error, Result};
pub use host::{BlockTimeline, MediaContainer, MediaHost};
pub use notifier::{EventBusNotifier, FnNotifier, NullNotifier, StateNotifier};
