//! # playstate common library
//!
//! Shared code for the playback-state engine and its drivers:
//! - Tick-based timing conversions
//! - Event types (StateEvent enum) and the EventBus
//! - Playback phase and media type definitions
//! - Engine configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod events;
pub mod timing;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use events::{EventBus, MediaType, PlaybackPhase, StateEvent};
