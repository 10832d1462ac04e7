//! Collaborator interfaces consumed by the engine
//!
//! The engine never owns the container, decoder or clock. It reads them
//! through these traits, which every implementation must answer without
//! blocking. Absent data is expressed as `None`/defaults, never as errors.

use playstate_common::events::MediaType;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fixed properties of one elementary stream in the container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamInfo {
    /// Stream index within the container
    pub index: i32,
    pub codec_name: Option<String>,
    /// Bits per second as reported by the container (0 = unknown)
    pub bitrate: u64,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Display rotation in degrees
    pub display_rotation: f64,
    /// Base frame rate in frames per second (0 = unknown)
    pub frame_rate: f64,
    pub channels: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    /// Video stream carries embedded closed captions
    pub has_closed_captions: bool,
}

/// Open media container (demuxer input)
pub trait MediaContainer: Send + Sync {
    /// Input has been opened successfully
    fn is_open(&self) -> bool;

    /// Container-level metadata (title, artist, ...)
    fn metadata(&self) -> BTreeMap<String, String>;

    /// Short format name (e.g. "mov,mp4,m4a")
    fn format_name(&self) -> Option<String>;

    /// Selected stream of the given kind, if any
    fn stream(&self, media_type: MediaType) -> Option<StreamInfo>;

    /// Container-level bitrate in bits per second (0 = unknown)
    fn media_bitrate(&self) -> u64;

    /// Natural duration in ticks; `None` for live or unknown
    fn duration_ticks(&self) -> Option<i64>;

    fn is_live_stream(&self) -> bool;

    fn is_network_stream(&self) -> bool;

    fn is_seekable(&self) -> bool;

    /// Total bytes read from the input since open
    fn lifetime_bytes_read(&self) -> u64;

    /// Component driving the presentation clock
    fn main_media_type(&self) -> Option<MediaType>;
}

/// Time span of one decoded block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start_ticks: i64,
    pub end_ticks: i64,
    pub duration_ticks: i64,
}

impl BlockSpan {
    /// Create a span from its boundaries; duration is derived (saturating)
    pub fn new(start_ticks: i64, end_ticks: i64) -> Self {
        Self {
            start_ticks,
            end_ticks,
            duration_ticks: end_ticks.saturating_sub(start_ticks),
        }
    }

    /// Position lies within `[start, end)`
    pub fn contains(&self, position_ticks: i64) -> bool {
        position_ticks >= self.start_ticks && position_ticks < self.end_ticks
    }
}

/// Result of a block lookup around a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockNeighbors {
    /// Block containing the position
    pub current: Option<BlockSpan>,
    /// Block immediately before the position (or before `current`)
    pub previous: Option<BlockSpan>,
    /// Block immediately after the position (or after `current`)
    pub next: Option<BlockSpan>,
}

/// Decoded block timeline of one component
pub trait BlockTimeline: Send + Sync {
    /// Find the block containing `position_ticks` and its immediate neighbours
    fn neighbors(&self, position_ticks: i64) -> BlockNeighbors;

    /// Accumulated duration of every block decoded since open (ticks)
    fn lifetime_duration_ticks(&self) -> i64;
}

/// In-progress command flags from the control layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandStatus {
    pub is_seeking: bool,
    pub is_closing: bool,
    pub is_opening: bool,
    pub is_changing: bool,
}

/// Everything the engine reads from its surroundings
///
/// The host hands out the currently attached container (if any), the block
/// timelines of the decode pipeline, and answers control/clock queries.
pub trait MediaHost: Send + Sync {
    /// Currently attached container; `None` before open and after close
    fn container(&self) -> Option<Arc<dyn MediaContainer>>;

    /// Decoded block timeline of a component; `None` if not decoding it
    fn block_timeline(&self, media_type: MediaType) -> Option<Arc<dyn BlockTimeline>>;

    fn commands(&self) -> CommandStatus {
        CommandStatus::default()
    }

    /// Demuxer may still read packets (input not exhausted)
    fn can_read_more_packets(&self) -> bool {
        false
    }

    /// Media clock state; `None` when no clock exists
    fn is_clock_running(&self) -> Option<bool> {
        None
    }

    /// Number of externally preloaded subtitle entries
    fn preloaded_subtitle_count(&self) -> usize {
        0
    }
}

/// Host with nothing attached
///
/// Used for engines created before any media pipeline exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl MediaHost for DetachedHost {
    fn container(&self) -> Option<Arc<dyn MediaContainer>> {
        None
    }

    fn block_timeline(&self, _media_type: MediaType) -> Option<Arc<dyn BlockTimeline>> {
        None
    }
}
