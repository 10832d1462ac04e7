//! In-memory media host
//!
//! A container with fixed properties and fixed block timelines, attached
//! and detached on demand. Drives the engine from scenario files and tests.

use crate::host::{
    BlockNeighbors, BlockSpan, BlockTimeline, CommandStatus, MediaContainer, MediaHost,
    StreamInfo,
};
use parking_lot::Mutex;
use playstate_common::events::MediaType;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Container whose properties never change
#[derive(Debug, Clone, Default)]
pub struct StaticContainer {
    pub is_open: bool,
    pub metadata: BTreeMap<String, String>,
    pub format_name: Option<String>,
    pub streams: BTreeMap<MediaType, StreamInfo>,
    /// Container-level bitrate (bits/s), 0 when unknown
    pub media_bitrate: u64,
    pub duration_ticks: Option<i64>,
    pub is_live_stream: bool,
    pub is_network_stream: bool,
    pub is_seekable: bool,
    pub lifetime_bytes_read: u64,
    /// Overrides the default main component (video, else audio)
    pub main_media_type: Option<MediaType>,
}

impl MediaContainer for StaticContainer {
    fn is_open(&self) -> bool {
        self.is_open
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        self.metadata.clone()
    }

    fn format_name(&self) -> Option<String> {
        self.format_name.clone()
    }

    fn stream(&self, media_type: MediaType) -> Option<StreamInfo> {
        self.streams.get(&media_type).cloned()
    }

    fn media_bitrate(&self) -> u64 {
        self.media_bitrate
    }

    fn duration_ticks(&self) -> Option<i64> {
        self.duration_ticks
    }

    fn is_live_stream(&self) -> bool {
        self.is_live_stream
    }

    fn is_network_stream(&self) -> bool {
        self.is_network_stream
    }

    fn is_seekable(&self) -> bool {
        self.is_seekable
    }

    fn lifetime_bytes_read(&self) -> u64 {
        self.lifetime_bytes_read
    }

    fn main_media_type(&self) -> Option<MediaType> {
        self.main_media_type.or_else(|| {
            [MediaType::Video, MediaType::Audio]
                .into_iter()
                .find(|t| self.streams.contains_key(t))
        })
    }
}

/// Fixed list of decoded blocks for one component
///
/// Blocks are kept sorted by start time.
#[derive(Debug, Clone, Default)]
pub struct StaticTimeline {
    blocks: Vec<BlockSpan>,
    lifetime_duration_ticks: i64,
}

impl StaticTimeline {
    /// Create a timeline; lifetime duration is the sum of block durations
    pub fn new(mut blocks: Vec<BlockSpan>) -> Self {
        blocks.sort_by_key(|b| b.start_ticks);
        let lifetime_duration_ticks = blocks
            .iter()
            .fold(0i64, |total, b| total.saturating_add(b.duration_ticks));
        Self {
            blocks,
            lifetime_duration_ticks,
        }
    }

    /// Override the accumulated decoded duration
    pub fn with_lifetime_duration(mut self, ticks: i64) -> Self {
        self.lifetime_duration_ticks = ticks;
        self
    }

    pub fn blocks(&self) -> &[BlockSpan] {
        &self.blocks
    }
}

impl BlockTimeline for StaticTimeline {
    fn neighbors(&self, position_ticks: i64) -> BlockNeighbors {
        // Blocks starting at or before the position
        let after = self.blocks.partition_point(|b| b.start_ticks <= position_ticks);
        let candidate = after.checked_sub(1).map(|i| (i, self.blocks[i]));

        match candidate {
            Some((index, block)) if block.contains(position_ticks) => BlockNeighbors {
                current: Some(block),
                previous: index.checked_sub(1).map(|i| self.blocks[i]),
                next: self.blocks.get(index + 1).copied(),
            },
            _ => BlockNeighbors {
                current: None,
                previous: candidate.map(|(_, block)| block),
                next: self.blocks.get(after).copied(),
            },
        }
    }

    fn lifetime_duration_ticks(&self) -> i64 {
        self.lifetime_duration_ticks
    }
}

/// Container plus its component timelines, attached as a unit
#[derive(Debug, Clone, Default)]
pub struct StaticMedia {
    pub container: Arc<StaticContainer>,
    pub timelines: BTreeMap<MediaType, Arc<StaticTimeline>>,
}

#[derive(Default)]
struct Attached {
    media: Option<StaticMedia>,
    clock_running: Option<bool>,
    commands: CommandStatus,
}

/// Host whose collaborators are set explicitly
#[derive(Default)]
pub struct StaticHost {
    attached: Mutex<Attached>,
    can_read_more: AtomicBool,
    preloaded_subtitles: AtomicUsize,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with `media` already attached
    pub fn with_media(media: StaticMedia) -> Self {
        let host = Self::new();
        host.attach(media);
        host
    }

    pub fn attach(&self, media: StaticMedia) {
        self.attached.lock().media = Some(media);
    }

    pub fn detach(&self) {
        self.attached.lock().media = None;
    }

    pub fn set_can_read_more(&self, can_read_more: bool) {
        self.can_read_more.store(can_read_more, Ordering::Release);
    }

    pub fn set_clock_running(&self, running: Option<bool>) {
        self.attached.lock().clock_running = running;
    }

    pub fn set_commands(&self, commands: CommandStatus) {
        self.attached.lock().commands = commands;
    }

    pub fn set_preloaded_subtitles(&self, count: usize) {
        self.preloaded_subtitles.store(count, Ordering::Release);
    }
}

impl MediaHost for StaticHost {
    fn container(&self) -> Option<Arc<dyn MediaContainer>> {
        let attached = self.attached.lock();
        attached
            .media
            .as_ref()
            .map(|m| Arc::clone(&m.container) as Arc<dyn MediaContainer>)
    }

    fn block_timeline(&self, media_type: MediaType) -> Option<Arc<dyn BlockTimeline>> {
        let attached = self.attached.lock();
        attached
            .media
            .as_ref()
            .and_then(|m| m.timelines.get(&media_type))
            .map(|t| Arc::clone(t) as Arc<dyn BlockTimeline>)
    }

    fn commands(&self) -> CommandStatus {
        self.attached.lock().commands
    }

    fn can_read_more_packets(&self) -> bool {
        self.can_read_more.load(Ordering::Acquire)
    }

    fn is_clock_running(&self) -> Option<bool> {
        self.attached.lock().clock_running
    }

    fn preloaded_subtitle_count(&self) -> usize {
        self.preloaded_subtitles.load(Ordering::Acquire)
    }
}
