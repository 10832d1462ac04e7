//! Scenario files
//!
//! A scenario describes a static container (streams, flags, metadata and
//! decoded blocks per component) and a list of steps replayed against a
//! [`StateEngine`]. Used by `playstate-sim` and by the integration tests.
//!
//! ```toml
//! [container]
//! format = "matroska"
//! duration_ms = 60000
//! seekable = true
//!
//! [[container.streams]]
//! type = "video"
//! bitrate = 600000
//! frame_rate = 25.0
//! blocks_ms = [[0, 40], [40, 80]]
//!
//! [[steps]]
//! action = "open"
//!
//! [[steps]]
//! action = "sample"
//! bytes = 65536
//! ```

mod host;

pub use host::{StaticContainer, StaticHost, StaticMedia, StaticTimeline};

use crate::engine::StateEngine;
use crate::error::{Error, Result};
use crate::host::{BlockSpan, MediaContainer, StreamInfo};
use crate::notifier::StateNotifier;
use playstate_common::config::EngineConfig;
use playstate_common::events::{MediaType, PlaybackPhase};
use playstate_common::timing::{ms_to_ticks, TICKS_PER_MS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Complete scenario file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub container: ContainerSpec,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// Static container description
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainerSpec {
    pub format: Option<String>,
    /// Container-level bitrate (bits/s)
    pub bitrate: u64,
    pub duration_ms: Option<i64>,
    pub live: bool,
    pub network: bool,
    pub seekable: bool,
    pub bytes_read: u64,
    pub main: Option<MediaType>,
    pub metadata: BTreeMap<String, String>,
    pub streams: Vec<StreamSpec>,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            format: None,
            bitrate: 0,
            duration_ms: None,
            live: false,
            network: false,
            seekable: true,
            bytes_read: 0,
            main: None,
            metadata: BTreeMap::new(),
            streams: Vec::new(),
        }
    }
}

/// One elementary stream and its decoded blocks
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamSpec {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub index: Option<i32>,
    pub codec: Option<String>,
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub channels: u32,
    #[serde(default)]
    pub sample_rate: u32,
    #[serde(default)]
    pub bits_per_sample: u32,
    #[serde(default)]
    pub closed_captions: bool,
    /// Decoded blocks as `[start_ms, end_ms]`
    #[serde(default)]
    pub blocks_ms: Vec<[i64; 2]>,
    /// Decoded duration, overriding the sum of `blocks_ms`
    pub decoded_ms: Option<i64>,
}

/// Single scenario action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Attach the container and move through Opening to Playing
    Open,
    /// Queued-bytes sample
    Sample {
        bytes: u64,
        #[serde(default = "default_can_read_more")]
        can_read_more: bool,
    },
    Position {
        ms: i64,
    },
    Phase {
        phase: PlaybackPhase,
        ms: Option<i64>,
    },
    /// Byte rate guess; defaults to the container's bytes read
    Guess {
        bytes: Option<u64>,
    },
    BufferingStarted,
    BufferingEnded,
    End,
    /// Move to Closing, detach the container and reset the session
    Close,
}

fn default_can_read_more() -> bool {
    true
}

/// Reject millisecond values that do not fit the tick range
fn check_ms(what: &str, ms: i64) -> Result<()> {
    if ms.checked_mul(TICKS_PER_MS).is_none() {
        return Err(Error::Scenario(format!(
            "{} out of range: {}ms (limit ±{}ms)",
            what,
            ms,
            i64::MAX / TICKS_PER_MS
        )));
    }
    Ok(())
}

impl Scenario {
    /// Parse and validate a scenario from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&content)?;
        info!(
            "Loaded scenario from {} ({} steps)",
            path.display(),
            scenario.steps.len()
        );
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for stream in &self.container.streams {
            if seen.contains(&stream.media_type) {
                return Err(Error::Scenario(format!(
                    "duplicate {} stream",
                    stream.media_type
                )));
            }
            seen.push(stream.media_type);

            if let Some([start, end]) = stream.blocks_ms.iter().find(|[s, e]| e < s) {
                return Err(Error::Scenario(format!(
                    "{} block ends before it starts: [{}, {}]",
                    stream.media_type, start, end
                )));
            }
            if stream.decoded_ms.is_some_and(|ms| ms < 0) {
                return Err(Error::Scenario(format!(
                    "{} decoded_ms must not be negative",
                    stream.media_type
                )));
            }
            for ms in stream.blocks_ms.iter().flatten() {
                check_ms("block boundary", *ms)?;
            }
            if let Some(ms) = stream.decoded_ms {
                check_ms("decoded_ms", ms)?;
            }
        }
        if let Some(ms) = self.container.duration_ms {
            check_ms("duration_ms", ms)?;
        }
        for step in &self.steps {
            match step {
                ScenarioStep::Position { ms } | ScenarioStep::Phase { ms: Some(ms), .. } => {
                    check_ms("step position", *ms)?
                }
                _ => {}
            }
        }

        if let Some(main) = self.container.main {
            if !seen.contains(&main) {
                return Err(Error::Scenario(format!("main component {} has no stream", main)));
            }
        }
        Ok(())
    }

    /// Build the in-memory container and timelines
    pub fn media(&self) -> StaticMedia {
        let spec = &self.container;
        let mut streams = BTreeMap::new();
        let mut timelines = BTreeMap::new();

        for (position, stream) in spec.streams.iter().enumerate() {
            let info = StreamInfo {
                index: stream.index.unwrap_or(position as i32),
                codec_name: stream.codec.clone(),
                bitrate: stream.bitrate,
                frame_width: stream.width,
                frame_height: stream.height,
                display_rotation: stream.rotation,
                frame_rate: stream.frame_rate,
                channels: stream.channels,
                sample_rate: stream.sample_rate,
                bits_per_sample: stream.bits_per_sample,
                has_closed_captions: stream.closed_captions,
            };
            streams.insert(stream.media_type, info);

            let blocks = stream
                .blocks_ms
                .iter()
                .map(|[start, end]| BlockSpan::new(ms_to_ticks(*start), ms_to_ticks(*end)))
                .collect();
            let mut timeline = StaticTimeline::new(blocks);
            if let Some(decoded_ms) = stream.decoded_ms {
                timeline = timeline.with_lifetime_duration(ms_to_ticks(decoded_ms));
            }
            timelines.insert(stream.media_type, Arc::new(timeline));
        }

        StaticMedia {
            container: Arc::new(StaticContainer {
                is_open: true,
                metadata: spec.metadata.clone(),
                format_name: spec.format.clone(),
                streams,
                media_bitrate: spec.bitrate,
                duration_ticks: spec.duration_ms.map(ms_to_ticks),
                is_live_stream: spec.live,
                is_network_stream: spec.network,
                is_seekable: spec.seekable,
                lifetime_bytes_read: spec.bytes_read,
                main_media_type: spec.main,
            }),
            timelines,
        }
    }
}

/// Replays scenario steps against an engine bound to a [`StaticHost`]
pub struct ScenarioRunner {
    engine: Arc<StateEngine>,
    host: Arc<StaticHost>,
    media: StaticMedia,
}

impl ScenarioRunner {
    /// Create a runner with a closed engine and nothing attached
    pub fn new(scenario: &Scenario, config: EngineConfig, notifier: Arc<dyn StateNotifier>) -> Self {
        let host = Arc::new(StaticHost::new());
        let engine = Arc::new(StateEngine::new(host.clone(), notifier, config));
        Self {
            engine,
            host,
            media: scenario.media(),
        }
    }

    pub fn engine(&self) -> &Arc<StateEngine> {
        &self.engine
    }

    pub fn host(&self) -> &Arc<StaticHost> {
        &self.host
    }

    pub fn run(&self, steps: &[ScenarioStep]) {
        for step in steps {
            self.apply(step);
        }
    }

    pub fn apply(&self, step: &ScenarioStep) {
        debug!("Scenario step: {:?}", step);
        let engine = &self.engine;

        match step {
            ScenarioStep::Open => {
                self.host.attach(self.media.clone());
                engine.set_phase(PlaybackPhase::Opening, None);
                engine.refresh_snapshot();
                engine.initialize_buffering();
                engine.set_phase(PlaybackPhase::Playing, None);
                engine.refresh_snapshot();
            }
            ScenarioStep::Sample {
                bytes,
                can_read_more,
            } => {
                self.host.set_can_read_more(*can_read_more);
                engine.update_progress(*bytes);
            }
            ScenarioStep::Position { ms } => engine.update_position(ms_to_ticks(*ms)),
            ScenarioStep::Phase { phase, ms } => engine.set_phase(*phase, ms.map(ms_to_ticks)),
            ScenarioStep::Guess { bytes } => {
                let bytes = bytes.unwrap_or_else(|| self.media.container.lifetime_bytes_read());
                engine.guess_byte_rate(bytes)
            }
            ScenarioStep::BufferingStarted => engine.signal_buffering_started(),
            ScenarioStep::BufferingEnded => engine.signal_buffering_ended(),
            ScenarioStep::End => engine.set_media_ended(true),
            ScenarioStep::Close => {
                engine.set_phase(PlaybackPhase::Closing, None);
                self.host.detach();
                engine.reset_session();
                engine.refresh_snapshot();
                engine.initialize_buffering();
            }
        }
    }
}
