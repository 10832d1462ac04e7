//! Playback state simulator (playstate-sim) - Main entry point
//!
//! Replays a scenario file against a state engine bound to an in-memory
//! host, prints every notification as it is published, then prints a final
//! diagnostics dump.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use playstate::scenario::{Scenario, ScenarioRunner};
use playstate::EventBusNotifier;
use playstate_common::config::EngineConfig;
use playstate_common::events::{EventBus, StateEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for playstate-sim
#[derive(Parser, Debug)]
#[command(name = "playstate-sim")]
#[command(about = "Replay a media session scenario against the playback state engine")]
#[command(version)]
struct Args {
    /// Engine configuration file (TOML); defaults are used when absent
    #[arg(short, long, env = "PLAYSTATE_CONFIG")]
    config: Option<PathBuf>,

    /// Scenario file (TOML)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Print events and the final dump as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = EngineConfig::load_or_default(args.config.as_deref())
        .context("Failed to load engine configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "playstate={0},playstate_common={0},playstate_sim={0}",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;

    info!("Starting playstate-sim: {} steps", scenario.steps.len());

    let event_bus = EventBus::new(config.events.capacity);
    let mut rx = event_bus.subscribe();
    let notifier = EventBusNotifier::new(event_bus);
    info!("Session {}", notifier.session_id());

    let json = args.json;
    let printer = tokio::spawn(async move {
        let mut received = 0usize;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    received += 1;
                    print_event(&event, json);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event printer lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        received
    });

    let runner = ScenarioRunner::new(&scenario, config, Arc::new(notifier));
    let steps = scenario.steps.clone();

    // Steps run on a blocking thread, like the engine's producer threads
    let dump = tokio::task::spawn_blocking(move || {
        runner.run(&steps);
        runner.engine().dump_json()
    })
    .await
    .context("Scenario thread panicked")?;

    // The runner (and with it the last bus sender) is gone, so the printer drains and stops
    let received = printer.await.context("Event printer panicked")?;

    if json {
        println!("{}", serde_json::json!({ "type": "Diagnostics", "properties": dump }));
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&dump).context("Failed to render diagnostics")?
        );
    }

    info!("Scenario complete: {} events", received);
    Ok(())
}

fn print_event(event: &StateEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize {}: {}", event.event_type(), e),
        }
        return;
    }

    match event {
        StateEvent::PhaseChanged {
            old_phase,
            new_phase,
            ..
        } => println!("phase     {} -> {}", old_phase, new_phase),
        StateEvent::PositionChanged {
            old_position_ticks,
            new_position_ticks,
            ..
        } => println!("position  {} -> {}", old_position_ticks, new_position_ticks),
        StateEvent::BufferingStarted { .. } => println!("buffering started"),
        StateEvent::BufferingEnded { .. } => println!("buffering ended"),
        StateEvent::MediaEnded { .. } => println!("media ended"),
    }
}
