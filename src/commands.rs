//! CLI command handlers.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arcturus_core::{BeaconRecord, BeaconStatus, Position, StationConfig};
use arcturus_feed::{Error as FeedError, ReplayReport, replay, snapshot_channel};
use arcturus_projection::SphericalProjector;
use arcturus_reconciler::{
    BeaconSetReconciler, BeaconStats, IntentSink, LoopConfig, LoopSummary, ReconcileOutcome,
    ReconciliationIntent, ReconciliationLoop,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cli::Commands;

/// Execute a CLI command.
///
/// This is the main command dispatcher that routes to the appropriate handler.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Replay {
            input,
            config,
            interval_ms,
        } => cmd_replay(input, config, interval_ms).await,

        Commands::Project { x, y, z, config } => cmd_project(Position::new(x, y, z), config),

        Commands::CheckConfig { config } => cmd_check_config(&config),
    }
}

/// Load the config file if one was given, defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn load_config(path: Option<&Path>) -> Result<StationConfig> {
    path.map_or_else(
        || Ok(StationConfig::default()),
        |path| {
            StationConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        },
    )
}

/// One printed intent line, with the status cues a renderer would show.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntentLine<'a> {
    sequence: u64,
    #[serde(flatten)]
    intent: &'a ReconciliationIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    indicator_rgb: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pulse_rate: Option<f32>,
}

impl<'a> IntentLine<'a> {
    fn new(sequence: u64, intent: &'a ReconciliationIntent) -> Self {
        let status = intent.record().map(BeaconRecord::status_kind);
        Self {
            sequence,
            intent,
            indicator_rgb: status.map(BeaconStatus::indicator_rgb),
            pulse_rate: status.map(BeaconStatus::pulse_rate),
        }
    }
}

/// Intent sink that writes each intent as one JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> IntentSink for JsonLinesSink<W> {
    async fn apply(
        &self,
        sequence: u64,
        outcome: &ReconcileOutcome,
    ) -> arcturus_reconciler::Result<()> {
        let mut out = self.out.lock().await;
        outcome
            .intents
            .iter()
            .try_for_each(|intent| {
                serde_json::to_writer(&mut *out, &IntentLine::new(sequence, intent))
                    .map_err(std::io::Error::from)?;
                writeln!(out)
            })
            .and_then(|()| out.flush())
            .map_err(|e| arcturus_reconciler::Error::sink_failed(sequence, e.to_string()))
    }
}

/// Totals of a replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayRun {
    /// What the reader saw.
    pub report: ReplayReport,
    /// What the loop did.
    pub summary: LoopSummary,
    /// Beacons present at the end.
    pub stats: BeaconStats,
}

/// Replay a recording through the reconciliation loop into `sink`.
///
/// Ctrl+C stops the loop early; the run then reports what was processed.
///
/// # Errors
///
/// Returns an error if the config is invalid, the recording cannot be read,
/// or the sink keeps failing.
pub async fn run_replay(
    input: PathBuf,
    config: &StationConfig,
    interval: Option<Duration>,
    sink: Arc<dyn IntentSink>,
) -> Result<ReplayRun> {
    let reconciler = BeaconSetReconciler::from_params(config.planet)
        .context("Planet parameters rejected")?;
    let (sender, receiver) =
        snapshot_channel(config.feed.channel_capacity).context("Feed settings rejected")?;
    let mut runner =
        ReconciliationLoop::new(reconciler, receiver, sink, LoopConfig::from(config.reconciler));

    let stopper = runner.stopper();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, stopping replay");
            stopper.stop();
        }
    });

    let pump = tokio::spawn(async move { replay::pump(&input, &sender, interval).await });

    let loop_result = runner.run().await;
    let stats = runner.reconciler().stats();
    drop(runner);
    interrupt.abort();

    let report = match pump.await.context("Replay task failed")? {
        Ok(report) => report,
        Err(FeedError::ChannelClosed) => {
            warn!("Replay cut short, reconciliation loop ended first");
            ReplayReport::default()
        }
        Err(e) => return Err(e).context("Replay failed"),
    };
    let summary = loop_result.context("Reconciliation loop failed")?;

    Ok(ReplayRun {
        report,
        summary,
        stats,
    })
}

/// Replay a recording, printing intents and then the run totals.
async fn cmd_replay(
    input: PathBuf,
    config: Option<PathBuf>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let interval = Some(interval_ms.unwrap_or(config.feed.replay_interval_ms))
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    info!(input = %input.display(), "Replaying recording");

    let sink = Arc::new(JsonLinesSink::new(std::io::stdout()));
    let run = run_replay(input, &config, interval, sink).await?;

    let totals = json!({
        "replay": {
            "lines": run.report.lines,
            "delivered": run.report.delivered,
            "dropped": run.report.dropped,
        },
        "reconciled": {
            "snapshots": run.summary.snapshots,
            "intents": run.summary.intents,
            "rejected": run.summary.rejected,
            "sinkFailures": run.summary.sink_failures,
        },
        "stats": run.stats.to_map(),
    });
    println!("{totals}");
    Ok(())
}

/// Project one coordinate and print the placement.
fn cmd_project(position: Position, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let projector = SphericalProjector::new(config.planet).context("Planet parameters rejected")?;
    let placement = projector.project_position(position);

    let output = serde_json::to_string_pretty(&placement).context("Failed to encode placement")?;
    println!("{output}");
    Ok(())
}

/// Validate a config file and print the derived geometry.
fn cmd_check_config(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    let planet = &config.planet;

    let report = json!({
        "valid": true,
        "config": config,
        "derived": {
            "atmosphereRadius": planet.atmosphere_radius(),
            "altitudeCeiling": planet.altitude_ceiling(),
            "surfaceFloor": planet.surface_floor(),
        },
        "statuses": BeaconStatus::TRACKED
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>(),
    });
    let output = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{output}");
    Ok(())
}
