//! Replay of recorded beacon payloads from a JSON Lines file.
//!
//! Each non-blank line is one payload in either wire shape. Malformed lines
//! are logged and skipped, the same way a live feed drops bad messages.

use std::path::Path;
use std::time::Duration;

use arcturus_core::{BeaconSnapshot, ResultExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::channel::SnapshotSender;
use crate::error::{Error, Result};
use crate::wire::decode_snapshot;

/// Outcome of a replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Non-blank lines read.
    pub lines: usize,
    /// Snapshots decoded and delivered.
    pub delivered: usize,
    /// Lines dropped as malformed.
    pub dropped: usize,
}

impl ReplayReport {
    fn record(&mut self, delivered: bool) {
        self.lines += 1;
        if delivered {
            self.delivered += 1;
        } else {
            self.dropped += 1;
        }
    }
}

/// Decode every line of a recording held in memory.
#[must_use]
pub fn parse_lines(text: &str) -> (Vec<BeaconSnapshot>, ReplayReport) {
    let mut report = ReplayReport::default();
    let snapshots = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| {
            let decoded = decode_snapshot(line)
                .into_option_logged(&format!("Dropping malformed replay line {}", index + 1));
            report.record(decoded.is_some());
            decoded
        })
        .collect();
    (snapshots, report)
}

/// Read and decode a whole recording.
///
/// # Errors
///
/// Returns [`Error::ReadFailed`] if the file cannot be read.
pub async fn load(path: impl AsRef<Path>) -> Result<(Vec<BeaconSnapshot>, ReplayReport)> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::read_failed(path, e.to_string()))?;
    Ok(parse_lines(&text))
}

/// Stream a recording into a snapshot channel.
///
/// With an `interval`, waits that long between consecutive snapshots, which
/// mimics the backend's polling cadence.
///
/// # Errors
///
/// Returns [`Error::ReadFailed`] on I/O failure and [`Error::ChannelClosed`]
/// if the consumer goes away mid-replay.
pub async fn pump(
    path: impl AsRef<Path>,
    sender: &SnapshotSender,
    interval: Option<Duration>,
) -> Result<ReplayReport> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::read_failed(path, e.to_string()))?;
    let mut lines = BufReader::new(file).lines();
    let mut report = ReplayReport::default();

    info!(path = %path.display(), "Starting replay");

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| Error::read_failed(path, e.to_string()))?
    {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = report.lines + 1;
        let Some(snapshot) = decode_snapshot(&line)
            .into_option_logged(&format!("Dropping malformed replay line {line_number}"))
        else {
            report.record(false);
            continue;
        };

        if let Some(pause) = interval.filter(|_| report.delivered > 0) {
            tokio::time::sleep(pause).await;
        }
        debug!(line = line_number, beacons = snapshot.len(), "Replaying snapshot");
        sender.send(snapshot).await?;
        report.record(true);
    }

    info!(
        lines = report.lines,
        delivered = report.delivered,
        dropped = report.dropped,
        "Replay finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_skips_blank_and_malformed() {
        let text = "\n{\"beacons\":[],\"time\":1}\n   \nnot json\n[{\"beacons\":[],\"time\":2}]\n";
        let (snapshots, report) = parse_lines(text);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            report,
            ReplayReport {
                lines: 3,
                delivered: 2,
                dropped: 1
            }
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load("/definitely/not/a/recording.jsonl").await;
        assert!(matches!(result, Err(Error::ReadFailed { .. })));
    }
}
