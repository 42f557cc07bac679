//! Integration tests for replaying recordings through the snapshot channel.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::time::Duration;

use arcturus_feed::{Error, ReplayReport, replay, snapshot_channel};

const RECORDING: &str = r#"{"beacons":[{"id":"BEACON-0001","x":10,"y":1,"z":-5,"status":"active"}],"count":1,"time":100.0}
[{"beacons":[{"id":"BEACON-0001","x":12,"y":1,"z":-5,"status":"damaged"},{"id":"BEACON-0002","x":-40,"y":0,"z":3,"status":"offline"}],"time":102.0}]

{"beacons":
{"beacons":null,"time":104.0}
"#;

fn write_recording(contents: &str) -> Result<tempfile::NamedTempFile, Box<dyn std::error::Error>> {
    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(file.path(), contents)?;
    Ok(file)
}

#[tokio::test]
async fn test_pump_delivers_valid_lines_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_recording(RECORDING)?;
    let (tx, mut rx) = snapshot_channel(8)?;

    let report = replay::pump(file.path(), &tx, None).await?;
    drop(tx);

    assert_eq!(
        report,
        ReplayReport {
            lines: 4,
            delivered: 3,
            dropped: 1
        }
    );

    let mut sizes = Vec::new();
    while let Some(item) = rx.recv().await {
        sizes.push((item.sequence, item.snapshot.len()));
    }
    assert_eq!(sizes, vec![(0, 1), (1, 2), (2, 0)]);
    Ok(())
}

#[tokio::test]
async fn test_pump_paces_snapshots() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_recording(RECORDING)?;
    let (tx, mut rx) = snapshot_channel(8)?;

    let started = tokio::time::Instant::now();
    let report = replay::pump(file.path(), &tx, Some(Duration::from_millis(20))).await?;
    drop(tx);

    assert_eq!(report.delivered, 3);
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert!(rx.recv().await.is_some());
    Ok(())
}

#[tokio::test]
async fn test_pump_stops_when_consumer_leaves() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_recording(RECORDING)?;
    let (tx, rx) = snapshot_channel(8)?;
    drop(rx);

    let result = replay::pump(file.path(), &tx, None).await;
    assert_eq!(result, Err(Error::ChannelClosed));
    Ok(())
}

#[tokio::test]
async fn test_load_matches_pump() -> Result<(), Box<dyn std::error::Error>> {
    let file = write_recording(RECORDING)?;

    let (snapshots, report) = replay::load(file.path()).await?;

    assert_eq!(snapshots.len(), 3);
    assert_eq!(report.dropped, 1);
    assert_eq!(snapshots[1].beacons[0].status, "damaged");
    Ok(())
}
