//! JSON snapshot writer.
//!
//! Serializes the snapshot in the configured [`OutputShape`] and overwrites
//! `latest.json` in the output directory. The write goes through a temp file
//! and rename so a reader never observes a half-written snapshot.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::models::{Event, RunStatus, Snapshot};
use crate::outputs::OutputShape;

/// File name consumers poll; fully replaced on every successful run.
pub const LATEST_FILE: &str = "latest.json";

#[derive(Serialize)]
struct ListDocument<'a> {
    generated_at: NaiveDateTime,
    status: RunStatus,
    events: &'a [Event],
}

#[derive(Serialize)]
struct KeyedDocument<'a> {
    generated_at: NaiveDateTime,
    status: RunStatus,
    events: BTreeMap<&'a str, &'a Event>,
}

/// Serialize a snapshot in the requested shape.
pub fn render(snapshot: &Snapshot, shape: OutputShape) -> Result<String, serde_json::Error> {
    match shape {
        OutputShape::List => serde_json::to_string(&ListDocument {
            generated_at: snapshot.generated_at,
            status: snapshot.status,
            events: &snapshot.events,
        }),
        OutputShape::Keyed => serde_json::to_string(&KeyedDocument {
            generated_at: snapshot.generated_at,
            status: snapshot.status,
            events: snapshot
                .events
                .iter()
                .map(|event| (event.id.as_str(), event))
                .collect(),
        }),
    }
}

/// Write `latest.json` atomically under `output_dir`.
#[instrument(level = "info", skip(snapshot), fields(%output_dir))]
pub async fn write_snapshot(
    snapshot: &Snapshot,
    output_dir: &str,
    shape: OutputShape,
) -> Result<(), Box<dyn Error>> {
    let json = render(snapshot, shape)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let dir = output_dir.trim_end_matches('/');
    let tmp_path = format!("{dir}/.{LATEST_FILE}.tmp");
    let final_path = format!("{dir}/{LATEST_FILE}");

    fs::write(&tmp_path, json).await?;
    fs::rename(&tmp_path, &final_path).await?;
    info!(path = %final_path, events = snapshot.events.len(), "Wrote snapshot JSON");

    Ok(())
}
