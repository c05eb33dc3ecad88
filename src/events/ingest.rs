//! Log source loading and event stream assembly
//!
//! Each source file is a self-contained JSON document with a top-level
//! `records` array. Some capture versions double-encode the document (the
//! whole file is a JSON string that itself contains JSON); that is detected
//! and unwrapped transparently. A malformed source is skipped and reported,
//! never fatal; malformed records inside an otherwise valid source are
//! dropped individually.

use super::timestamp::{parse_timestamp, RawTimestamp};
use super::{KeyEvent, KeyEventKind};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename prefix written by the capture collaborator
pub const LOG_FILE_PREFIX: &str = "keyboard_log_";

/// Error reading or decoding a single log source
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document is not a JSON object")]
    NotAnObject,
}

/// A source that could not be ingested, with the reason
#[derive(Debug)]
pub struct SourceError {
    pub path: PathBuf,
    pub error: IngestError,
}

/// The merged, chronologically ordered event stream
#[derive(Debug, Default)]
pub struct EventStream {
    /// Events sorted by timestamp ascending; ties keep encounter order
    pub events: Vec<KeyEvent>,
    /// Number of sources that loaded successfully
    pub sources_loaded: usize,
    /// Sources skipped entirely
    pub skipped: Vec<SourceError>,
    /// Individual records dropped (missing fields, bad timestamps)
    pub records_dropped: usize,
}

impl EventStream {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// One record as it appears in the `records` array
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: RawTimestamp,
    button: String,
    is_on_press: bool,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    #[serde(default)]
    records: Vec<Value>,
}

/// Find log files under `dir` matching `keyboard_log_*.json`, sorted by name.
pub fn discover_logs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every source, normalize timestamps, and merge into one sorted stream.
pub fn load_events(paths: &[PathBuf]) -> EventStream {
    let mut stream = EventStream::default();

    for path in paths {
        match load_source(path) {
            Ok((events, dropped)) => {
                stream.events.extend(events);
                stream.records_dropped += dropped;
                stream.sources_loaded += 1;
            }
            Err(error) => {
                log::warn!("skipping {}: {}", path.display(), error);
                stream.skipped.push(SourceError {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    // Stable sort keeps encounter order for equal timestamps
    stream
        .events
        .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    stream
}

/// Load a single source file. Returns the events plus the count of records
/// dropped for missing fields or unparseable timestamps.
fn load_source(path: &Path) -> Result<(Vec<KeyEvent>, usize), IngestError> {
    let raw = fs::read_to_string(path)?;
    let log = decode_document(raw.trim())?;

    let mut events = Vec::with_capacity(log.records.len());
    let mut dropped = 0;

    for value in log.records {
        let record: RawRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        if record.button.is_empty() {
            dropped += 1;
            continue;
        }
        let timestamp = match parse_timestamp(&record.timestamp) {
            Some(ts) => ts,
            None => {
                dropped += 1;
                continue;
            }
        };
        let kind = if record.is_on_press {
            KeyEventKind::Press
        } else {
            KeyEventKind::Release
        };
        events.push(KeyEvent::new(record.button, timestamp, kind));
    }

    if dropped > 0 {
        log::debug!("{}: dropped {} malformed records", path.display(), dropped);
    }
    Ok((events, dropped))
}

/// Parse a document, unwrapping one level of double-encoding if present.
fn decode_document(raw: &str) -> Result<RawLog, IngestError> {
    let outer: Value = serde_json::from_str(raw)?;
    let document = match outer {
        Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    if !document.is_object() {
        return Err(IngestError::NotAnObject);
    }
    Ok(serde_json::from_value(document)?)
}
