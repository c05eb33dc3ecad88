//! Timestamp normalization for raw log records
//!
//! The capture collaborator has written timestamps in three shapes over its
//! lifetime: raw epoch seconds, a compact `YYYYMMDD_HHMMSS` form, and
//! ISO-8601. Parsing is a closed fallthrough in that order; anything else
//! fails and the record is dropped by the caller.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

/// Compact format used by early log files
const COMPACT_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A timestamp as it appears in a raw record: either a number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Seconds(f64),
    Text(String),
}

/// Normalize a raw timestamp to epoch seconds.
///
/// Returns `None` when the value is in neither accepted string format or is
/// not a finite number.
pub fn parse_timestamp(raw: &RawTimestamp) -> Option<f64> {
    match raw {
        RawTimestamp::Seconds(secs) => secs.is_finite().then_some(*secs),
        RawTimestamp::Text(text) => parse_text(text),
    }
}

fn parse_text(text: &str) -> Option<f64> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, COMPACT_FORMAT) {
        return Some(naive.and_utc().timestamp() as f64);
    }
    // ISO-8601, with or without an explicit offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        return Some(secs);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        let dt = naive.and_utc();
        let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        return Some(secs);
    }
    None
}
