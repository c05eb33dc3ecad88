//! Interval reconstruction: matching presses to releases
//!
//! Single forward pass over the ordered event stream, tracking at most one
//! pending press per key. A repeated press before a release overwrites the
//! pending down time (last-press-wins, the behavior OS key-repeat produces
//! in the logs). Releases with no pending press are dropped, and presses
//! still pending at the end of the stream never become intervals.

use crate::events::{KeyEvent, KeyEventKind};
use std::collections::HashMap;

/// A closed hold interval for one key
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub key: String,
    /// Press timestamp, epoch seconds
    pub down: f64,
    /// Release timestamp, epoch seconds
    pub up: f64,
}

impl Interval {
    /// Hold duration in seconds, always >= 0
    pub fn duration(&self) -> f64 {
        self.up - self.down
    }

    /// Hold duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration() * 1000.0
    }
}

/// Outcome of one reconstruction pass
#[derive(Debug, Default)]
pub struct Reconstruction {
    pub intervals: Vec<Interval>,
    /// Releases that had no pending press
    pub unmatched_releases: usize,
    /// Presses replaced by a later press before any release
    pub overwritten_presses: usize,
    /// Release-before-press pairs rejected (clock skew or corrupt data)
    pub negative_durations: usize,
    /// Presses still pending at end of stream
    pub left_open: usize,
}

/// Reconstruct closed intervals from a chronologically ordered event stream.
pub fn reconstruct(events: &[KeyEvent]) -> Reconstruction {
    let mut pending: HashMap<&str, f64> = HashMap::new();
    let mut out = Reconstruction::default();

    for event in events {
        match event.kind {
            KeyEventKind::Press => {
                if pending.insert(&event.key, event.timestamp).is_some() {
                    out.overwritten_presses += 1;
                }
            }
            KeyEventKind::Release => {
                let down = match pending.remove(event.key.as_str()) {
                    Some(down) => down,
                    None => {
                        out.unmatched_releases += 1;
                        continue;
                    }
                };
                if event.timestamp < down {
                    log::warn!(
                        "rejecting negative duration for '{}': down={} up={}",
                        event.key,
                        down,
                        event.timestamp
                    );
                    out.negative_durations += 1;
                    continue;
                }
                out.intervals.push(Interval {
                    key: event.key.clone(),
                    down,
                    up: event.timestamp,
                });
            }
        }
    }

    out.left_open = pending.len();
    out
}
