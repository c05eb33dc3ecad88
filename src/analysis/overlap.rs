//! Tap vs modifier-hold classification for candidate keys
//!
//! A candidate key's closed interval is a `modifier_hold` when any other
//! key's press falls strictly inside the open range (down, up), otherwise a
//! `pure_tap`. The activation latency of a hold is the elapsed time from the
//! candidate's press to the first such other-key press.

use crate::events::{KeyEvent, KeyEventKind};
use std::collections::{HashMap, HashSet};

/// Per-key duration buckets, in seconds
#[derive(Debug, Default)]
pub struct OverlapBuckets {
    /// Hold durations with no other key pressed during the hold
    pub pure_taps: HashMap<String, Vec<f64>>,
    /// Hold durations with at least one overlapping press
    pub modifier_holds: HashMap<String, Vec<f64>>,
    /// Candidate-down to first-other-press elapsed times
    pub activation_latencies: HashMap<String, Vec<f64>>,
}

impl OverlapBuckets {
    pub fn taps_for(&self, key: &str) -> &[f64] {
        self.pure_taps.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn holds_for(&self, key: &str) -> &[f64] {
        self.modifier_holds
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn latencies_for(&self, key: &str) -> &[f64] {
        self.activation_latencies
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A candidate key that is currently held down
#[derive(Debug, Clone, Copy)]
struct PendingHold {
    down: f64,
    /// Timestamp of the first other-key press seen since `down`, if any
    first_other_press: Option<f64>,
}

/// Classify every closed interval of the candidate keys in one forward pass.
pub fn classify(events: &[KeyEvent], candidates: &HashSet<String>) -> OverlapBuckets {
    let mut pending: HashMap<&str, PendingHold> = HashMap::new();
    let mut buckets = OverlapBuckets::default();

    for event in events {
        match event.kind {
            KeyEventKind::Press => {
                // Any press marks overlap for candidates already held
                for (key, hold) in pending.iter_mut() {
                    if *key != event.key
                        && event.timestamp > hold.down
                        && hold.first_other_press.is_none()
                    {
                        hold.first_other_press = Some(event.timestamp);
                    }
                }
                if candidates.contains(&event.key) {
                    // Last-press-wins, same policy as interval reconstruction
                    pending.insert(
                        &event.key,
                        PendingHold {
                            down: event.timestamp,
                            first_other_press: None,
                        },
                    );
                }
            }
            KeyEventKind::Release => {
                let hold = match pending.remove(event.key.as_str()) {
                    Some(hold) => hold,
                    None => continue,
                };
                if event.timestamp < hold.down {
                    continue; // rejected by reconstruction as well
                }
                let duration = event.timestamp - hold.down;
                // The press must fall strictly inside (down, up) to count
                match hold.first_other_press.filter(|&t| t < event.timestamp) {
                    Some(press_at) => {
                        buckets
                            .modifier_holds
                            .entry(event.key.clone())
                            .or_default()
                            .push(duration);
                        buckets
                            .activation_latencies
                            .entry(event.key.clone())
                            .or_default()
                            .push(press_at - hold.down);
                    }
                    None => {
                        buckets
                            .pure_taps
                            .entry(event.key.clone())
                            .or_default()
                            .push(duration);
                    }
                }
            }
        }
    }

    buckets
}
