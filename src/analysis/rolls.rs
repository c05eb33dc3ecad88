//! Cross-hand roll detection
//!
//! A roll is a fast overlapping sequence: the designated key goes down, an
//! opposite-hand key goes down before the designated key comes back up. The
//! scan is bounded by a fixed lookahead so events from unrelated typing
//! bursts are never paired.

use crate::events::KeyEvent;
use std::collections::{HashMap, HashSet};

/// Cross-hand roll statistics for one designated key
#[derive(Debug, Default)]
pub struct RollStats {
    pub key: String,
    /// Total presses of the designated key
    pub presses: usize,
    /// Overlap durations in milliseconds (release − other press), > 0 only
    pub overlaps_ms: Vec<f64>,
    /// Frequency of the opposite-hand key that followed
    pub next_keys: HashMap<String, usize>,
}

impl RollStats {
    pub fn overlap_count(&self) -> usize {
        self.overlaps_ms.len()
    }

    /// Share of presses that rolled into the opposite hand, as a percentage
    pub fn overlap_rate(&self) -> Option<f64> {
        if self.presses == 0 {
            return None;
        }
        Some(self.overlaps_ms.len() as f64 / self.presses as f64 * 100.0)
    }
}

/// Detect cross-hand rolls for `roll_key` against `opposite_hand`.
///
/// Key names are folded to lowercase before comparing with the hand set.
/// Modifier names in `skip` and all release events are excluded from the
/// other-key search; scanning stops at the first opposite-hand press found
/// within `lookahead` subsequent events (first-match policy).
pub fn detect(
    events: &[KeyEvent],
    roll_key: &str,
    opposite_hand: &HashSet<String>,
    skip: &HashSet<String>,
    lookahead: usize,
) -> RollStats {
    let roll_key = roll_key.to_lowercase();
    let mut stats = RollStats {
        key: roll_key.clone(),
        ..RollStats::default()
    };

    for (i, event) in events.iter().enumerate() {
        if !event.is_press() || event.key.to_lowercase() != roll_key {
            continue;
        }
        stats.presses += 1;

        let window = &events[i + 1..(i + 1 + lookahead).min(events.len())];

        // The designated key's own release bounds the overlap
        let release_time = match window
            .iter()
            .find(|e| !e.is_press() && e.key.to_lowercase() == roll_key)
        {
            Some(release) => release.timestamp,
            None => continue,
        };

        // First opposite-hand press within the window decides the roll
        for next in window {
            let next_key = next.key.to_lowercase();
            if !next.is_press() || next_key == roll_key || skip.contains(&next_key) {
                continue;
            }
            if !opposite_hand.contains(&next_key) {
                continue;
            }
            if next.timestamp < release_time {
                let overlap_ms = (release_time - next.timestamp) * 1000.0;
                stats.overlaps_ms.push(overlap_ms);
                *stats.next_keys.entry(next_key).or_insert(0) += 1;
            }
            break;
        }
    }

    stats
}
