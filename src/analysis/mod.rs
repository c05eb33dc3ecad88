//! Event analysis: interval reconstruction, overlap classification, roll
//! detection and threshold derivation

pub mod intervals;
pub mod overlap;
pub mod recommend;
pub mod rolls;
pub mod stats;

pub use intervals::{reconstruct, Interval, Reconstruction};
pub use overlap::{classify, OverlapBuckets};
pub use recommend::{derive, Flavor, Recommendation};
pub use rolls::RollStats;
pub use stats::BucketStats;

use crate::config::Config;
use crate::events::KeyEvent;
use std::collections::HashMap;

/// Results of one analysis run over an immutable event stream.
///
/// All state is owned per run; nothing is shared between invocations.
#[derive(Debug)]
pub struct Analysis {
    pub reconstruction: Reconstruction,
    pub buckets: OverlapBuckets,
    /// Cross-hand roll statistics, one entry per hand-assigned candidate
    pub rolls: Vec<RollStats>,
    /// One recommendation per candidate key with data, in candidate order
    pub recommendations: Vec<Recommendation>,
    /// Hold durations (seconds) for every key, candidates or not
    pub all_hold_durations: HashMap<String, Vec<f64>>,
}

/// Run the full pipeline over a sorted event stream.
pub fn analyze(config: &Config, events: &[KeyEvent]) -> Analysis {
    let reconstruction = reconstruct(events);

    let mut all_hold_durations: HashMap<String, Vec<f64>> = HashMap::new();
    for interval in &reconstruction.intervals {
        all_hold_durations
            .entry(interval.key.clone())
            .or_default()
            .push(interval.duration());
    }

    let candidates = config.candidate_set();
    let buckets = classify(events, &candidates);

    let left = config.left_hand_set();
    let right = config.right_hand_set();
    let skip = config.roll_skip_set();
    let lookahead = config.rolls.lookahead_events;

    let mut roll_stats = Vec::new();
    let mut recommendations = Vec::new();

    for key in &config.keys.modifier_candidates {
        // A candidate assigned to one hand rolls into the opposite hand;
        // keys outside both sets (e.g. SPACE) have no roll direction.
        let folded = key.to_lowercase();
        let opposite = if left.contains(&folded) {
            Some(&right)
        } else if right.contains(&folded) {
            Some(&left)
        } else {
            None
        };
        if let Some(opposite) = opposite {
            roll_stats.push(rolls::detect(events, key, opposite, &skip, lookahead));
        }

        if let Some(rec) = derive(
            key,
            buckets.taps_for(key),
            buckets.holds_for(key),
            buckets.latencies_for(key),
        ) {
            recommendations.push(rec);
        }
    }

    Analysis {
        reconstruction,
        buckets,
        rolls: roll_stats,
        recommendations,
        all_hold_durations,
    }
}
