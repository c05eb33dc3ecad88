//! Timing threshold derivation from classified duration buckets

use super::stats::{percentile, BucketStats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported tapping-term range in milliseconds
const TAPPING_TERM_RANGE: (f64, f64) = (100.0, 300.0);
/// Supported quick-tap range in milliseconds
const QUICK_TAP_RANGE: (f64, f64) = (100.0, 200.0);
/// Supported prior-idle range in milliseconds
const PRIOR_IDLE_RANGE: (f64, f64) = (50.0, 150.0);

/// Hold-tap decision flavor.
///
/// `HoldPreferred` is a valid firmware option but is never selected by this
/// derivation; it exists so callers can override it in their own keymaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flavor {
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "tap-preferred")]
    TapPreferred,
    #[serde(rename = "hold-preferred")]
    HoldPreferred,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flavor::Balanced => "balanced",
            Flavor::TapPreferred => "tap-preferred",
            Flavor::HoldPreferred => "hold-preferred",
        };
        write!(f, "{}", name)
    }
}

/// Derived timing parameters for one key
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub key: String,
    /// Tap/hold separation threshold, clamped to [100, 300]
    pub tapping_term_ms: Option<u32>,
    /// Rapid re-tap window, clamped to [100, 200]
    pub quick_tap_ms: Option<u32>,
    /// Required idle time before hold can trigger, clamped to [50, 150]
    pub prior_idle_ms: Option<u32>,
    pub flavor: Option<Flavor>,
    /// Tap and hold distributions overlap; the tapping term is ambiguous
    pub distributions_overlap: bool,
}

/// Derive a recommendation from per-key duration buckets (seconds).
///
/// Returns `None` when neither tap nor hold data exists for the key.
pub fn derive(
    key: &str,
    taps_secs: &[f64],
    holds_secs: &[f64],
    latencies_secs: &[f64],
) -> Option<Recommendation> {
    let taps = BucketStats::from_secs(taps_secs);
    let holds = BucketStats::from_secs(holds_secs);
    if taps.is_none() && holds.is_none() {
        return None;
    }

    let mut overlap = false;
    let tapping_term_ms = match (&taps, &holds) {
        (Some(taps), holds) => {
            // Ceiling above which a press is no longer a plain tap
            let ceiling = taps.max + 2.0 * taps.std_dev;
            let term = match holds {
                Some(holds) if ceiling < holds.min => (ceiling + holds.min) / 2.0,
                Some(holds) => {
                    log::warn!(
                        "'{}': tap and hold times overlap (max tap {:.1}ms, min hold {:.1}ms)",
                        key,
                        taps.max,
                        holds.min
                    );
                    overlap = true;
                    ceiling
                }
                None => ceiling,
            };
            Some(clamp(term, TAPPING_TERM_RANGE))
        }
        // No taps observed: stay safely below the shortest hold
        (None, Some(holds)) => Some(clamp(holds.min * 0.8, TAPPING_TERM_RANGE)),
        (None, None) => None,
    };

    let quick_tap_ms = taps
        .as_ref()
        .map(|taps| clamp(taps.mean * 1.2, QUICK_TAP_RANGE));

    // Activation latencies faster than the 5th percentile indicate rolling
    // rather than deliberate modifier use; the idle requirement sits just
    // below that point.
    let prior_idle_ms = if latencies_secs.is_empty() {
        None
    } else {
        let mut sorted: Vec<f64> = latencies_secs.iter().map(|s| s * 1000.0).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(clamp(percentile(&sorted, 0.05) * 0.8, PRIOR_IDLE_RANGE))
    };

    let flavor = match (&taps, &holds) {
        (Some(taps), Some(holds)) => Some(if holds.mean > taps.mean * 2.0 {
            Flavor::TapPreferred
        } else {
            Flavor::Balanced
        }),
        _ => None,
    };

    Some(Recommendation {
        key: key.to_string(),
        tapping_term_ms,
        quick_tap_ms,
        prior_idle_ms,
        flavor,
        distributions_overlap: overlap,
    })
}

/// Truncate to whole milliseconds, then clamp to the supported range.
fn clamp(value_ms: f64, range: (f64, f64)) -> u32 {
    let truncated = value_ms.trunc();
    truncated.max(range.0).min(range.1) as u32
}
