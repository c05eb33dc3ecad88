//! Analysis report and export functionality

use crate::analysis::{Analysis, BucketStats, Recommendation, RollStats};
use crate::config::Config;
use crate::events::EventStream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Overlap histogram bucket boundaries in milliseconds
const OVERLAP_BUCKETS_MS: [(f64, f64); 6] = [
    (0.0, 10.0),
    (10.0, 20.0),
    (20.0, 30.0),
    (30.0, 50.0),
    (50.0, 100.0),
    (100.0, f64::INFINITY),
];

/// Complete analysis report
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    /// Per-candidate-key statistics and recommendation
    pub keys: Vec<KeyReport>,
    /// Cross-hand roll summaries
    pub rolls: Vec<RollReport>,
    /// Non-fatal conditions worth the user's attention
    pub warnings: Vec<String>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    pub sources_loaded: usize,
    pub sources_skipped: usize,
    pub events: usize,
    pub records_dropped: usize,
}

/// Statistics and recommendation for one modifier-candidate key
#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub key: String,
    /// Pure tap durations (no overlap during hold)
    pub taps: Option<BucketStats>,
    /// Modifier hold durations (overlap existed)
    pub holds: Option<BucketStats>,
    /// Key-down to first-other-press latencies
    pub activations: Option<BucketStats>,
    pub recommendation: Option<Recommendation>,
}

/// Cross-hand roll summary for one key
#[derive(Debug, Clone, Serialize)]
pub struct RollReport {
    pub key: String,
    pub presses: usize,
    pub overlaps: usize,
    /// Percentage of presses that rolled into the opposite hand
    pub overlap_rate: Option<f64>,
    pub overlap_stats: Option<BucketStats>,
    /// Occurrence counts per histogram bucket, labeled "0-10ms" etc.
    pub distribution: Vec<(String, usize)>,
    /// Opposite-hand keys that followed, most frequent first
    pub next_keys: Vec<(String, usize)>,
}

impl From<&RollStats> for RollReport {
    fn from(stats: &RollStats) -> Self {
        let mut next_keys: Vec<(String, usize)> = stats
            .next_keys
            .iter()
            .map(|(k, n)| (k.clone(), *n))
            .collect();
        next_keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let distribution = OVERLAP_BUCKETS_MS
            .iter()
            .map(|&(lo, hi)| {
                let label = if hi.is_finite() {
                    format!("{:.0}-{:.0}ms", lo, hi)
                } else {
                    format!("{:.0}ms+", lo)
                };
                let count = stats
                    .overlaps_ms
                    .iter()
                    .filter(|&&d| d >= lo && d < hi)
                    .count();
                (label, count)
            })
            .collect();

        Self {
            key: stats.key.clone(),
            presses: stats.presses,
            overlaps: stats.overlap_count(),
            overlap_rate: stats.overlap_rate(),
            overlap_stats: BucketStats::from_ms(&stats.overlaps_ms),
            distribution,
            next_keys,
        }
    }
}

impl AnalysisReport {
    /// Assemble a report from one analysis run.
    pub fn new(config: &Config, stream: &EventStream, analysis: &Analysis) -> Self {
        let now: DateTime<Utc> = Utc::now();

        let keys = config
            .keys
            .modifier_candidates
            .iter()
            .map(|key| KeyReport {
                key: key.clone(),
                taps: BucketStats::from_secs(analysis.buckets.taps_for(key)),
                holds: BucketStats::from_secs(analysis.buckets.holds_for(key)),
                activations: BucketStats::from_secs(analysis.buckets.latencies_for(key)),
                recommendation: analysis
                    .recommendations
                    .iter()
                    .find(|r| &r.key == key)
                    .cloned(),
            })
            .collect();

        let mut warnings = Vec::new();
        for source in &stream.skipped {
            warnings.push(format!(
                "skipped source {}: {}",
                source.path.display(),
                source.error
            ));
        }
        if analysis.reconstruction.negative_durations > 0 {
            warnings.push(format!(
                "{} intervals rejected for negative duration",
                analysis.reconstruction.negative_durations
            ));
        }
        for rec in &analysis.recommendations {
            if rec.distributions_overlap {
                warnings.push(format!(
                    "key '{}': tap and hold times overlap, tapping term is ambiguous",
                    rec.key
                ));
            }
        }

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                sources_loaded: stream.sources_loaded,
                sources_skipped: stream.skipped.len(),
                events: stream.events.len(),
                records_dropped: stream.records_dropped,
            },
            keys,
            rolls: analysis.rolls.iter().map(RollReport::from).collect(),
            warnings,
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render the human-readable statistics and configuration text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "HRM KEY ANALYSIS");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "{} events from {} sources ({} skipped, {} records dropped)",
            self.metadata.events,
            self.metadata.sources_loaded,
            self.metadata.sources_skipped,
            self.metadata.records_dropped,
        );

        for key in &self.keys {
            let _ = writeln!(out, "\n{}", thin);
            let _ = writeln!(out, "Key: '{}'", key.key);
            let _ = writeln!(out, "{}", thin);
            render_bucket(&mut out, "PURE TAPS (no other keys held)", &key.taps);
            render_bucket(&mut out, "HRM HOLDS (used as modifier)", &key.holds);
            render_bucket(
                &mut out,
                "ACTIVATION TIMING (key down to next key press)",
                &key.activations,
            );
        }

        if !self.rolls.is_empty() {
            let _ = writeln!(out, "\n{}", rule);
            let _ = writeln!(out, "CROSS-HAND ROLL ANALYSIS");
            let _ = writeln!(out, "{}", rule);
            for roll in &self.rolls {
                let _ = writeln!(out, "\nKey '{}':", roll.key);
                let _ = writeln!(out, "  Total presses: {}", roll.presses);
                let _ = writeln!(out, "  Cross-hand overlaps: {}", roll.overlaps);
                if let Some(rate) = roll.overlap_rate {
                    let _ = writeln!(out, "  Overlap rate: {:.1}%", rate);
                }
                if let Some(stats) = &roll.overlap_stats {
                    let _ = writeln!(
                        out,
                        "  Overlap: avg = {:.1}ms, min = {:.1}ms, max = {:.1}ms",
                        stats.mean, stats.min, stats.max
                    );
                    let _ = writeln!(out, "  Distribution:");
                    for (label, count) in &roll.distribution {
                        if *count > 0 {
                            let _ = writeln!(out, "    {}: {} occurrences", label, count);
                        }
                    }
                }
                if !roll.next_keys.is_empty() {
                    let _ = writeln!(out, "  Most common next keys:");
                    for (next, count) in roll.next_keys.iter().take(10) {
                        let _ =
                            writeln!(out, "    {} -> {}: {} times", roll.key, next, count);
                    }
                }
            }
        }

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "RECOMMENDATIONS");
        let _ = writeln!(out, "{}", rule);
        for key in &self.keys {
            match &key.recommendation {
                Some(rec) => {
                    let _ = writeln!(out, "\nKey '{}':", rec.key);
                    if let Some(term) = rec.tapping_term_ms {
                        let _ = writeln!(out, "  tapping-term-ms = {}", term);
                    }
                    if let Some(quick) = rec.quick_tap_ms {
                        let _ = writeln!(out, "  quick-tap-ms = {}", quick);
                    }
                    if let Some(idle) = rec.prior_idle_ms {
                        let _ = writeln!(out, "  require-prior-idle-ms = {}", idle);
                    }
                    if let Some(flavor) = rec.flavor {
                        let _ = writeln!(out, "  flavor = \"{}\"", flavor);
                    }
                }
                None => {
                    let _ = writeln!(out, "\nKey '{}': no data available", key.key);
                }
            }
        }

        if !self.warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings:");
            for warning in &self.warnings {
                let _ = writeln!(out, "  ! {}", warning);
            }
        }

        let _ = writeln!(out, "\n{}", self.render_zmk_config());
        out
    }

    /// Render the copy-paste ZMK behaviors block.
    pub fn render_zmk_config(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Add this to your ZMK keymap file:");
        let _ = writeln!(out, "behaviors {{");

        for key in &self.keys {
            let rec = match &key.recommendation {
                Some(rec) => rec,
                None => continue,
            };
            let _ = writeln!(out, "\n  // Home row modifier for '{}'", rec.key);
            let _ = writeln!(out, "  hrm_{key}: hrm_{key} {{", key = rec.key);
            let _ = writeln!(out, "    compatible = \"zmk,behavior-hold-tap\";");
            let _ = writeln!(out, "    label = \"HRM_{}\";", rec.key.to_uppercase());
            let _ = writeln!(out, "    #binding-cells = <2>;");
            let _ = writeln!(
                out,
                "    tapping-term-ms = <{}>;",
                rec.tapping_term_ms.unwrap_or(200)
            );
            if let Some(quick) = rec.quick_tap_ms {
                let _ = writeln!(out, "    quick-tap-ms = <{}>;", quick);
            }
            if let Some(idle) = rec.prior_idle_ms {
                let _ = writeln!(out, "    require-prior-idle-ms = <{}>;", idle);
            }
            let _ = writeln!(
                out,
                "    flavor = \"{}\";",
                rec.flavor.unwrap_or(crate::analysis::Flavor::Balanced)
            );
            let _ = writeln!(out, "    bindings = <&kp>, <&kp>;");
            let _ = writeln!(out, "  }};");
        }

        let _ = writeln!(out, "}};");
        out
    }
}

fn render_bucket(out: &mut String, title: &str, stats: &Option<BucketStats>) {
    match stats {
        Some(stats) => {
            let _ = writeln!(out, "\n{}:", title);
            let _ = writeln!(out, "  Count: {}", stats.count);
            let _ = writeln!(out, "  Average: {:.1}ms", stats.mean);
            let _ = writeln!(out, "  Std Dev: {:.1}ms", stats.std_dev);
            let _ = writeln!(out, "  Min: {:.1}ms", stats.min);
            let _ = writeln!(out, "  Max: {:.1}ms", stats.max);
            let _ = writeln!(out, "  95th percentile: {:.1}ms", stats.p95);
        }
        None => {
            let _ = writeln!(out, "\n{}: no data", title);
        }
    }
}
