//! Integration tests for HRM Tuner
//!
//! These tests exercise the full pipeline: log files on disk through
//! ingestion, reconstruction, classification and threshold derivation.

use hrm_tuner::analysis::{analyze, Flavor};
use hrm_tuner::config::Config;
use hrm_tuner::events::{discover_logs, load_events, KeyEvent};
use hrm_tuner::report::AnalysisReport;
use std::fs;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create an isolated log directory for one test
fn temp_log_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "hrm-tuner-it-{}-{}",
        std::process::id(),
        name
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp log dir");
    dir
}

fn write_log(dir: &PathBuf, name: &str, records: &[(&str, f64, bool)]) {
    let records: Vec<String> = records
        .iter()
        .map(|(button, ts, press)| {
            format!(
                r#"{{"timestamp": {}, "button": "{}", "is_on_press": {}}}"#,
                ts, button, press
            )
        })
        .collect();
    let doc = format!(r#"{{"records": [{}]}}"#, records.join(","));
    fs::write(dir.join(format!("keyboard_log_{}.json", name)), doc).expect("write log");
}

/// A burst of natural typing: f taps, f-as-modifier holds, cross-hand rolls
fn typing_session() -> Vec<(&'static str, f64, bool)> {
    vec![
        // three plain f taps: 80, 90, 100 ms
        ("f", 10.000, true),
        ("f", 10.080, false),
        ("f", 11.000, true),
        ("f", 11.090, false),
        ("f", 12.000, true),
        ("f", 12.100, false),
        // two f-as-modifier holds with k overlap: 250 and 300 ms
        ("f", 20.000, true),
        ("k", 20.060, true),
        ("k", 20.180, false),
        ("f", 20.250, false),
        ("f", 21.000, true),
        ("k", 21.070, true),
        ("k", 21.200, false),
        ("f", 21.300, false),
    ]
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn full_pipeline_from_files_to_recommendation() {
    let dir = temp_log_dir("pipeline");
    write_log(&dir, "20240101_000000", &typing_session());

    let paths = discover_logs(&dir).expect("discover logs");
    assert_eq!(paths.len(), 1);

    let stream = load_events(&paths);
    assert_eq!(stream.events.len(), 14);

    let config = Config::default();
    let analysis = analyze(&config, &stream.events);

    // taps {80,90,100}, holds {250,300}
    assert_eq!(analysis.buckets.taps_for("f").len(), 3);
    assert_eq!(analysis.buckets.holds_for("f").len(), 2);
    assert_eq!(analysis.buckets.latencies_for("f").len(), 2);

    let rec = analysis
        .recommendations
        .iter()
        .find(|r| r.key == "f")
        .expect("recommendation for f");

    // ceiling = 100 + 2 * std({80,90,100}) = 116.3 < min hold 250,
    // midpoint = 183, inside [100, 300]
    assert_eq!(rec.tapping_term_ms, Some(183));
    // 1.2 * mean tap 90 = 108 (timestamp subtraction may land a hair below)
    assert!(matches!(rec.quick_tap_ms, Some(107..=108)));
    assert!(!rec.distributions_overlap);
    // mean hold 275 > 2 * mean tap 90
    assert_eq!(rec.flavor, Some(Flavor::TapPreferred));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn multiple_overlapping_sources_merge_chronologically() {
    let dir = temp_log_dir("merge");
    // Interleaved across two files, as happens at log rotation
    write_log(
        &dir,
        "a",
        &[("f", 1.000, true), ("f", 1.080, false)],
    );
    write_log(
        &dir,
        "b",
        &[("f", 0.500, true), ("f", 0.570, false)],
    );

    let paths = discover_logs(&dir).expect("discover logs");
    let stream = load_events(&paths);

    let timestamps: Vec<f64> = stream.events.iter().map(|e| e.timestamp).collect();
    assert_eq!(timestamps, vec![0.5, 0.57, 1.0, 1.08]);

    let analysis = analyze(&Config::default(), &stream.events);
    assert_eq!(analysis.buckets.taps_for("f").len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn release_lost_at_rotation_boundary_is_tolerated() {
    let dir = temp_log_dir("boundary");
    // First file ends with a press that never gets its release recorded;
    // second file starts with a release that has no press.
    write_log(&dir, "a", &[("f", 1.000, true)]);
    write_log(&dir, "b", &[("j", 2.000, false), ("f", 3.000, true), ("f", 3.080, false)]);

    let paths = discover_logs(&dir).expect("discover logs");
    let stream = load_events(&paths);
    let analysis = analyze(&Config::default(), &stream.events);

    assert_eq!(analysis.reconstruction.unmatched_releases, 1);
    // f's press at 1.0 is overwritten by the press at 3.0 (last-press-wins)
    assert_eq!(analysis.reconstruction.overwritten_presses, 1);
    assert_eq!(analysis.buckets.taps_for("f").len(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_directory_yields_no_usable_events() {
    let dir = temp_log_dir("empty");
    let paths = discover_logs(&dir).expect("discover logs");
    assert!(paths.is_empty());
    let stream = load_events(&paths);
    assert!(stream.is_empty());
    let _ = fs::remove_dir_all(&dir);
}

// ---------------------------------------------------------------------------
// Report generation
// ---------------------------------------------------------------------------

#[test]
fn report_round_trips_through_json() {
    let dir = temp_log_dir("report");
    write_log(&dir, "session", &typing_session());

    let paths = discover_logs(&dir).expect("discover logs");
    let stream = load_events(&paths);
    let config = Config::default();
    let analysis = analyze(&config, &stream.events);
    let report = AnalysisReport::new(&config, &stream, &analysis);

    let json_path = dir.join("report.json");
    report.export_json(&json_path).expect("export report");
    let raw = fs::read_to_string(&json_path).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

    assert_eq!(value["metadata"]["sources_loaded"], 1);
    assert_eq!(value["keys"][0]["key"], "f");
    assert_eq!(value["keys"][0]["recommendation"]["tapping_term_ms"], 183);
    assert_eq!(
        value["keys"][0]["recommendation"]["flavor"],
        "tap-preferred"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn overlapping_distributions_surface_as_report_warning() {
    let dir = temp_log_dir("warning");
    // One slow tap (180ms) and one fast hold (150ms): ceiling >= min hold
    write_log(
        &dir,
        "session",
        &[
            ("f", 1.000, true),
            ("f", 1.180, false),
            ("f", 2.000, true),
            ("k", 2.050, true),
            ("k", 2.100, false),
            ("f", 2.150, false),
        ],
    );

    let paths = discover_logs(&dir).expect("discover logs");
    let stream = load_events(&paths);
    let config = Config::default();
    let analysis = analyze(&config, &stream.events);
    let report = AnalysisReport::new(&config, &stream, &analysis);

    let rec = &report.keys[0].recommendation.as_ref().unwrap();
    assert!(rec.distributions_overlap);
    assert!(matches!(rec.tapping_term_ms, Some(179..=180)));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("tap and hold times overlap")));

    let _ = fs::remove_dir_all(&dir);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn ingestion_and_reconstruction_are_idempotent() {
    let dir = temp_log_dir("idempotent");
    write_log(&dir, "session", &typing_session());

    let paths = discover_logs(&dir).expect("discover logs");
    let first = load_events(&paths);
    let second = load_events(&paths);
    assert_eq!(first.events, second.events);

    let config = Config::default();
    let a = analyze(&config, &first.events);
    let b = analyze(&config, &second.events);
    assert_eq!(a.reconstruction.intervals, b.reconstruction.intervals);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn derived_thresholds_stay_in_supported_ranges() {
    // Pathological inputs: extremely fast and extremely slow typists
    let sessions: Vec<Vec<KeyEvent>> = vec![
        vec![
            KeyEvent::press("f", 0.000),
            KeyEvent::release("f", 0.010),
            KeyEvent::press("f", 1.000),
            KeyEvent::release("f", 1.012),
        ],
        vec![
            KeyEvent::press("f", 0.000),
            KeyEvent::press("k", 0.400),
            KeyEvent::release("k", 0.600),
            KeyEvent::release("f", 0.900),
            KeyEvent::press("f", 2.000),
            KeyEvent::release("f", 2.850),
        ],
    ];

    let config = Config::default();
    for events in &sessions {
        let analysis = analyze(&config, events);
        for rec in &analysis.recommendations {
            if let Some(term) = rec.tapping_term_ms {
                assert!((100..=300).contains(&term), "tapping term {} out of range", term);
            }
            if let Some(quick) = rec.quick_tap_ms {
                assert!((100..=200).contains(&quick), "quick tap {} out of range", quick);
            }
            if let Some(idle) = rec.prior_idle_ms {
                assert!((50..=150).contains(&idle), "prior idle {} out of range", idle);
            }
        }
    }
}

#[test]
fn cross_hand_rolls_detected_end_to_end() {
    let dir = temp_log_dir("rolls");
    // f rolls into k (right hand) with 20ms overlap, j rolls into d (left)
    write_log(
        &dir,
        "session",
        &[
            ("f", 1.000, true),
            ("k", 1.050, true),
            ("f", 1.070, false),
            ("k", 1.100, false),
            ("j", 2.000, true),
            ("d", 2.040, true),
            ("j", 2.055, false),
            ("d", 2.090, false),
        ],
    );

    let paths = discover_logs(&dir).expect("discover logs");
    let stream = load_events(&paths);
    let config = Config::default();
    let analysis = analyze(&config, &stream.events);

    let f_rolls = analysis.rolls.iter().find(|r| r.key == "f").unwrap();
    assert_eq!(f_rolls.overlap_count(), 1);
    assert!((f_rolls.overlaps_ms[0] - 20.0).abs() < 1e-6);

    let j_rolls = analysis.rolls.iter().find(|r| r.key == "j").unwrap();
    assert_eq!(j_rolls.overlap_count(), 1);
    assert!((j_rolls.overlaps_ms[0] - 15.0).abs() < 1e-6);

    let _ = fs::remove_dir_all(&dir);
}
