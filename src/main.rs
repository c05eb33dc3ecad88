//! HRM Tuner - analyze keyboard logs and print timing recommendations

use anyhow::{bail, Context, Result};
use hrm_tuner::analysis::analyze;
use hrm_tuner::config::Config;
use hrm_tuner::events::{discover_logs, load_events};
use hrm_tuner::report::AnalysisReport;
use std::path::PathBuf;

struct Args {
    config_path: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    json_path: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: None,
        log_dir: None,
        json_path: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                args.config_path = Some(PathBuf::from(value));
            }
            "--json" => {
                let value = iter.next().context("--json requires a path")?;
                args.json_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!("usage: hrm-tuner [--config FILE] [--json FILE] [LOG_DIR]");
                std::process::exit(0);
            }
            other if !other.starts_with('-') => {
                args.log_dir = Some(PathBuf::from(other));
            }
            other => bail!("unknown option: {}", other),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let log_dir = args.log_dir.unwrap_or_else(|| config.logs.directory.clone());

    let paths = discover_logs(&log_dir)
        .with_context(|| format!("failed to read log directory {}", log_dir.display()))?;
    log::info!("found {} log files in {}", paths.len(), log_dir.display());

    let stream = load_events(&paths);
    if stream.is_empty() {
        bail!(
            "no usable events across all sources in {} \
             (run the capture collaborator first)",
            log_dir.display()
        );
    }
    log::info!(
        "loaded {} events from {} sources",
        stream.events.len(),
        stream.sources_loaded
    );

    let analysis = analyze(&config, &stream.events);
    let report = AnalysisReport::new(&config, &stream, &analysis);

    print!("{}", report.render_text());

    if let Some(path) = &args.json_path {
        report
            .export_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}
