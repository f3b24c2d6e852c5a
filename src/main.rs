//! Focuswatch CLI
//!
//! Usage:
//!   focuswatch --serve                          # HTTP + WebSocket API server
//!   focuswatch --replay session.jsonl           # Offline monitor over recorded detections
//!   focuswatch --replay - --json                # Same, reading stdin, JSON lines out
//!   focuswatch --evidence '{"t":0,...}'         # Classify a single frame

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing::{error, warn};

use focuswatch::config::MonitorConfig;
use focuswatch::core::{format_report, run_server, FrameClassifier, PreparedFrame, Replay, ReplayRecord};
use focuswatch::logging::init_tracing;
use focuswatch::types::{AttentionState, FrameResult};
use focuswatch::{MonitorError, Result, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "focuswatch",
    version = VERSION,
    about = "Focuswatch - score webcam attention and alert on sustained disengagement",
    long_about = "Focuswatch turns per-frame face, eye and profile detections into a\n\
                  smoothed focus score, an attention state and time-bounded alerts.\n\n\
                  Modes:\n  \
                  --serve     HTTP + WebSocket API server\n  \
                  --replay    Offline monitor over recorded detections (JSON lines)\n  \
                  --evidence  Classify a single frame\n\n\
                  States:\n  \
                  FOCUSED       - Frontal face, eyes on screen\n  \
                  LOOKING_DOWN  - Eyes low in the face\n  \
                  AWAY          - No face, profile, or looking above / into a corner\n  \
                  UNKNOWN       - Face visible, eyes not found"
)]
struct Args {
    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Replay recorded detections from a JSON-lines file ("-" for stdin)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Classify a single frame given as a JSON record
    #[arg(short, long)]
    evidence: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// Seconds away before the away alert (overrides config)
    #[arg(long)]
    away_threshold: Option<f64>,

    /// Cooldown between repeated transition alerts, seconds (overrides config)
    #[arg(long)]
    cooldown: Option<f64>,

    /// Log level (overrides config; RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Skip the statistics report at the end of a replay
    #[arg(long)]
    no_stats: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_config());
    if args.no_color {
        colored::control::set_override(false);
    }

    let outcome = if args.serve {
        run_server(config).await
    } else if let Some(ref path) = args.replay {
        run_replay(path, &config, &args)
    } else if let Some(ref record) = args.evidence {
        run_single(record, &args)
    } else {
        eprintln!("Nothing to do: pass --serve, --replay <file> or --evidence <json>. See --help.");
        std::process::exit(2);
    };

    if let Err(e) = outcome {
        error!(error = %e, "focuswatch failed");
        std::process::exit(1);
    }
}

/// Config file, then CLI overrides
fn load_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load_or_default(args.config.as_deref())?;
    if let Some(ref addr) = args.addr {
        config.server.addr = addr.clone();
    }
    if let Some(secs) = args.away_threshold {
        config.tracking.away_threshold_secs = secs;
    }
    if let Some(secs) = args.cooldown {
        config.tracking.alert_cooldown_secs = Some(secs);
    }
    if let Some(ref level) = args.log_level {
        config.logging.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Classify a single frame (no session history)
fn run_single(record: &str, args: &Args) -> Result<()> {
    let record: ReplayRecord = serde_json::from_str(record)
        .map_err(|e| MonitorError::InvalidInput(format!("bad evidence record: {}", e)))?;
    let prepared = PreparedFrame::from_detections(&record.detections, record.frame_width, record.frame_height)?;

    let mut result = FrameClassifier::new().classify(&prepared.evidence);
    result.faces_detected = prepared.faces_detected;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| MonitorError::Internal(e.to_string()))?;
        println!("{}", json);
    } else {
        print_frame_result(&result, args.no_color);
    }
    Ok(())
}

/// Standalone monitor over a recording
fn run_replay(path: &Path, config: &MonitorConfig, args: &Args) -> Result<()> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    let mut replay = Replay::new(config.standalone_tracker_config());
    let mut rejected = 0usize;

    for line in reader.lines() {
        let line = line?;
        match replay.feed_line(&line) {
            Ok(Some(out)) => {
                if args.json {
                    match serde_json::to_string(&out) {
                        Ok(json) => println!("{}", json),
                        Err(e) => warn!(error = %e, "failed to serialize frame"),
                    }
                } else if args.no_color {
                    println!("{}", out.to_parseable_string());
                } else {
                    println!("{}", out.to_terminal_string());
                    if let Some(kind) = out.transition_alert {
                        println!("{}", format!("  ⚠ ALERT: {}", kind).red().bold());
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                // Skipped frame: the session is untouched
                rejected += 1;
                warn!(error = %e, "frame skipped");
            }
        }
    }

    if rejected > 0 {
        warn!(rejected, frames = replay.frames(), "some frames were skipped");
    }
    if !args.no_stats {
        let stats = replay.stats();
        if args.json {
            let json = serde_json::to_string(&stats).map_err(|e| MonitorError::Internal(e.to_string()))?;
            println!("{}", json);
        } else {
            println!();
            print!("{}", format_report(&stats));
        }
    }
    Ok(())
}

fn print_frame_result(result: &FrameResult, no_color: bool) {
    let state = result.candidate_state;
    let (color, reset, emoji) = if no_color {
        ("", "", "")
    } else {
        (state.color_code(), AttentionState::color_reset(), state.emoji())
    };
    let alerts: Vec<&str> = result.alerts.iter().map(|a| a.tag()).collect();

    println!(
        "{}{} raw={:.2} | state={} | {} | alerts=[{}]{}",
        color,
        emoji,
        result.raw_score,
        state,
        result.status_text(),
        alerts.join(", "),
        reset
    );
}
