//! TrustCall CLI — replay recorded or synthetic streams through the
//! suspicion scorer.
//!
//! Usage:
//!   trustcall scan <FRAMES_DIR>       Replay a frame directory as a live stream
//!   trustcall synthetic <PATTERN>     Score a generated test stream
//!   trustcall snapshot <IMAGE>        Capture a still frame as PNG
//!   trustcall config show|init        Inspect or create the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trustcall_common::config::{config_file_path, AppConfig};

mod commands;
mod console;

use commands::scan::ScanOptions;
use commands::synthetic::Pattern;

#[derive(Parser)]
#[command(
    name = "trustcall",
    about = "Real-time heuristic suspicion scoring for video streams",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a directory of frames (and optional WAV track) as a live stream
    Scan {
        /// Directory of PNG/JPEG frames, played in file-name order
        frames: PathBuf,

        /// WAV file played alongside the frames
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Sampling rate override (samples per second)
        #[arg(long)]
        fps: Option<f64>,

        /// Frame rate the sequence was recorded at
        #[arg(long, default_value = "30")]
        source_fps: f64,

        /// Host render cadence driving the scheduler
        #[arg(long, default_value = "60")]
        render_hz: f64,

        /// Pace ticks against the wall clock instead of a simulated clock
        #[arg(long)]
        realtime: bool,

        /// Enable demo perturbation spikes
        #[arg(long)]
        demo: bool,

        /// Seed for demo perturbation
        #[arg(long)]
        seed: Option<u64>,

        /// High-risk threshold override (0-100)
        #[arg(long)]
        red_threshold: Option<f64>,

        /// Write observations to a JSONL log
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate a synthetic stream and score it
    Synthetic {
        /// Pattern to generate
        #[arg(value_enum)]
        pattern: Pattern,

        /// Number of frames to generate
        #[arg(long, default_value = "150")]
        frames: usize,

        /// Seed for generated noise
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Write frames as PNGs to this directory instead of scoring them
        #[arg(long)]
        write: Option<PathBuf>,

        /// Write observations to a JSONL log
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Capture a full-resolution still frame as PNG
    Snapshot {
        /// Image file, or a frame directory combined with --at-ms
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Playback position when the input is a frame directory
        #[arg(long, default_value = "0")]
        at_ms: f64,

        /// Frame rate of the sequence
        #[arg(long, default_value = "30")]
        source_fps: f64,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let app_config = AppConfig::load_from(&config_path);

    // Initialize logging
    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    trustcall_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Scan {
            frames,
            audio,
            fps,
            source_fps,
            render_hz,
            realtime,
            demo,
            seed,
            red_threshold,
            out,
        } => {
            commands::scan::run(
                frames,
                ScanOptions {
                    audio,
                    fps,
                    source_fps,
                    render_hz,
                    realtime,
                    demo,
                    seed,
                    red_threshold,
                    out,
                },
                app_config.analyzer,
            )
            .await
        }
        Commands::Synthetic {
            pattern,
            frames,
            seed,
            write,
            out,
        } => commands::synthetic::run(pattern, frames, seed, write, out, app_config.analyzer).await,
        Commands::Snapshot {
            input,
            output,
            at_ms,
            source_fps,
        } => commands::snapshot::run(input, output, at_ms, source_fps),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_path),
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
        },
    }
}
