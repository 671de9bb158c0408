use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use seamloop::{
    composition::{Easing, LoopEngine, LoopRequest},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "seamloop",
    version,
    about = "Turn a short video into a seamless crossfaded loop",
    long_about = "seamloop trims a window out of a video, repeats it, and crossfades every repetition into the previous one so the loop point is smooth. With --reverse, every other repetition plays backwards."
)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Output MP4 file
    #[arg(short, long)]
    output: PathBuf,

    /// Trim window start in seconds
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Trim window end in seconds (clamped to the video length)
    #[arg(long)]
    end: Option<f64>,

    /// Number of repetitions (1-10)
    #[arg(short = 'n', long)]
    loops: Option<u32>,

    /// Crossfade duration in seconds
    #[arg(short = 'x', long)]
    crossfade: Option<f64>,

    /// Play every other repetition backwards
    #[arg(short, long)]
    reverse: bool,

    /// Crossfade curve (linear, ease-in, ease-out, ease-in-out)
    #[arg(long)]
    easing: Option<Easing>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate and print the loop layout without encoding
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase())),
        )
        .init();

    info!("Starting seamloop v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    let mut request = LoopRequest::with_defaults(&cli.input, &cli.output, &config);
    request.trim_start = cli.start;
    if let Some(end) = cli.end {
        request.trim_end = end;
    }
    if let Some(loops) = cli.loops {
        request.loop_count = loops;
    }
    if let Some(crossfade) = cli.crossfade {
        request.transition = crossfade;
    }
    if let Some(easing) = cli.easing {
        request.easing = easing;
    }
    request.reverse |= cli.reverse;

    let engine = LoopEngine::with_ffprobe(config);

    if cli.dry_run {
        let prepared = engine.prepare(&request).map_err(|e| {
            error!("{}", e.user_message());
            e
        })?;

        println!("window: {:.3}s - {:.3}s", prepared.trim.clip.start(), prepared.trim.clip.end());
        if let Some(requested) = prepared.trim.clamped_from() {
            println!("note: end {:.3}s clamped to the video length", requested);
        }
        for layer in prepared.timeline.layers() {
            println!(
                "#{:<2} {:>8.3}s - {:>8.3}s  fade-in {:.3}s  {}",
                layer.segment.index,
                layer.start,
                layer.end,
                layer.fade_in(),
                if layer.segment.reversed { "reversed" } else { "forward" }
            );
        }
        println!("total: {:.3}s", prepared.timeline.duration());
        return Ok(());
    }

    let encoded = engine.run(&request).await.map_err(|e| {
        error!("{}", e.user_message());
        e
    })?;

    info!(
        "Loop saved to {:?} ({:.2}s, {} repetitions)",
        encoded.path, encoded.duration, encoded.layer_count
    );
    Ok(())
}
