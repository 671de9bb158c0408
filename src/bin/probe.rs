// Print both duration estimates for a video file

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use seamloop::{
    config::Config,
    video::{DurationEstimator, DurationProber, FfprobeProber},
};

#[derive(Parser)]
#[command(name = "seamloop-probe", version, about = "Show the stream and container duration of a video")]
struct Cli {
    /// Video file to probe
    input: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let prober = FfprobeProber::new(config.probe.ffprobe_path.clone(), config.probe.disagreement_tolerance);
    let report = prober.probe(&cli.input)?;

    let show = |value: Option<f64>| value.map_or_else(|| "unknown".to_string(), |d| format!("{:.3}s", d));

    println!("file:       {}", cli.input.display());
    println!("codec:      {} {}x{}", report.video_codec, report.width, report.height);
    println!("fps:        {}", report.fps.map_or_else(|| "unknown".to_string(), |f| format!("{:.3}", f)));
    println!("audio:      {}", if report.has_audio { "yes" } else { "no" });
    println!("stream:     {}", show(report.estimate(DurationEstimator::Stream)));
    println!("container:  {}", show(report.estimate(DurationEstimator::Container)));

    match report.disagreement() {
        Some(diff) if diff > config.probe.disagreement_tolerance => {
            println!("mismatch:   {:.3}s (above {:.3}s tolerance)", diff, config.probe.disagreement_tolerance)
        }
        Some(diff) => println!("mismatch:   {:.3}s", diff),
        None => println!("mismatch:   n/a"),
    }

    match report.duration(config.probe.prefer) {
        Some((duration, estimator)) => println!("resolved:   {:.3}s ({} estimate)", duration, estimator),
        None => {
            println!("resolved:   duration unknown");
            std::process::exit(2);
        }
    }

    Ok(())
}
