use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use orthomovie::{
    Config, OrthoMovie,
    encoder::DEFAULT_FPS,
    enums::OutputFormat,
    volume::Center,
};

/// Create orthoslice movies from a 4D MRI dataset
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// 4D NIfTI-1 MRI dataset filename
    #[arg(short, long)]
    infile: PathBuf,

    /// x, y and z voxel coordinate of orthoslice intersection
    #[arg(short, long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
    center: Vec<usize>,

    /// Directory for the output movies
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Mp4)]
    format: OutputFormat,

    /// Movie frame rate
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter)
        .init();

    let &[x, y, z] = args.center.as_slice() else {
        anyhow::bail!("--center takes exactly three values");
    };

    let config = Config {
        infile: args.infile,
        center: Center::new(x, y, z),
        out_dir: args.outdir,
        format: args.format,
        fps: args.fps,
    };
    let infile = config.infile.display().to_string();

    let outputs = OrthoMovie::new(config)
        .run()
        .await
        .with_context(|| format!("failed to create orthoslice movies for {infile}"))?;

    for output in outputs {
        tracing::info!("Wrote {}", output.display());
    }
    Ok(())
}
