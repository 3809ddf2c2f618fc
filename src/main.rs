use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use zephyrlake::pipeline::{self, PipelineParams};
use zephyrlake_config::RuntimeConfig;

/// Fetch, normalize, and store OpenAQ sensor data.
#[derive(Parser)]
#[command(name = "zephyrlake")]
#[command(version)]
#[command(about = "Fetch, normalize, and store OpenAQ sensor data", long_about = None)]
struct Cli {
    /// OpenAQ sensor id (e.g., 359)
    #[arg(long, value_name = "ID")]
    sensor: u64,

    /// Start time: YYYY-MM-DD or ISO 8601 UTC
    #[arg(long, value_name = "TIME")]
    since: String,

    /// Output folder for partitioned Parquet files (e.g., data/out)
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Pages to fetch
    #[arg(long, value_name = "N", default_value_t = 3)]
    pages: u32,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    // Load .env for local development before resolving configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => zephyrlake_config::load_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => zephyrlake_config::load().context("failed to load configuration")?,
    };

    // CLI overrides (highest priority)
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    zephyrlake::init::init_tracing(&config.log);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(async_main(cli, config))
}

async fn async_main(cli: Cli, config: RuntimeConfig) -> Result<()> {
    let params = PipelineParams {
        sensor_id: cli.sensor,
        start_time: cli.since.clone(),
        output_root: cli.out.clone(),
        max_pages: cli.pages,
    };

    let stats = pipeline::run(&config, &params).await?;

    println!(
        "{}",
        pipeline::summarize(&stats, cli.sensor, &cli.since, &cli.out)
    );
    Ok(())
}
