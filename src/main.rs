mod config;
mod skilljar;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, DEFAULT_BASE_URL};

/// Download lessons from Skilljar courses
#[derive(Parser, Debug)]
#[command(name = "skilljar-downloader", version, about)]
struct Cli {
    /// Skilljar API key
    #[arg(long, env = "SKILLJAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Course IDs to download
    #[arg(long, required = true, num_args = 1..)]
    course_ids: Vec<String>,

    /// Output directory for downloads
    #[arg(long, default_value = "downloads")]
    output_dir: PathBuf,

    /// Base URL of the Skilljar API
    #[arg(long, env = "SKILLJAR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Skip TLS certificate verification (intercepting proxies)
    #[arg(long, env = "SKILLJAR_INSECURE")]
    insecure: bool,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = 100)]
    page_delay_ms: u64,

    /// Pause after each lesson, in milliseconds
    #[arg(long, default_value_t = 200)]
    lesson_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.api_key, &cli.base_url)?
        .insecure(cli.insecure)
        .delays(
            Duration::from_millis(cli.page_delay_ms),
            Duration::from_millis(cli.lesson_delay_ms),
        );

    let client = skilljar::SkilljarClient::new(&config)?;

    tracing::info!(courses = cli.course_ids.len(), "starting download");
    let summary = client
        .download_courses(&cli.course_ids, &cli.output_dir)
        .await?;

    tracing::info!(
        courses_completed = summary.courses_completed,
        courses_failed = summary.courses_failed,
        lessons = summary.lessons,
        assets_downloaded = summary.assets_downloaded,
        assets_failed = summary.assets_failed,
        "download completed"
    );

    Ok(())
}
