use chrono::NaiveDate;
use cinema_showtimes::config::Settings;
use cinema_showtimes::pipeline::Pipeline;
use cinema_showtimes::{feed, render};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Rss,
    Text,
}

/// Aggregate Cinema City showtimes across venues and enrich them with OMDb ratings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Comma-separated venue ids, e.g. "1088,1097"
    #[arg(long, value_delimiter = ',', required = true)]
    venues: Vec<String>,

    /// Showing date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    omdb_api_key: Option<String>,

    /// Venue wall-clock offset, e.g. "+01:00"
    #[arg(long)]
    utc_offset: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write output here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(key) = args.omdb_api_key {
        settings.omdb_api_key = Some(key);
    }
    if let Some(offset) = args.utc_offset {
        settings.utc_offset = offset;
    }

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let pipeline = Pipeline::from_settings(&settings)?;
    let report = pipeline.run(&args.venues, date).await;

    let rendered = match args.format {
        Format::Json => render::to_json(&report)?,
        Format::Rss => feed::generate_rss(&report, "https://www.cinema-city.pl/")?,
        Format::Text => render::to_text(&report),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            info!("wrote {} films to {}", report.films.len(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
