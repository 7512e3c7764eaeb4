use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;
use tracing::{info, warn, Level};

use gdash::collector::{OpenMeteoClient, DEFAULT_API_URL};
use gdash::weather::repo::WeatherReading;

const DEFAULT_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Parser)]
#[clap(name = "gdash-collector", version)]
struct CollectorOptions {
    /// Latitude of the monitored location
    #[clap(long, default_value = "-23.5505")]
    lat: String,

    /// Longitude of the monitored location
    #[clap(long, default_value = "-46.6333")]
    lon: String,

    /// Base URL for the Open-Meteo API
    #[clap(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Fetch a reading at this interval, in seconds
    #[clap(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval_secs: u64,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info',
    /// 'warn', and 'error' (case insensitive)
    #[clap(long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let opts = CollectorOptions::parse();

    tracing_subscriber::fmt()
        .with_max_level(opts.log_level)
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    let client = OpenMeteoClient::new(reqwest::Client::new(), &opts.api_url)?;
    let mut interval = tokio::time::interval(Duration::from_secs(opts.interval_secs));

    info!(lat = %opts.lat, lon = %opts.lon, interval_secs = opts.interval_secs, "collector started");

    loop {
        interval.tick().await;

        let current = match client.current_weather(&opts.lat, &opts.lon).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to fetch weather, skipping tick");
                continue;
            }
        };

        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        match WeatherReading::insert(
            &db,
            current.temperature,
            current.windspeed,
            &opts.lat,
            &opts.lon,
            timestamp,
        )
        .await
        {
            Ok(reading) => {
                info!(
                    id = reading.id,
                    temperature = reading.temperature,
                    windspeed = reading.windspeed,
                    "reading stored"
                );
            }
            Err(e) => warn!(error = %e, "failed to store reading"),
        }
    }
}
