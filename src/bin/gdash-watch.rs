use std::time::Duration;

use clap::Parser;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn, Level};

use gdash::auth::AuthResponse;
use gdash::weather::export::format_timestamp;
use gdash::weather::repo::WeatherReading;

const DEFAULT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Parser)]
#[clap(name = "gdash-watch", version)]
struct WatchOptions {
    /// Base URL of the gdash API
    #[clap(long, default_value = "http://localhost:8080")]
    api_url: String,

    /// Login email
    #[clap(long, default_value = "admin@example.com")]
    email: String,

    /// Login password
    #[clap(long, default_value = "123456")]
    password: String,

    /// Poll the API at this interval, in seconds
    #[clap(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval_secs: u64,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info',
    /// 'warn', and 'error' (case insensitive)
    #[clap(long, default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Debug, Deserialize)]
struct InsightView {
    summary: String,
    trend: String,
    alert: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = WatchOptions::parse();

    tracing_subscriber::fmt()
        .with_max_level(opts.log_level)
        .init();

    let client = Client::new();
    let mut token: Option<String> = None;
    let mut interval = tokio::time::interval(Duration::from_secs(opts.interval_secs));

    // Each cycle is awaited to completion before the next tick, so a
    // stale response can never overwrite a newer render.
    loop {
        interval.tick().await;

        if token.is_none() {
            match login(&client, &opts).await {
                Ok(t) => {
                    info!("logged in");
                    token = Some(t);
                }
                Err(e) => {
                    warn!(error = %e, "login failed, retrying next tick");
                    continue;
                }
            }
        }
        let bearer = token.clone().unwrap_or_default();

        let insight = match fetch::<InsightView>(&client, &opts.api_url, "/weather/insights", &bearer).await {
            Ok(v) => v,
            Err(FetchError::Unauthorized) => {
                warn!("session expired, re-authenticating");
                token = None;
                continue;
            }
            Err(FetchError::Other(e)) => {
                warn!(error = %e, "failed to fetch insights");
                continue;
            }
        };

        let readings = match fetch::<Vec<WeatherReading>>(&client, &opts.api_url, "/weather", &bearer).await {
            Ok(v) => v,
            Err(FetchError::Unauthorized) => {
                token = None;
                continue;
            }
            Err(FetchError::Other(e)) => {
                warn!(error = %e, "failed to fetch readings");
                continue;
            }
        };

        render(&insight, &readings);
    }
}

enum FetchError {
    Unauthorized,
    Other(anyhow::Error),
}

async fn login(client: &Client, opts: &WatchOptions) -> anyhow::Result<String> {
    let res = client
        .post(format!("{}/auth/login", opts.api_url.trim_end_matches('/')))
        .json(&serde_json::json!({
            "email": opts.email,
            "password": opts.password,
        }))
        .send()
        .await?
        .error_for_status()?;
    let body: AuthResponse = res.json().await?;
    Ok(body.access_token)
}

async fn fetch<T: serde::de::DeserializeOwned>(
    client: &Client,
    api_url: &str,
    path: &str,
    bearer: &str,
) -> Result<T, FetchError> {
    let res = client
        .get(format!("{}{}", api_url.trim_end_matches('/'), path))
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| FetchError::Other(e.into()))?;

    if res.status() == StatusCode::UNAUTHORIZED {
        return Err(FetchError::Unauthorized);
    }
    let res = res.error_for_status().map_err(|e| FetchError::Other(e.into()))?;
    res.json::<T>().await.map_err(|e| FetchError::Other(e.into()))
}

fn render(insight: &InsightView, readings: &[WeatherReading]) {
    println!();
    println!("{}", insight.summary);
    println!("trend: {} | alert: {}", insight.trend, insight.alert);
    println!();
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>12}",
        "time", "temp (°C)", "wind (km/h)", "latitude", "longitude"
    );
    for r in readings {
        println!(
            "{:<20} {:>12} {:>12} {:>12} {:>12}",
            format_timestamp(r.timestamp),
            r.temperature,
            r.windspeed,
            r.latitude,
            r.longitude
        );
    }
}
