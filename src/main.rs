use clap::Parser;
use tracing::info;

use gdash::{app, state::AppState, users};

#[derive(Debug, Parser)]
#[clap(name = "gdash", version)]
struct ServerOptions {
    /// Seed the default administrator account if no account exists, then
    /// exit. Intended to be run once by deployment tooling before the
    /// server is started.
    #[clap(long)]
    bootstrap_admin: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let opts = ServerOptions::parse();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "gdash=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    if opts.bootstrap_admin {
        if users::repo::seed_default_admin(&app_state.db).await? {
            info!("default administrator account created");
        } else {
            info!("an account already exists, nothing to seed");
        }
        return Ok(());
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
