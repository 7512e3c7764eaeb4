use crate::state::AppState;
use axum::Router;

pub mod export;
pub mod handlers;
pub mod insights;
pub mod repo;

/// Latest rows served by the dashboard view.
pub const DASHBOARD_LIMIT: i64 = 20;
/// Latest rows included in CSV/XLSX exports.
pub const EXPORT_LIMIT: i64 = 100;
/// Window fetched for insight classification; only the first two rows
/// drive the result.
pub const INSIGHT_LIMIT: i64 = 10;

pub fn router() -> Router<AppState> {
    handlers::weather_routes()
}
