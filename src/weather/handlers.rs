use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    state::AppState,
    weather::{
        export,
        insights::{self, Insight},
        repo::WeatherReading,
        DASHBOARD_LIMIT, EXPORT_LIMIT, INSIGHT_LIMIT,
    },
};

pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(list_readings))
        .route("/weather/insights", get(get_insights))
        .route("/weather/export.csv", get(export_csv))
        .route("/weather/export.xlsx", get(export_xlsx))
}

#[instrument(skip(state))]
pub async fn list_readings(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<WeatherReading>>, ApiError> {
    let readings = WeatherReading::latest(&state.db, DASHBOARD_LIMIT).await?;
    Ok(Json(readings))
}

#[instrument(skip(state))]
pub async fn get_insights(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Insight>, ApiError> {
    let readings = WeatherReading::latest(&state.db, INSIGHT_LIMIT).await?;
    Ok(Json(insights::classify(&readings)))
}

#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<(HeaderMap, String), ApiError> {
    let readings = WeatherReading::latest(&state.db, EXPORT_LIMIT).await?;
    let csv = export::to_csv(&readings)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"weather_data.csv\""),
    );
    Ok((headers, csv))
}

#[instrument(skip(state))]
pub async fn export_xlsx(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<(HeaderMap, Vec<u8>), ApiError> {
    let readings = WeatherReading::latest(&state.db, EXPORT_LIMIT).await?;
    let workbook = export::to_xlsx(&readings)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"weather_data.xlsx\""),
    );
    Ok((headers, workbook))
}
