use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// One weather reading. Immutable once written; only the collector
/// inserts rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeatherReading {
    pub id: i64,
    pub temperature: f64,
    pub windspeed: f64,
    pub latitude: String,
    pub longitude: String,
    pub timestamp: i64, // unix seconds, recorded by the collector
}

impl WeatherReading {
    /// The `limit` most-recently-inserted readings, newest first.
    /// Recency is storage insertion order (`id`), not the timestamp
    /// payload.
    pub async fn latest(db: &PgPool, limit: i64) -> anyhow::Result<Vec<WeatherReading>> {
        let rows = sqlx::query_as::<_, WeatherReading>(
            r#"
            SELECT id, temperature, windspeed, latitude, longitude, "timestamp"
            FROM weather_readings
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        db: &PgPool,
        temperature: f64,
        windspeed: f64,
        latitude: &str,
        longitude: &str,
        timestamp: i64,
    ) -> anyhow::Result<WeatherReading> {
        let row = sqlx::query_as::<_, WeatherReading>(
            r#"
            INSERT INTO weather_readings (temperature, windspeed, latitude, longitude, "timestamp")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, temperature, windspeed, latitude, longitude, "timestamp"
            "#,
        )
        .bind(temperature)
        .bind(windspeed)
        .bind(latitude)
        .bind(longitude)
        .bind(timestamp)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}
