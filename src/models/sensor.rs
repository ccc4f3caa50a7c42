//! Sensor telemetry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SensorReading {
    pub id: i64,
    pub humidity: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SensorDataRequest {
    pub humidity: f64,
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub struct LatestSensorResponse {
    pub humidity: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    /// Append a reading with a server-assigned capture timestamp.
    /// Sensor values are not range-checked; any float is accepted.
    pub async fn record(
        pool: &SqlitePool,
        humidity: f64,
        temperature: f64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_readings (humidity, temperature, timestamp)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(humidity)
        .bind(temperature)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// The reading with the maximum timestamp, if any
    pub async fn latest(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SensorReading>(
            "SELECT * FROM sensor_readings ORDER BY timestamp DESC, id DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }

    pub fn to_latest_response(&self) -> LatestSensorResponse {
        LatestSensorResponse {
            humidity: self.humidity,
            temperature: self.temperature,
            timestamp: self.timestamp,
        }
    }
}
