//! Sensor telemetry handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::{LatestSensorResponse, MessageResponse, SensorDataRequest, SensorReading};
use crate::{AppError, AppResult, AppState};

/// Ingest a telemetry reading
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<SensorDataRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(req) = payload?;

    let reading = SensorReading::record(&state.pool, req.humidity, req.temperature).await?;

    tracing::debug!(
        "Stored reading {} (humidity {}, temperature {})",
        reading.id,
        reading.humidity,
        reading.temperature
    );

    Ok(Json(MessageResponse {
        message: "Sensor data stored successfully",
    }))
}

/// Most recent reading by timestamp
pub async fn latest(State(state): State<AppState>) -> AppResult<Json<LatestSensorResponse>> {
    let reading = SensorReading::latest(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No sensor data recorded yet".to_string()))?;

    Ok(Json(reading.to_latest_response()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::handlers::test_state;

    #[tokio::test]
    async fn ingest_then_latest_roundtrip() {
        let state = test_state(test_pool().await, "models");

        ingest(
            State(state.clone()),
            Ok(Json(SensorDataRequest {
                humidity: 55.5,
                temperature: 21.0,
            })),
        )
        .await
        .unwrap();

        let response = latest(State(state)).await.unwrap();
        assert_eq!(response.0.humidity, 55.5);
        assert_eq!(response.0.temperature, 21.0);
    }

    #[tokio::test]
    async fn latest_on_empty_log_is_not_found() {
        let state = test_state(test_pool().await, "models");

        let result = latest(State(state)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn latest_tracks_newest_reading() {
        let state = test_state(test_pool().await, "models");

        for (h, t) in [(10.0, 20.0), (12.0, 22.0)] {
            ingest(
                State(state.clone()),
                Ok(Json(SensorDataRequest {
                    humidity: h,
                    temperature: t,
                })),
            )
            .await
            .unwrap();
        }

        let response = latest(State(state)).await.unwrap();
        assert_eq!(response.0.humidity, 12.0);
        assert_eq!(response.0.temperature, 22.0);
    }
}
