//! Prediction audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CropPrediction {
    pub id: i64,
    pub crop: String,
    pub input_data: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PricePrediction {
    pub id: i64,
    pub crop: String,
    pub predicted_price: f64,
    pub input_data: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PredictCropRequest {
    pub features: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct PredictPriceRequest {
    pub crop: String,
    pub features: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct PredictCropResponse {
    pub predicted_crop: String,
}

#[derive(Debug, Serialize)]
pub struct PredictPriceResponse {
    pub predicted_price: f32,
}

impl CropPrediction {
    pub async fn record(
        pool: &SqlitePool,
        crop: &str,
        input_data: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CropPrediction>(
            r#"
            INSERT INTO crop_predictions (crop, input_data, timestamp)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(crop)
        .bind(input_data)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}

impl PricePrediction {
    pub async fn record(
        pool: &SqlitePool,
        crop: &str,
        predicted_price: f64,
        input_data: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PricePrediction>(
            r#"
            INSERT INTO price_predictions (crop, predicted_price, input_data, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(crop)
        .bind(predicted_price)
        .bind(input_data)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}

/// Audit rendering of a feature vector. Display-only, never parsed back.
pub fn render_features(features: &[f32]) -> String {
    format!("{:?}", features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn crop_prediction_append() {
        let pool = test_pool().await;

        let row = CropPrediction::record(&pool, "rice", "[1.0, 2.0, 3.0]")
            .await
            .unwrap();
        assert_eq!(row.crop, "rice");
        assert_eq!(row.input_data, "[1.0, 2.0, 3.0]");
    }

    #[tokio::test]
    async fn price_prediction_append() {
        let pool = test_pool().await;

        let row = PricePrediction::record(&pool, "wheat", 42.5, "[0.5]")
            .await
            .unwrap();
        assert_eq!(row.crop, "wheat");
        assert_eq!(row.predicted_price, 42.5);
    }

    #[test]
    fn feature_rendering_is_stable() {
        assert_eq!(render_features(&[1.0, 2.5]), "[1.0, 2.5]");
        assert_eq!(render_features(&[]), "[]");
    }
}
