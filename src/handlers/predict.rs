//! Prediction handlers
//!
//! Inference loads an artifact from disk and runs synchronously, so it is
//! pushed onto the blocking pool; a slow load stalls only its own request.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::{
    render_features, CropPrediction, PredictCropRequest, PredictCropResponse,
    PredictPriceRequest, PredictPriceResponse, PricePrediction,
};
use crate::{AppError, AppResult, AppState};

/// Crop recommendation from a feature vector
pub async fn crop(
    State(state): State<AppState>,
    payload: Result<Json<PredictCropRequest>, JsonRejection>,
) -> AppResult<Json<PredictCropResponse>> {
    let Json(req) = payload?;

    let gateway = state.gateway.clone();
    let features = req.features.clone();
    let label = tokio::task::spawn_blocking(move || gateway.predict_crop(&features))
        .await
        .map_err(|e| AppError::InternalError(format!("inference task failed: {}", e)))??;

    CropPrediction::record(&state.pool, &label, &render_features(&req.features)).await?;

    tracing::info!("Crop prediction: {}", label);

    Ok(Json(PredictCropResponse {
        predicted_crop: label,
    }))
}

/// Price prediction for a crop from a feature vector
pub async fn price(
    State(state): State<AppState>,
    payload: Result<Json<PredictPriceRequest>, JsonRejection>,
) -> AppResult<Json<PredictPriceResponse>> {
    let Json(req) = payload?;

    let gateway = state.gateway.clone();
    let features = req.features.clone();
    let predicted = tokio::task::spawn_blocking(move || gateway.predict_price(&features))
        .await
        .map_err(|e| AppError::InternalError(format!("inference task failed: {}", e)))??;

    PricePrediction::record(
        &state.pool,
        &req.crop,
        f64::from(predicted),
        &render_features(&req.features),
    )
    .await?;

    tracing::info!("Price prediction for {}: {}", req.crop, predicted);

    Ok(Json(PredictPriceResponse {
        predicted_price: predicted,
    }))
}
