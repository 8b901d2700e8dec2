use crate::{
    classify::{ModelInfo, PredictionResult},
    utils::error::ClassifierError,
    web::{extractors::ImageUpload, AppState},
    Result,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

/// 预测成功响应
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub prediction: PredictionResult,
    pub model_info: ModelInfo,
}

/// 服务信息
pub async fn index_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "online",
        "message": "Dog Skin Disease Classifier API is live!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "predict": "/predict",
            "health": "/health",
            "ui": "/ui"
        }
    }))
}

/// 健康检查端点
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model_loaded": true,
        "device": state.classifier.device(),
    }))
}

/// Multipart图片预测处理器
pub async fn predict_handler(
    State(state): State<AppState>,
    ImageUpload(upload): ImageUpload,
) -> Result<Json<PredictResponse>> {
    let start_time = Instant::now();

    let upload = upload.ok_or(ClassifierError::MissingFile)?;
    if upload.file_name.is_empty() {
        return Err(ClassifierError::EmptyFile);
    }

    tracing::info!(
        "Processing prediction request: file={}, content_type={:?}, bytes={}",
        upload.file_name,
        upload.content_type,
        upload.bytes.len()
    );

    let classifier = state.classifier.clone();
    let bytes = upload.bytes;
    let prediction = tokio::task::spawn_blocking(move || classifier.predict(&bytes))
        .await
        .map_err(|e| ClassifierError::Internal(format!("Prediction task failed: {}", e)))??;

    tracing::info!(
        "Prediction completed: class={}, confidence={:.2}%, time={:.3}s",
        prediction.class,
        prediction.confidence,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(PredictResponse {
        status: "success",
        prediction,
        model_info: state.classifier.model_info(),
    }))
}

/// 未匹配路由
pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Resource not found",
            "status": "error"
        })),
    )
}

/// 路由存在但方法不匹配
pub async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method not allowed",
            "status": "error"
        })),
    )
}
