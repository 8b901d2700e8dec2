use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// 上传格式说明，在缺少文件时返回给调用方
pub const REQUIRED_FORMAT: &str = "multipart/form-data with 'file' field";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Incompatible model: {0}")]
    IncompatibleModel(String),

    #[error("No image file provided")]
    MissingFile,

    #[error("Empty file provided")]
    EmptyFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    Timeout,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ClassifierError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifierError::MissingFile
            | ClassifierError::EmptyFile
            | ClassifierError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ClassifierError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifierError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ClassifierError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ClassifierError::ModelLoad(_) | ClassifierError::IncompatibleModel(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 错误类别名称，处理失败时通过 `type` 字段返回
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::ModelLoad(_) => "ModelLoadError",
            ClassifierError::IncompatibleModel(_) => "IncompatibleModelError",
            ClassifierError::MissingFile => "MissingFileError",
            ClassifierError::EmptyFile => "EmptyFileError",
            ClassifierError::InvalidUpload(_) => "InvalidUploadError",
            ClassifierError::PayloadTooLarge => "PayloadTooLargeError",
            ClassifierError::Timeout => "TimeoutError",
            ClassifierError::UnsupportedFormat(_) => "UnsupportedFormatError",
            ClassifierError::ImageProcessing(_) => "ImageProcessingError",
            ClassifierError::Inference(_) => "InferenceError",
            ClassifierError::Config(_) => "ConfigError",
            ClassifierError::Io(_) => "IoError",
            ClassifierError::ImageDecode(_) => "ImageDecodeError",
            ClassifierError::Ort(_) => "OrtError",
            ClassifierError::Internal(_) => "InternalError",
        }
    }

    /// 构造响应体，所有错误响应都带 `status: "error"`
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            ClassifierError::MissingFile => json!({
                "error": self.to_string(),
                "status": "error",
                "required_format": REQUIRED_FORMAT,
            }),
            ClassifierError::EmptyFile
            | ClassifierError::InvalidUpload(_)
            | ClassifierError::PayloadTooLarge
            | ClassifierError::Timeout
            | ClassifierError::UnsupportedFormat(_) => json!({
                "error": self.to_string(),
                "status": "error",
            }),
            _ => json!({
                "error": self.to_string(),
                "status": "error",
                "type": self.kind(),
            }),
        }
    }
}

impl IntoResponse for ClassifierError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {} ({})", self, status);
        } else {
            tracing::warn!("Request rejected: {} ({})", self, status);
        }

        (status, axum::Json(self.to_body())).into_response()
    }
}
