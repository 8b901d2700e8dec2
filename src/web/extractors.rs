use crate::utils::error::ClassifierError;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};

/// 上传字段名
pub const FILE_FIELD: &str = "file";

/// multipart 中的图片文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// 图片上传提取器
///
/// 只认带文件名的 `file` 字段；请求不是 multipart 或没有该字段时为 `None`，
/// 由处理器决定如何响应。multipart 流本身损坏时拒绝请求。
#[derive(Debug)]
pub struct ImageUpload(pub Option<UploadedFile>);

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = ClassifierError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = match Multipart::from_request(req, state).await {
            Ok(multipart) => multipart,
            Err(rejection) => {
                tracing::debug!("Request is not multipart: {}", rejection);
                return Ok(ImageUpload(None));
            }
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| read_error("Failed to read multipart field", e))?
        {
            let field_name = field.name().unwrap_or("unknown").to_string();
            if field_name != FILE_FIELD {
                tracing::debug!("Ignoring unknown field: {}", field_name);
                continue;
            }

            // 没有 filename 的同名字段是普通表单值，不是文件
            let Some(file_name) = field.file_name().map(str::to_string) else {
                tracing::debug!("Field '{}' carries no filename, ignoring", FILE_FIELD);
                continue;
            };
            let content_type = field.content_type().map(str::to_string);

            let bytes = field
                .bytes()
                .await
                .map_err(|e| read_error("Failed to read file data", e))?;

            tracing::debug!("Received file '{}': {} bytes", file_name, bytes.len());

            return Ok(ImageUpload(Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            })));
        }

        Ok(ImageUpload(None))
    }
}

/// 超出请求体上限的读取错误单独归类为 413
fn read_error(context: &str, err: MultipartError) -> ClassifierError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ClassifierError::PayloadTooLarge
    } else {
        ClassifierError::InvalidUpload(format!("{}: {}", context, err))
    }
}
