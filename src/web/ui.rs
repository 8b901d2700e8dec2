use crate::{
    classify::PredictionResult,
    image::ImageLoader,
    utils::error::ClassifierError,
    web::{extractors::ImageUpload, AppState},
};
use axum::{extract::State, response::Html};

const TEMPLATE: &str = include_str!("../../templates/ui.html");

/// 页面展示内容
#[derive(Debug)]
pub enum FormOutcome {
    /// 只显示上传控件
    Prompt,
    /// 显示图片、结论和各类别概率
    Prediction {
        image_url: String,
        result: PredictionResult,
    },
    /// 显示错误提示
    Failure(String),
}

/// 上传页面
pub async fn form_handler() -> Html<String> {
    Html(render(&FormOutcome::Prompt))
}

/// 表单提交：复用与 API 相同的预测流程，结果渲染为页面
pub async fn upload_handler(
    State(state): State<AppState>,
    upload: Result<ImageUpload, ClassifierError>,
) -> Html<String> {
    let outcome = match upload {
        Ok(ImageUpload(Some(file))) if !file.file_name.is_empty() => {
            if !ImageLoader::has_allowed_extension(&file.file_name) {
                FormOutcome::Failure(
                    ClassifierError::UnsupportedFormat(format!(
                        "{} (accepted: jpg, jpeg, png)",
                        file.file_name
                    ))
                    .to_string(),
                )
            } else {
                let classifier = state.classifier.clone();
                let bytes = file.bytes;
                let task = tokio::task::spawn_blocking(move || {
                    let result = classifier.predict(&bytes)?;
                    let image_url = ImageLoader::to_data_url(&bytes)?;
                    Ok::<_, ClassifierError>(FormOutcome::Prediction { image_url, result })
                })
                .await;

                match task {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(e)) => {
                        tracing::warn!("Form prediction failed: {}", e);
                        FormOutcome::Failure(e.to_string())
                    }
                    Err(e) => {
                        tracing::error!("Form prediction task failed: {}", e);
                        FormOutcome::Failure("Internal server error".to_string())
                    }
                }
            }
        }
        Ok(_) => FormOutcome::Prompt,
        Err(e) => FormOutcome::Failure(e.to_string()),
    };

    Html(render(&outcome))
}

/// 渲染完整页面
pub fn render(outcome: &FormOutcome) -> String {
    TEMPLATE.replace("{{content}}", &render_content(outcome))
}

fn render_content(outcome: &FormOutcome) -> String {
    match outcome {
        FormOutcome::Prompt => String::new(),
        FormOutcome::Failure(message) => format!(
            r#"<div class="banner error">Error: {}</div>"#,
            escape_html(message)
        ),
        FormOutcome::Prediction { image_url, result } => {
            let rows: String = result
                .all_probabilities
                .iter()
                .map(|(label, probability)| {
                    format!(
                        r#"<div class="row"><span class="label">{label}</span><progress value="{p:.2}" max="100"></progress><span class="value">{p:.2}%</span></div>"#,
                        label = escape_html(label.as_str()),
                        p = probability
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");

            format!(
                r#"<div class="preview"><img src="{image_url}" alt="Uploaded image"></div>
<div class="banner success">Prediction: {class} ({confidence:.2}% confidence)</div>
<h3>Probability breakdown</h3>
<div class="breakdown">
{rows}
</div>"#,
                image_url = escape_html(image_url),
                class = escape_html(result.class.as_str()),
                confidence = result.confidence,
                rows = rows
            )
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
