pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{utils::error::ClassifierError, Config, DiseaseClassifier, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub classifier: DiseaseClassifier,
}

impl AppState {
    pub fn new(config: Config, classifier: DiseaseClassifier) -> Self {
        Self { config, classifier }
    }
}

/// 绑定监听地址，主机名通过系统解析
pub async fn bind(config: &Config) -> Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            ClassifierError::Config(format!(
                "Failed to bind to address {}: {}",
                config.bind_addr(),
                e
            ))
        })
}

pub async fn serve(config: Config, classifier: DiseaseClassifier) -> Result<()> {
    let listener = bind(&config).await?;
    let addr = listener.local_addr()?;

    // 构建应用路由
    let app = create_app(AppState::new(config, classifier));

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /          - Service information");
    tracing::info!("  GET  /health    - Health check");
    tracing::info!("  POST /predict   - Multipart image upload");
    tracing::info!("  GET  /ui        - Interactive upload form");

    // 启动服务器
    axum::serve(listener, app)
        .await
        .map_err(|e| ClassifierError::Internal(format!("Server failed to start: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let server_config = state.config.server_config.clone();

    let api = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/predict", post(handlers::predict_handler));

    Router::new()
        .route("/", get(handlers::index_handler))
        // Web UI路由
        .route("/ui", get(ui::form_handler).post(ui::upload_handler))
        .merge(api.clone())
        // 兼容带版本号的旧路径
        .nest("/api/v1", api)
        .fallback(handlers::not_found_handler)
        .method_not_allowed_fallback(handlers::method_not_allowed_handler)
        // 添加中间件
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server_config.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server_config.request_timeout,
        )))
        // 413 / 408 统一改写为 JSON 错误体
        .layer(axum::middleware::from_fn(middleware::json_error_responses))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .with_state(state)
}
