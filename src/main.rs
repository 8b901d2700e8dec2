use anyhow::{Context, Result};
use clap::Parser;
use skin_classifier::{config::Config, web::serve, DiseaseClassifier};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skin-classifier")]
#[command(about = "ONNX-powered dog skin disease classification service")]
struct Args {
    /// Bind host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// ONNX checkpoint path (overrides MODEL_PATH)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Log level, used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Enable debug mode (same as DEBUG=true)
    #[arg(long)]
    debug: bool,

    /// Skip CUDA detection and run on CPU
    #[arg(long)]
    force_cpu: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    dotenv::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model_path) = args.model_path {
        config.model_path = model_path;
    }
    if args.debug {
        config = config.with_debug(true);
    }
    config.force_cpu |= args.force_cpu;

    let default_level = args
        .log_level
        .unwrap_or_else(|| (if config.debug { "debug" } else { "info" }).to_string());

    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting dog skin disease classifier...");
    tracing::info!("Bind address: {}", config.bind_addr());
    tracing::info!("Model checkpoint: {}", config.model_path.display());

    // 模型加载失败时直接退出
    let classifier = DiseaseClassifier::load(&config).context("Failed to load model")?;
    tracing::info!("Model ready on device: {}", classifier.device());

    serve(config, classifier).await?;

    Ok(())
}
