use crate::utils::error::ClassifierError;
use crate::Result;
use std::path::PathBuf;

/// 默认模型文件（ResNet50 + 6 类分类头导出的 ONNX）
pub const DEFAULT_MODEL_PATH: &str = "best_model.onnx";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    /// 监听地址
    pub host: String,

    /// 监听端口
    pub port: u16,

    /// 模型文件路径
    pub model_path: PathBuf,

    /// 调试模式
    pub debug: bool,

    /// 强制使用CPU推理
    pub force_cpu: bool,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 服务器配置
    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 请求超时时间（秒）
    pub request_timeout: u64,

    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Config {
    /// 从进程环境变量读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数读取配置，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);
        let force_cpu = lookup("FORCE_CPU").map(|v| parse_flag(&v)).unwrap_or(false);

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ClassifierError::Config(format!("Invalid PORT {:?}: {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let model_path = lookup("MODEL_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        Ok(Self::new(host, port, model_path, debug, force_cpu))
    }

    pub fn new(
        host: String,
        port: u16,
        model_path: PathBuf,
        debug: bool,
        force_cpu: bool,
    ) -> Self {
        let cpu_cores = num_cpus::get();

        let onnx_config = OnnxConfig {
            intra_threads: (cpu_cores * 3 / 4).max(1), // 使用75%的CPU核心
        };

        Self {
            host,
            port,
            model_path,
            debug,
            force_cpu,
            onnx_config,
            server_config: ServerConfig::new(debug),
        }
    }

    /// 设置调试模式，同时刷新依赖调试模式的服务器参数
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self.server_config = ServerConfig::new(debug);
        self
    }

    /// 服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ServerConfig {
    fn new(debug: bool) -> Self {
        Self {
            request_timeout: if debug { 300 } else { 60 }, // 调试模式更长超时
            max_request_size: 50 * 1024 * 1024,           // 50MB
        }
    }
}

/// `"true"`（不区分大小写）或 `"1"` 视为开启
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, PathBuf::from("best_model.onnx"));
        assert!(!config.debug);
        assert!(!config.force_cpu);
        assert_eq!(config.server_config.request_timeout, 60);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DEBUG", "True"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("MODEL_PATH", "/models/resnet.onnx"),
        ]))
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.server_config.request_timeout, 300);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.model_path, PathBuf::from("/models/resnet.onnx"));
    }

    #[test]
    fn debug_only_accepts_true_like_values() {
        for raw in ["false", "no", "", "yes"] {
            let config = Config::from_lookup(lookup_from(&[("DEBUG", raw)])).unwrap();
            assert!(!config.debug, "DEBUG={raw:?} should be off");
        }
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));
    }
}
