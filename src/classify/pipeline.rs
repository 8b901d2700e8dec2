use crate::{
    classify::{postprocessing::ResultFormatter, types::ModelInfo, PredictionResult},
    image::ImagePreprocessor,
    models::{Device, InferenceBackend, OnnxBackend},
    Config, Result,
};
use ndarray::{Array3, Axis};
use std::sync::Arc;
use std::time::Instant;

/// 疾病分类器：预处理 + 前向推理 + 结果格式化
///
/// 进程启动时构建一次，之后只读共享给所有请求。
#[derive(Clone)]
pub struct DiseaseClassifier {
    backend: Arc<dyn InferenceBackend>,
}

impl DiseaseClassifier {
    pub fn new<B>(backend: B) -> Self
    where
        B: InferenceBackend + 'static,
    {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// 加载 ONNX 检查点，失败时服务不应启动
    pub fn load(config: &Config) -> Result<Self> {
        Ok(Self::new(OnnxBackend::load(config)?))
    }

    /// 对上传的图像字节做一次完整预测
    pub fn predict(&self, image_bytes: &[u8]) -> Result<PredictionResult> {
        let start_time = Instant::now();

        let tensor = ImagePreprocessor::preprocess_bytes(image_bytes)?;
        let result = self.predict_tensor(tensor)?;

        tracing::debug!(
            "Prediction completed: class={}, confidence={:.2}%, time={:.3}s",
            result.class,
            result.confidence,
            start_time.elapsed().as_secs_f32()
        );

        Ok(result)
    }

    /// 对已预处理的 (3, 224, 224) 张量预测
    pub fn predict_tensor(&self, tensor: Array3<f32>) -> Result<PredictionResult> {
        // 添加batch维度
        let input = tensor.insert_axis(Axis(0));
        let logits = self.backend.forward(input)?;
        ResultFormatter::format_logits(&logits)
    }

    pub fn device(&self) -> Device {
        self.backend.device()
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            device: self.device().to_string(),
            architecture: self.backend.architecture().to_string(),
        }
    }
}
