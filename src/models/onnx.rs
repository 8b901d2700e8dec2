use crate::image::transforms::{CROP_SIZE, NUM_CHANNELS};
use crate::models::{labels::NUM_CLASSES, Device, InferenceBackend};
use crate::utils::error::ClassifierError;
use crate::{Config, Result};
use ndarray::Array4;
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider},
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;

/// ONNX Runtime 推理后端
///
/// 检查点为 ResNet50 导出的 ONNX 图，最后一层全连接已替换为 2048 -> 6。
/// 导出时模型处于 eval 模式，推理会话本身不保留梯度。
pub struct OnnxBackend {
    session: Mutex<Session>,
    input_name: String,  // 动态发现的输入名称
    output_name: String, // 动态发现的输出名称
    device: Device,
}

impl OnnxBackend {
    /// 加载检查点，任何失败都不可恢复
    pub fn load(config: &Config) -> Result<Self> {
        let model_path = &config.model_path;

        if !model_path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Checkpoint not found: {}",
                model_path.display()
            )));
        }

        let device = Device::select(config.force_cpu);
        tracing::info!(
            "Loading classification model from: {} (device: {})",
            model_path.display(),
            device
        );

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.onnx_config.intra_threads)?;

        // CUDA 注册失败时直接报错，避免静默回退到 CPU 后仍上报 cuda
        let builder = match device {
            Device::Cuda => builder
                .with_execution_providers([
                    CUDAExecutionProvider::default().build().error_on_failure(),
                    CPUExecutionProvider::default().build(),
                ])
                .map_err(|e| {
                    ClassifierError::ModelLoad(format!(
                        "Failed to register CUDA execution provider: {}",
                        e
                    ))
                })?,
            Device::Cpu => builder,
        };

        let session = builder.commit_from_file(model_path).map_err(|e| {
            ClassifierError::ModelLoad(format!(
                "Failed to read checkpoint {}: {}",
                model_path.display(),
                e
            ))
        })?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(ClassifierError::IncompatibleModel(
                    "Model has no inputs".to_string(),
                ))
            }
        };
        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(ClassifierError::IncompatibleModel(
                    "Model has no outputs".to_string(),
                ))
            }
        };
        tracing::info!("Model input: '{}', output: '{}'", input_name, output_name);

        let backend = Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            device,
        };

        backend.verify_head()?;
        tracing::info!("Classification model loaded successfully");

        Ok(backend)
    }

    /// 用全零输入跑一次前向，确认分类头输出与类别数一致
    fn verify_head(&self) -> Result<()> {
        let probe = Array4::<f32>::zeros((1, NUM_CHANNELS, CROP_SIZE, CROP_SIZE));
        let logits = self.run(probe).map_err(|e| {
            ClassifierError::IncompatibleModel(format!("Probe forward pass failed: {}", e))
        })?;

        if logits.len() != NUM_CLASSES {
            return Err(ClassifierError::IncompatibleModel(format!(
                "Expected {} outputs from classification head, got {}",
                NUM_CLASSES,
                logits.len()
            )));
        }

        Ok(())
    }

    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let input_tensor = Tensor::from_array(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

        match outputs.get(self.output_name.as_str()) {
            Some(output) => {
                let (_shape, data) = output.try_extract_tensor::<f32>()?;
                Ok(data.to_vec())
            }
            None => {
                let available: Vec<String> = outputs.keys().map(|s| s.to_string()).collect();
                Err(ClassifierError::Inference(format!(
                    "Output '{}' not found. Available outputs: {:?}",
                    self.output_name, available
                )))
            }
        }
    }
}

impl InferenceBackend for OnnxBackend {
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        self.run(input)
    }

    fn device(&self) -> Device {
        self.device
    }
}
