use once_cell::sync::OnceCell;
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use serde::Serialize;
use std::fmt;

/// 推理设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

static DEVICE: OnceCell<Device> = OnceCell::new();

impl Device {
    /// 进程级设备选择，只在第一次调用时探测
    pub fn select(force_cpu: bool) -> Device {
        *DEVICE.get_or_init(|| {
            let device = if force_cpu {
                tracing::info!("FORCE_CPU set, using CPU execution provider");
                Device::Cpu
            } else {
                Self::detect()
            };
            tracing::info!("Inference device selected: {}", device);
            device
        })
    }

    /// 已选定的设备（未选择时为 None）
    pub fn current() -> Option<Device> {
        DEVICE.get().copied()
    }

    fn detect() -> Device {
        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => Device::Cuda,
            Ok(false) => Device::Cpu,
            Err(e) => {
                tracing::warn!("Failed to query CUDA availability: {}", e);
                Device::Cpu
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
