pub mod backend;
pub mod device;
pub mod labels;
pub mod onnx;

pub use backend::InferenceBackend;
pub use device::Device;
pub use labels::{ClassLabel, NUM_CLASSES};
pub use onnx::OnnxBackend;
