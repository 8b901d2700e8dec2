use crate::models::Device;
use crate::Result;
use ndarray::Array4;

/// 模型前向推理接口
///
/// 实现方必须只读：同一实例会被多个请求并发调用，推理不得修改模型参数。
pub trait InferenceBackend: Send + Sync {
    /// 输入 NCHW 张量（batch = 1），返回分类头的原始 logits
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>>;

    /// 推理所在设备
    fn device(&self) -> Device;

    /// 模型结构名称
    fn architecture(&self) -> &str {
        "ResNet50"
    }
}
