use crate::models::ClassLabel;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// 单次预测结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// 预测类别（概率最大者）
    pub class: ClassLabel,
    /// 置信度百分比 (0 - 100)，保留两位小数
    pub confidence: f64,
    /// 全部类别的概率百分比
    pub all_probabilities: ClassProbabilities,
}

/// 按类别顺序排列的概率百分比
///
/// 序列化为 JSON 对象，键的顺序与 `ClassLabel::ALL` 一致。
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(Vec<(ClassLabel, f64)>);

impl ClassProbabilities {
    pub fn new(entries: Vec<(ClassLabel, f64)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, label: ClassLabel) -> Option<f64> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, f64)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, probability) in &self.0 {
            map.serialize_entry(label.as_str(), probability)?;
        }
        map.end()
    }
}

/// 模型信息，随预测结果一起返回
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub device: String,
    pub architecture: String,
}
