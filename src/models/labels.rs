use serde::{Serialize, Serializer};
use std::fmt;

/// 分类头输出数量
pub const NUM_CLASSES: usize = 6;

/// 疾病类别，顺序与模型输出层的索引一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassLabel {
    Dermatitis,
    FungalInfections,
    Healthy,
    Hypersensitivity,
    Demodicosis,
    Ringworm,
}

impl ClassLabel {
    /// 按输出索引排列的全部类别
    pub const ALL: [ClassLabel; NUM_CLASSES] = [
        ClassLabel::Dermatitis,
        ClassLabel::FungalInfections,
        ClassLabel::Healthy,
        ClassLabel::Hypersensitivity,
        ClassLabel::Demodicosis,
        ClassLabel::Ringworm,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 训练时使用的类别名称
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Dermatitis => "Dermatitis",
            ClassLabel::FungalInfections => "Fungal_infections",
            ClassLabel::Healthy => "Healthy",
            ClassLabel::Hypersensitivity => "Hypersensitivity",
            ClassLabel::Demodicosis => "demodicosis",
            ClassLabel::Ringworm => "ringworm",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClassLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
